//! [`EntityStore`] implementations backed by a [`SqlitePool`].
//!
//! Reads go through [`PredicateBuilder`] with the SQLite dialect; writes are
//! fixed statements. Every user value is a bound parameter.

use async_trait::async_trait;
use rusqlite::types::Value;
use tracing::{debug, instrument};

use songbook_query::{
    EntityStore, GROUP_SCHEMA, Group, GroupFilter, PredicateBuilder, QueryError, QueryResult,
    SONG_SCHEMA, Song, SongFilter,
};

use crate::error::SqliteError;
use crate::pool::SqlitePool;
use crate::types::to_params;

const INSERT_SONG: &str = r#"INSERT INTO "songs" ("groupId", "name", "releaseDate", "text", "link") VALUES (?, ?, ?, ?, ?)"#;
const UPDATE_SONG: &str = r#"UPDATE "songs" SET "groupId" = ?, "name" = ?, "releaseDate" = ?, "text" = ?, "link" = ? WHERE "id" = ?"#;
const DELETE_SONG: &str = r#"DELETE FROM "songs" WHERE "id" = ?"#;

const INSERT_GROUP: &str = r#"INSERT INTO "groups" ("name") VALUES (?)"#;
const UPDATE_GROUP: &str = r#"UPDATE "groups" SET "name" = ? WHERE "id" = ?"#;
const DELETE_GROUP: &str = r#"DELETE FROM "groups" WHERE "id" = ?"#;

/// Map a driver error, naming the entity and the constrained field.
fn store_error(err: SqliteError, model: &str, unique_field: &str, relation: &str) -> QueryError {
    if err.is_unique_violation() {
        QueryError::unique_violation(model, unique_field).with_source(err)
    } else if err.is_foreign_key_violation() {
        QueryError::foreign_key_violation(model, relation).with_source(err)
    } else {
        QueryError::from(err).with_model(model)
    }
}

fn require_affected(affected: usize, model: &str) -> QueryResult<()> {
    if affected == 0 {
        Err(QueryError::not_found(model))
    } else {
        Ok(())
    }
}

fn text_or_null(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::Text(value.to_string())
    }
}

/// Songs, read through their group join.
#[derive(Clone)]
pub struct SongStore {
    pool: SqlitePool,
    builder: PredicateBuilder,
}

impl SongStore {
    /// Create a store over `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            builder: PredicateBuilder::sqlite(),
        }
    }

    fn write_params(song: &Song) -> QueryResult<Vec<Value>> {
        let group_id = song
            .group_id
            .ok_or_else(|| QueryError::invalid_input("groupId", "a song needs a group").with_model("Song"))?;
        Ok(vec![
            Value::Integer(group_id),
            Value::Text(song.name.clone()),
            text_or_null(&song.release_date),
            text_or_null(&song.text),
            text_or_null(&song.link),
        ])
    }
}

#[async_trait]
impl EntityStore<Song> for SongStore {
    type Filter = SongFilter;

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> QueryResult<Song> {
        let query = self.builder.by_id(&SONG_SCHEMA, id);
        let conn = self.pool.get().await?;
        conn.query_optional::<Song>(&query.sql, to_params(&query.params))
            .await
            .map_err(|e| store_error(e, "Song", "id", "groupId"))?
            .ok_or_else(|| QueryError::not_found("Song"))
    }

    #[instrument(skip_all, fields(song = %song.name, group_id = ?song.group_id))]
    async fn create(&self, song: &Song) -> QueryResult<i64> {
        let params = Self::write_params(song)?;
        let conn = self.pool.get().await?;
        let id = conn
            .execute_insert_params(INSERT_SONG, params)
            .await
            .map_err(|e| store_error(e, "Song", "id", "groupId"))?;
        debug!(song_id = id, "Inserted song");
        Ok(id)
    }

    #[instrument(skip_all, fields(song_id = song.id))]
    async fn update(&self, song: &Song) -> QueryResult<()> {
        let mut params = Self::write_params(song)?;
        params.push(Value::Integer(song.id));
        let conn = self.pool.get().await?;
        let affected = conn
            .execute_params(UPDATE_SONG, params)
            .await
            .map_err(|e| store_error(e, "Song", "id", "groupId"))?;
        require_affected(affected, "Song")
    }

    #[instrument(skip_all, fields(song_id = song.id))]
    async fn delete(&self, song: &Song) -> QueryResult<()> {
        let conn = self.pool.get().await?;
        let affected = conn
            .execute_params(DELETE_SONG, vec![Value::Integer(song.id)])
            .await
            .map_err(|e| store_error(e, "Song", "id", "groupId"))?;
        require_affected(affected, "Song")
    }

    #[instrument(skip_all)]
    async fn find(&self, filter: &SongFilter) -> QueryResult<Vec<Song>> {
        let query = self.builder.build(filter);
        let conn = self.pool.get().await?;
        let songs = conn
            .query_params::<Song>(&query.sql, to_params(&query.params))
            .await
            .map_err(|e| QueryError::from(e).with_model("Song").with_sql(query.sql.clone()))?;
        debug!(matches = songs.len(), "Song search finished");
        if songs.is_empty() {
            return Err(QueryError::not_found("Song"));
        }
        Ok(songs)
    }
}

/// Groups, unique by name.
#[derive(Clone)]
pub struct GroupStore {
    pool: SqlitePool,
    builder: PredicateBuilder,
}

impl GroupStore {
    /// Create a store over `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            builder: PredicateBuilder::sqlite(),
        }
    }
}

#[async_trait]
impl EntityStore<Group> for GroupStore {
    type Filter = GroupFilter;

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> QueryResult<Group> {
        let query = self.builder.by_id(&GROUP_SCHEMA, id);
        let conn = self.pool.get().await?;
        conn.query_optional::<Group>(&query.sql, to_params(&query.params))
            .await
            .map_err(|e| store_error(e, "Group", "name", "id"))?
            .ok_or_else(|| QueryError::not_found("Group"))
    }

    #[instrument(skip_all, fields(group = %group.name))]
    async fn create(&self, group: &Group) -> QueryResult<i64> {
        let conn = self.pool.get().await?;
        let id = conn
            .execute_insert_params(INSERT_GROUP, vec![Value::Text(group.name.clone())])
            .await
            .map_err(|e| store_error(e, "Group", "name", "id"))?;
        debug!(group_id = id, "Inserted group");
        Ok(id)
    }

    #[instrument(skip_all, fields(group_id = group.id))]
    async fn update(&self, group: &Group) -> QueryResult<()> {
        let conn = self.pool.get().await?;
        let affected = conn
            .execute_params(
                UPDATE_GROUP,
                vec![Value::Text(group.name.clone()), Value::Integer(group.id)],
            )
            .await
            .map_err(|e| store_error(e, "Group", "name", "id"))?;
        require_affected(affected, "Group")
    }

    #[instrument(skip_all, fields(group_id = group.id))]
    async fn delete(&self, group: &Group) -> QueryResult<()> {
        let conn = self.pool.get().await?;
        let affected = conn
            .execute_params(DELETE_GROUP, vec![Value::Integer(group.id)])
            .await
            .map_err(|e| store_error(e, "Group", "name", "id"))?;
        require_affected(affected, "Group")
    }

    #[instrument(skip_all)]
    async fn find(&self, filter: &GroupFilter) -> QueryResult<Vec<Group>> {
        let query = self.builder.build(filter);
        let conn = self.pool.get().await?;
        let groups = conn
            .query_params::<Group>(&query.sql, to_params(&query.params))
            .await
            .map_err(|e| QueryError::from(e).with_model("Group").with_sql(query.sql.clone()))?;
        if groups.is_empty() {
            return Err(QueryError::not_found("Group"));
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SqliteConfig;
    use crate::migrate::migrate;
    use pretty_assertions::assert_eq;
    use songbook_query::ErrorCode;

    async fn stores() -> (SongStore, GroupStore) {
        let pool = SqlitePool::new(SqliteConfig::memory()).await.unwrap();
        migrate(&pool).await.unwrap();
        (SongStore::new(pool.clone()), GroupStore::new(pool))
    }

    fn song(name: &str, group_id: i64) -> Song {
        Song {
            name: name.into(),
            group_id: Some(group_id),
            release_date: "2006-07-16".into(),
            text: "Ooh baby, don't you know I suffer?\n\nOoh baby".into(),
            link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_song_crud() {
        let (songs, groups) = stores().await;
        let muse = groups.create(&Group::new("Muse")).await.unwrap();

        let id = songs.create(&song("Supermassive Black Hole", muse)).await.unwrap();
        let mut stored = songs.get(id).await.unwrap();
        assert_eq!(stored.group.as_deref(), Some("Muse"));
        assert_eq!(stored.release_date, "2006-07-16");

        stored.link = "https://example.com/smbh".into();
        songs.update(&stored).await.unwrap();
        assert_eq!(songs.get(id).await.unwrap().link, "https://example.com/smbh");

        songs.delete(&stored).await.unwrap();
        assert!(songs.get(id).await.unwrap_err().is_not_found());
        assert!(songs.delete(&stored).await.unwrap_err().is_not_found());
        assert!(songs.update(&stored).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_group_is_unique_violation() {
        let (_, groups) = stores().await;
        groups.create(&Group::new("Muse")).await.unwrap();
        let err = groups.create(&Group::new("Muse")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UniqueConstraint);
        assert_eq!(err.context.field.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn test_song_with_unknown_group_is_foreign_key_violation() {
        let (songs, _) = stores().await;
        let err = songs.create(&song("Orphan", 99)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ForeignKeyConstraint);
    }

    #[tokio::test]
    async fn test_song_without_group_is_rejected() {
        let (songs, _) = stores().await;
        let mut orphan = song("Orphan", 1);
        orphan.group_id = None;
        let err = songs.create(&orphan).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }

    #[tokio::test]
    async fn test_find_songs_by_group_and_text() {
        let (songs, groups) = stores().await;
        let muse = groups.create(&Group::new("Muse")).await.unwrap();
        let queen = groups.create(&Group::new("Queen")).await.unwrap();
        songs.create(&song("Supermassive Black Hole", muse)).await.unwrap();
        songs.create(&song("Uprising", muse)).await.unwrap();
        songs.create(&song("Bohemian Rhapsody", queen)).await.unwrap();

        let found = songs.find(&SongFilter::new().group("Muse")).await.unwrap();
        let names: Vec<_> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Supermassive Black Hole", "Uprising"]);

        let found = songs
            .find(&SongFilter::new().group("Muse").page(2).limit(1))
            .await
            .unwrap();
        assert_eq!(found[0].name, "Uprising");

        let found = songs.find(&SongFilter::new().release_date("16.07.2006").text("suffer")).await.unwrap();
        assert_eq!(found.len(), 3);

        let err = songs.find(&SongFilter::new().group("Nobody")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_substring_input_is_not_a_pattern() {
        let (songs, groups) = stores().await;
        let muse = groups.create(&Group::new("Muse")).await.unwrap();
        songs.create(&song("Uprising", muse)).await.unwrap();

        let err = songs.find(&SongFilter::new().text("%")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_oversized_window_is_not_a_database_error() {
        let (songs, groups) = stores().await;
        let muse = groups.create(&Group::new("Muse")).await.unwrap();
        songs.create(&song("Uprising", muse)).await.unwrap();

        let found = songs.find(&SongFilter::new().page(1).limit(u64::MAX)).await.unwrap();
        assert_eq!(found.len(), 1);

        for filter in [
            SongFilter::new().page(u64::MAX).limit(10),
            SongFilter::new().page(u64::MAX).limit(u64::MAX),
        ] {
            let err = songs.find(&filter).await.unwrap_err();
            assert!(err.is_not_found(), "{}", err);
        }
    }

    #[tokio::test]
    async fn test_find_groups_by_substring() {
        let (_, groups) = stores().await;
        groups.create(&Group::new("Muse")).await.unwrap();
        groups.create(&Group::new("Amused")).await.unwrap();
        groups.create(&Group::new("Queen")).await.unwrap();

        let found = groups.find(&GroupFilter::name("use")).await.unwrap();
        let names: Vec<_> = found.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Muse", "Amused"]);
    }

    #[tokio::test]
    async fn test_deleting_group_cascades_to_songs() {
        let (songs, groups) = stores().await;
        let muse = groups.create(&Group::new("Muse")).await.unwrap();
        let id = songs.create(&song("Uprising", muse)).await.unwrap();

        groups.delete(&Group { id: muse, name: "Muse".into() }).await.unwrap();
        assert!(songs.get(id).await.unwrap_err().is_not_found());
    }
}
