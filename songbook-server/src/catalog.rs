//! Catalog operations behind the HTTP handlers.
//!
//! [`SongCatalog`] owns the flows that touch more than one store: adding a
//! song (metadata lookup, group upsert, insert) and updating one.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use songbook_query::couplets;
use songbook_query::{
    AddSongRequest, CoupletPage, EntityStore, Group, GroupFilter, MetadataProvider, QueryError,
    QueryResult, Song, SongFilter, SongsPage, UpdateSongRequest, ValidationRule,
    ValidatorRegistry, normalize_release_date,
};

/// Song storage as the catalog sees it.
pub type DynSongStore = Arc<dyn EntityStore<Song, Filter = SongFilter>>;

/// Group storage as the catalog sees it.
pub type DynGroupStore = Arc<dyn EntityStore<Group, Filter = GroupFilter>>;

/// Song catalog service.
#[derive(Clone)]
pub struct SongCatalog {
    songs: DynSongStore,
    groups: DynGroupStore,
    metadata: Arc<dyn MetadataProvider>,
    validators: ValidatorRegistry,
}

impl SongCatalog {
    /// Assemble a catalog from its collaborators.
    pub fn new(
        songs: DynSongStore,
        groups: DynGroupStore,
        metadata: Arc<dyn MetadataProvider>,
    ) -> QueryResult<Self> {
        Ok(Self {
            songs,
            groups,
            metadata,
            validators: ValidatorRegistry::new()?,
        })
    }

    /// Validate `filter`, then return the matching page of songs.
    #[instrument(skip_all)]
    pub async fn search(&self, filter: &SongFilter) -> QueryResult<SongsPage> {
        self.validators.validate(filter)?;
        let songs = self.songs.find(filter).await?;
        Ok(SongsPage {
            songs,
            page: filter.page.unwrap_or(0),
            limit: filter.limit.unwrap_or(0),
        })
    }

    /// One song by id.
    pub async fn get(&self, id: i64) -> QueryResult<Song> {
        self.songs.get(id).await
    }

    /// Look up metadata for a new song and store it, creating its group if needed.
    #[instrument(skip_all, fields(song = %request.song, group = %request.group))]
    pub async fn add(&self, request: &AddSongRequest) -> QueryResult<Song> {
        let name = request.song.trim();
        let group = request.group.trim();
        if name.is_empty() {
            return Err(QueryError::invalid_input("song", "must not be empty"));
        }
        if group.is_empty() {
            return Err(QueryError::invalid_input("group", "must not be empty"));
        }

        let details = self
            .metadata
            .song_details(name, group)
            .await
            .map_err(|e| e.with_context("fetch song details"))?;
        let release_date = normalize_release_date(&details.release_date)?;

        let group_id = self.ensure_group(group).await?;
        let mut song = Song {
            id: 0,
            name: name.to_string(),
            group: Some(group.to_string()),
            release_date,
            text: details.text,
            link: details.link,
            group_id: Some(group_id),
        };
        song.id = self.songs.create(&song).await?;

        info!(song_id = song.id, group_id, "Song added");
        Ok(song)
    }

    /// Overlay the provided fields on the stored song and save it.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: i64, request: &UpdateSongRequest) -> QueryResult<Song> {
        let mut song = self.songs.get(id).await?;
        if request.is_empty() {
            return Ok(song);
        }

        self.validators.validate_values(
            [
                ("releaseDate", ValidationRule::Date, request.release_date.as_deref()),
                ("link", ValidationRule::Url, request.link.as_deref()),
            ]
            .into_iter()
            .filter_map(|(field, rule, value)| Some((field, rule, value?))),
        )?;

        if let Some(name) = request.song.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            song.name = name.to_string();
        }
        if let Some(group) = request.group.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            song.group_id = Some(self.ensure_group(group).await?);
            song.group = Some(group.to_string());
        }
        if let Some(date) = request.release_date.as_deref() {
            song.release_date = if date.is_empty() {
                String::new()
            } else {
                normalize_release_date(date).map_err(|e| {
                    QueryError::invalid_input("releaseDate", "is not a calendar date").with_source(e)
                })?
            };
        }
        if let Some(text) = &request.text {
            song.text = text.clone();
        }
        if let Some(link) = &request.link {
            song.link = link.clone();
        }

        self.songs.update(&song).await?;
        debug!(song_id = id, "Song updated");
        Ok(song)
    }

    /// Remove a song; not found if it does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> QueryResult<()> {
        let song = self.songs.get(id).await?;
        self.songs.delete(&song).await?;
        info!(song_id = id, "Song deleted");
        Ok(())
    }

    /// One page of a song's couplets. Absent or zero `page` is the first page;
    /// absent or zero `limit` returns every couplet.
    pub async fn lyrics(&self, id: i64, page: Option<u64>, limit: Option<u64>) -> QueryResult<CoupletPage> {
        let song = self.songs.get(id).await?;
        couplets::paginate(&song.text, page.unwrap_or(0), limit.unwrap_or(0))
    }

    /// Create `name` if it is new, then return its id.
    ///
    /// A duplicate insert is expected when the group already exists; the id
    /// is then resolved by exact name among the substring matches.
    async fn ensure_group(&self, name: &str) -> QueryResult<i64> {
        match self.groups.create(&Group::new(name)).await {
            Ok(id) => return Ok(id),
            Err(e) if e.is_unique_violation() => debug!(group = name, "Group already exists"),
            Err(e) => return Err(e),
        }

        self.groups
            .find(&GroupFilter::name(name))
            .await?
            .into_iter()
            .find(|g| g.name == name)
            .map(|g| g.id)
            .ok_or_else(|| QueryError::not_found("Group").with_context(format!("resolve group {:?}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use songbook_query::SongDetails;
    use songbook_sqlite::{GroupStore, SongStore, SqliteConfig, SqlitePool, migrate};

    struct StaticMetadata;

    #[async_trait]
    impl MetadataProvider for StaticMetadata {
        async fn song_details(&self, _song: &str, _group: &str) -> QueryResult<SongDetails> {
            Ok(SongDetails {
                release_date: "16.07.2006".into(),
                text: "one\n\ntwo".into(),
                link: "https://example.com/song".into(),
            })
        }
    }

    async fn catalog() -> (SongCatalog, GroupStore) {
        let pool = SqlitePool::new(SqliteConfig::memory()).await.unwrap();
        migrate(&pool).await.unwrap();
        let groups = GroupStore::new(pool.clone());
        let catalog = SongCatalog::new(
            Arc::new(SongStore::new(pool)),
            Arc::new(groups.clone()),
            Arc::new(StaticMetadata),
        )
        .unwrap();
        (catalog, groups)
    }

    fn request(song: &str, group: &str) -> AddSongRequest {
        AddSongRequest {
            song: song.into(),
            group: group.into(),
        }
    }

    #[tokio::test]
    async fn test_existing_group_resolved_by_exact_name() {
        let (catalog, groups) = catalog().await;
        groups.create(&Group::new("Amused")).await.unwrap();
        let muse = groups.create(&Group::new("Muse")).await.unwrap();

        let song = catalog.add(&request("Uprising", "Muse")).await.unwrap();
        assert_eq!(song.group_id, Some(muse));
        assert_eq!(song.release_date, "2006-07-16");
    }

    #[tokio::test]
    async fn test_add_trims_names() {
        let (catalog, _) = catalog().await;
        let song = catalog.add(&request("  Uprising ", " Muse")).await.unwrap();
        assert_eq!(song.name, "Uprising");
        assert_eq!(song.group.as_deref(), Some("Muse"));
    }

    #[tokio::test]
    async fn test_empty_update_changes_nothing() {
        let (catalog, _) = catalog().await;
        let song = catalog.add(&request("Uprising", "Muse")).await.unwrap();
        let same = catalog.update(song.id, &UpdateSongRequest::default()).await.unwrap();
        assert_eq!(same, song);
    }

    #[tokio::test]
    async fn test_update_rejects_impossible_date() {
        let (catalog, _) = catalog().await;
        let song = catalog.add(&request("Uprising", "Muse")).await.unwrap();
        let update = UpdateSongRequest {
            release_date: Some("31.02.2010".into()),
            ..Default::default()
        };
        let err = catalog.update(song.id, &update).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_lyrics_of_missing_song() {
        let (catalog, _) = catalog().await;
        assert!(catalog.lyrics(42, None, None).await.unwrap_err().is_not_found());
    }
}
