//! Catalog entities and request/response bodies.

use serde::{Deserialize, Serialize};

/// A song with its group's name when read through a join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Primary key; zero before insertion.
    #[serde(default)]
    pub id: i64,
    /// Song title.
    #[serde(rename = "song")]
    pub name: String,
    /// Group name (joined, not stored on the song row).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Release date, stored as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_date: String,
    /// Lyrics, couplets separated by a blank line.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Link to the song.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    /// Owning group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

/// A band or artist. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Primary key; zero before insertion.
    #[serde(default)]
    pub id: i64,
    /// Unique name.
    pub name: String,
}

impl Group {
    /// A not-yet-stored group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

/// What the metadata service knows about a song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    /// `DD.MM.YYYY`.
    pub release_date: String,
    /// Lyrics.
    pub text: String,
    /// Link to the song.
    pub link: String,
}

/// Body of `POST /songs/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSongRequest {
    /// Song title.
    pub song: String,
    /// Group name.
    pub group: String,
}

/// Body of `PUT /songs/{id}`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSongRequest {
    /// New title.
    #[serde(default)]
    pub song: Option<String>,
    /// New group, by name; created if unknown.
    #[serde(default)]
    pub group: Option<String>,
    /// New release date, `DD.MM.YYYY`.
    #[serde(default)]
    pub release_date: Option<String>,
    /// New lyrics.
    #[serde(default)]
    pub text: Option<String>,
    /// New link.
    #[serde(default)]
    pub link: Option<String>,
}

impl UpdateSongRequest {
    /// Whether the body changes nothing.
    pub fn is_empty(&self) -> bool {
        self.song.is_none()
            && self.group.is_none()
            && self.release_date.is_none()
            && self.text.is_none()
            && self.link.is_none()
    }
}

/// Response of a song search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongsPage {
    /// Matching songs.
    pub songs: Vec<Song>,
    /// Requested page, 0 when absent.
    pub page: u64,
    /// Requested limit, 0 when absent.
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_song_json_shape() {
        let song = Song {
            id: 3,
            name: "Uprising".into(),
            group: Some("Muse".into()),
            release_date: "2009-09-07".into(),
            text: String::new(),
            link: "https://example.com/uprising".into(),
            group_id: Some(1),
        };
        assert_eq!(
            serde_json::to_value(&song).unwrap(),
            json!({
                "id": 3,
                "song": "Uprising",
                "group": "Muse",
                "releaseDate": "2009-09-07",
                "link": "https://example.com/uprising",
                "groupId": 1
            })
        );
    }

    #[test]
    fn test_details_from_metadata_json() {
        let details: SongDetails = serde_json::from_value(json!({
            "releaseDate": "16.07.2006",
            "text": "Ooh baby\n\nOoh",
            "link": "https://www.youtube.com/watch?v=Xsp3_a-PMTw"
        }))
        .unwrap();
        assert_eq!(details.release_date, "16.07.2006");
    }

    #[test]
    fn test_update_request_partial() {
        let req: UpdateSongRequest = serde_json::from_value(json!({"releaseDate": "01.01.2001"})).unwrap();
        assert_eq!(req.release_date.as_deref(), Some("01.01.2001"));
        assert!(req.song.is_none());
        assert!(!req.is_empty());
        assert!(UpdateSongRequest::default().is_empty());
    }
}
