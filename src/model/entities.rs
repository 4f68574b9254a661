//! Catalog entities as the remote service represents them, and the payloads
//! used to create or update them.
//!
//! Field names on the wire are the backend's own (`Artist_name`, `Gener`, ...);
//! the Rust side renames them through serde.

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::types::EntityId;

/// Form field the backend reads binary uploads from
pub const AUDIO_FIELD: &str = "audio";

/// An entity type served by one collection of the catalog service
pub trait CatalogEntity: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Path segment under the api base, e.g. `artists`
    const COLLECTION: &'static str;
    /// Singular, capitalized label used in messages
    const LABEL: &'static str;
    /// Wire names of the text fields a create/update payload carries
    const FIELDS: &'static [&'static str];

    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
    fn audio_url(&self) -> Option<&str>;
    /// Scalar values in the same order as [`Self::FIELDS`]
    fn field_values(&self) -> Vec<String>;
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Artist {
    #[serde(rename = "Artist_id")]
    pub id: EntityId,
    #[serde(rename = "Artist_name")]
    pub name: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Album {
    #[serde(rename = "Album_id")]
    pub id: EntityId,
    #[serde(rename = "Album_title")]
    pub title: String,
    #[serde(rename = "Total_tracks")]
    pub total_tracks: i64,
    #[serde(default)]
    pub audio_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Song {
    #[serde(rename = "Songs_id")]
    pub id: EntityId,
    #[serde(rename = "Songs_name")]
    pub name: String,
    #[serde(rename = "Gener")]
    pub genre: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl CatalogEntity for Artist {
    const COLLECTION: &'static str = "artists";
    const LABEL: &'static str = "Artist";
    const FIELDS: &'static [&'static str] = &["Artist_name", "Country"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone(), self.country.clone()]
    }
}

impl CatalogEntity for Album {
    const COLLECTION: &'static str = "albums";
    const LABEL: &'static str = "Album";
    const FIELDS: &'static [&'static str] = &["Album_title", "Total_tracks"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.title.clone(), self.total_tracks.to_string()]
    }
}

impl CatalogEntity for Song {
    const COLLECTION: &'static str = "songs";
    const LABEL: &'static str = "Song";
    const FIELDS: &'static [&'static str] = &["Songs_name", "Gener"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone(), self.genre.clone()]
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A binary file sent alongside the text fields of a payload
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    pub fn audio(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            field: AUDIO_FIELD.to_string(),
            mime: mime_for(&file_name).map(str::to_string),
            file_name,
            bytes,
        }
    }

    /// Read a file from disk into an attachment for `field`.
    pub async fn from_path(field: &str, path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            field: field.to_string(),
            mime: mime_for(&file_name).map(str::to_string),
            file_name,
            bytes,
        })
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        "m4a" => Some("audio/mp4"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// Structured create/update body: ordered text fields plus optional attachments.
///
/// The payload does not know which fields are required; the backend decides and
/// reports missing ones as a validation failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityPayload {
    fields: Vec<(String, String)>,
    attachments: Vec<Attachment>,
}

impl EntityPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Set a text field, replacing an earlier value of the same name.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.attachments.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ArtistDraft {
    pub name: String,
    pub country: String,
    pub audio: Option<Attachment>,
}

#[derive(Clone, Debug, Default)]
pub struct AlbumDraft {
    pub title: String,
    pub total_tracks: i64,
    pub audio: Option<Attachment>,
}

#[derive(Clone, Debug, Default)]
pub struct SongDraft {
    pub name: String,
    pub genre: String,
    pub audio: Option<Attachment>,
}

fn with_audio(payload: EntityPayload, audio: Option<Attachment>) -> EntityPayload {
    match audio {
        Some(attachment) => payload.attach(attachment),
        None => payload,
    }
}

impl From<ArtistDraft> for EntityPayload {
    fn from(draft: ArtistDraft) -> Self {
        let payload = EntityPayload::new()
            .field("Artist_name", draft.name)
            .field("Country", draft.country);
        with_audio(payload, draft.audio)
    }
}

impl From<AlbumDraft> for EntityPayload {
    fn from(draft: AlbumDraft) -> Self {
        let payload = EntityPayload::new()
            .field("Album_title", draft.title)
            .field("Total_tracks", draft.total_tracks.to_string());
        with_audio(payload, draft.audio)
    }
}

impl From<SongDraft> for EntityPayload {
    fn from(draft: SongDraft) -> Self {
        let payload = EntityPayload::new()
            .field("Songs_name", draft.name)
            .field("Gener", draft.genre);
        with_audio(payload, draft.audio)
    }
}

// Editing starts from the stored values; the existing upload stays unless replaced.
impl From<&Artist> for ArtistDraft {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            country: artist.country.clone(),
            audio: None,
        }
    }
}

impl From<&Album> for AlbumDraft {
    fn from(album: &Album) -> Self {
        Self {
            title: album.title.clone(),
            total_tracks: album.total_tracks,
            audio: None,
        }
    }
}

impl From<&Song> for SongDraft {
    fn from(song: &Song) -> Self {
        Self {
            name: song.name.clone(),
            genre: song.genre.clone(),
            audio: None,
        }
    }
}
