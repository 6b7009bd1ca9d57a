use serde::Deserialize;

/// One track's album cover to process
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRecord {
    pub id: String,

    #[serde(rename = "name")]
    pub display_name: String,

    #[serde(rename = "artists", default)]
    pub artist_names: Vec<String>,

    pub image_url: String,
}

impl SourceRecord {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        artist_names: Vec<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            artist_names,
            image_url: image_url.into(),
        }
    }
}

/// Ordered records from one source, e.g. a playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCollection {
    /// Names the output folder
    pub id: String,
    pub records: Vec<SourceRecord>,
}

/// Offline track list file
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub tracks: Vec<SourceRecord>,
}
