use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::SourceError;
use crate::models::{Manifest, SourceRecord, SpotifyConfig, TrackCollection};

/// Produces the ordered records of one collection
#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn fetch(&self) -> Result<TrackCollection, SourceError>;
}

/// Client-credentials pair for the Spotify Web API
#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TracksPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct PlaylistItem {
    track: Option<Track>,
}

#[derive(Deserialize)]
struct Track {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Option<Album>,
}

#[derive(Deserialize)]
struct Artist {
    name: String,
}

#[derive(Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<AlbumImage>,
}

#[derive(Deserialize)]
struct AlbumImage {
    url: String,
}

impl Track {
    /// Record for the first album image; `None` without one
    fn into_record(self) -> Option<SourceRecord> {
        let image_url = self.album?.images.into_iter().next()?.url;
        Some(SourceRecord {
            id: self.id.unwrap_or_default(),
            display_name: self.name,
            artist_names: self.artists.into_iter().map(|a| a.name).collect(),
            image_url,
        })
    }
}

/// Tracks of a Spotify playlist, in playlist order
pub struct SpotifyPlaylist {
    client: reqwest::Client,
    playlist_id: String,
    credentials: SpotifyCredentials,
    api_base: String,
    token_url: String,
    page_limit: u32,
}

impl SpotifyPlaylist {
    pub fn new(
        playlist_id: impl Into<String>,
        credentials: SpotifyCredentials,
        config: &SpotifyConfig,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            playlist_id: playlist_id.into(),
            credentials,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            page_limit: config.page_limit,
        })
    }

    async fn access_token(&self) -> Result<String, SourceError> {
        let basic = STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));
        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {basic}"))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Auth(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = parse_json(&response.text().await?)?;
        Ok(token.access_token)
    }

    async fn page(&self, url: &str, token: &str) -> Result<TracksPage, SourceError> {
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        parse_json(&response.text().await?)
    }
}

#[async_trait]
impl TrackSource for SpotifyPlaylist {
    async fn fetch(&self) -> Result<TrackCollection, SourceError> {
        let token = self.access_token().await?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        let mut pages = 0usize;
        let mut next = Some(format!(
            "{}/playlists/{}/tracks?limit={}",
            self.api_base, self.playlist_id, self.page_limit
        ));

        while let Some(url) = next {
            let page = self.page(&url, &token).await?;
            pages += 1;
            for item in page.items {
                match item.track.and_then(Track::into_record) {
                    Some(record) => records.push(record),
                    None => skipped += 1,
                }
            }
            next = page.next;
        }

        tracing::info!(
            playlist = %self.playlist_id,
            tracks = records.len(),
            skipped,
            pages,
            "Fetched playlist"
        );

        Ok(TrackCollection {
            id: self.playlist_id.clone(),
            records,
        })
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))
}

/// Records listed in a local YAML manifest
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manifest name, else the file stem
    fn collection_id(&self, manifest: &Manifest) -> String {
        manifest.name.clone().unwrap_or_else(|| file_stem(&self.path))
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest".to_string())
}

#[async_trait]
impl TrackSource for ManifestSource {
    async fn fetch(&self) -> Result<TrackCollection, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let manifest: Manifest = serde_yaml::from_str(&content)?;
        let id = self.collection_id(&manifest);

        tracing::info!(
            path = %self.path.display(),
            collection = %id,
            tracks = manifest.tracks.len(),
            "Loaded manifest"
        );

        Ok(TrackCollection {
            id,
            records: manifest.tracks,
        })
    }
}
