use std::fmt;
use std::path::PathBuf;

use lab_cluster::ClusterError;
use thiserror::Error;

/// Failure acquiring or transforming one album image
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Unsupported image format: {channels} channels")]
    UnsupportedFormat { channels: u8 },

    #[error("Transform error: {0}")]
    Transform(#[from] ClusterError),

    #[error("Transform task failed: {0}")]
    Join(String),
}

/// Failure producing the track list
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error {status} for {url}")]
    Api { url: String, status: u16 },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure writing output files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {}: {message}", .path.display())]
    Encode { path: PathBuf, message: String },

    #[error("Storage task failed: {0}")]
    Join(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Palette error: {0}")]
    Palette(#[from] ClusterError),
}

/// Failure loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// One record that produced no image, with the reason
#[derive(Debug)]
pub struct RecordFailure {
    /// Position in the input sequence
    pub index: usize,
    pub id: String,
    pub name: String,
    pub error: ImageError,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({}): {}",
            self.index + 1,
            self.id,
            self.name,
            self.error
        )
    }
}

/// Error from a whole palette run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No images could be processed ({} failed)", .failures.len())]
    EmptyPixelPool { failures: Vec<RecordFailure> },

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Track source error: {0}")]
    Source(#[from] SourceError),

    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Image client error: {0}")]
    Client(#[from] ImageError),

    #[error("Clustering task failed: {0}")]
    Task(String),
}
