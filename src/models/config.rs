use crate::error::ConfigError;
use lab_cluster::InitStrategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub image: ImageConfig,
    pub pipeline: PipelineConfig,
    pub clustering: ClusteringConfig,
    pub selection: SelectionConfig,
    pub output: OutputConfig,
    pub spotify: SpotifyConfig,
}

/// Width and height in pixels
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub width: usize,
    pub height: usize,
}

impl Shape {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ImageConfig {
    /// Every album cover is resampled to this shape before clustering
    #[serde(default = "default_album_shape")]
    pub album_shape: Shape,

    /// Extension (and so format) of saved album images
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

fn default_album_shape() -> Shape {
    Shape::new(256, 256)
}

fn default_file_extension() -> String {
    "jpg".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            album_shape: default_album_shape(),
            file_extension: default_file_extension(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Concurrent downloads
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    #[serde(default)]
    pub save_album_images: bool,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_workers() -> usize {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            save_album_images: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Centroid initialization as written in config files
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMethod {
    #[serde(rename = "random")]
    Random,
    #[default]
    #[serde(rename = "k-means++")]
    PlusPlus,
}

impl From<InitMethod> for InitStrategy {
    fn from(method: InitMethod) -> Self {
        match method {
            InitMethod::Random => InitStrategy::Random,
            InitMethod::PlusPlus => InitStrategy::PlusPlus,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// K when no selection range is configured
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,

    #[serde(default)]
    pub init: InitMethod,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Squared centroid shift below which Lloyd's iterations stop
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Fixed seed; unset uses the library default
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_n_clusters() -> usize {
    5
}

fn default_max_iterations() -> usize {
    300
}

fn default_tolerance() -> f64 {
    1e-4
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            n_clusters: default_n_clusters(),
            init: InitMethod::default(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: None,
        }
    }
}

impl ClusteringConfig {
    pub fn seed_or_default(&self) -> u64 {
        self.seed.unwrap_or(lab_cluster::DEFAULT_SEED)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Inclusive K range; enables automatic selection when set
    #[serde(default)]
    pub k_range: Option<(usize, usize)>,

    #[serde(default = "default_n_subsamples")]
    pub n_subsamples: usize,

    #[serde(default = "default_subsample_size")]
    pub subsample_size: usize,

    /// Reward for larger K in the composite score
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_n_subsamples() -> usize {
    5
}

fn default_subsample_size() -> usize {
    10_000
}

fn default_alpha() -> f64 {
    0.5
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            k_range: None,
            n_subsamples: default_n_subsamples(),
            subsample_size: default_subsample_size(),
            alpha: default_alpha(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Root for per-collection folders
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_palette_shape")]
    pub palette_shape: Shape,

    #[serde(default = "default_palette_filename")]
    pub palette_filename: String,

    /// Explicit palette PNG path, overrides the per-collection location
    #[serde(default)]
    pub palette_path: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_palette_shape() -> Shape {
    Shape::new(640, 640)
}

fn default_palette_filename() -> String {
    "clustered_image.png".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            palette_shape: default_palette_shape(),
            palette_filename: default_palette_filename(),
            palette_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Tracks per page request
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_api_base() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_page_limit() -> u32 {
    50
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base: default_api_base(),
            token_url: default_token_url(),
            page_limit: default_page_limit(),
        }
    }
}

impl AppConfig {
    /// Parse a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load an explicitly requested config file; failures are errors
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        config.log_loaded(path);
        Ok(config)
    }

    /// Load the default config file, falling back to defaults when it is
    /// missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    config.log_loaded(path);
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };

        if self.image.album_shape.is_empty() {
            return invalid("image.album_shape", "width and height must be non-zero");
        }
        if self.output.palette_shape.is_empty() {
            return invalid("output.palette_shape", "width and height must be non-zero");
        }
        if self.clustering.n_clusters == 0 {
            return invalid("clustering.n_clusters", "must be at least 1");
        }
        if self.clustering.max_iterations == 0 {
            return invalid("clustering.max_iterations", "must be at least 1");
        }
        let tolerance = self.clustering.tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return invalid("clustering.tolerance", "must be finite and non-negative");
        }
        if let Some((k_min, k_max)) = self.selection.k_range {
            if k_min < 2 || k_min > k_max {
                return Err(ConfigError::Invalid {
                    field: "selection.k_range",
                    reason: format!("need 2 <= k_min <= k_max, got [{k_min}, {k_max}]"),
                });
            }
            if k_max > self.selection.subsample_size {
                return Err(ConfigError::Invalid {
                    field: "selection.k_range",
                    reason: format!(
                        "k_max {k_max} exceeds subsample_size {}",
                        self.selection.subsample_size
                    ),
                });
            }
        }
        if self.selection.n_subsamples == 0 {
            return invalid("selection.n_subsamples", "must be at least 1");
        }
        if self.selection.subsample_size == 0 {
            return invalid("selection.subsample_size", "must be at least 1");
        }
        if !self.selection.alpha.is_finite() {
            return invalid("selection.alpha", "must be finite");
        }
        Ok(())
    }

    fn log_loaded(&self, path: &Path) {
        tracing::info!(
            path = %path.display(),
            album_shape = %self.image.album_shape,
            max_workers = self.pipeline.max_workers,
            n_clusters = self.clustering.n_clusters,
            k_range = ?self.selection.k_range,
            "Loaded configuration"
        );
    }
}
