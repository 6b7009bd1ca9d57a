mod config;
mod track;

pub use config::{
    AppConfig, ClusteringConfig, ImageConfig, InitMethod, OutputConfig, PipelineConfig,
    SelectionConfig, Shape, SpotifyConfig,
};
pub use track::{Manifest, SourceRecord, TrackCollection};
