pub mod image_pipeline;
pub mod image_transformer;
pub mod palette_pipeline;
pub mod storage;
pub mod track_source;

pub use image_pipeline::{ImagePipeline, ItemResult, PersistRequest, PersistSink, PipelineOutput};
pub use image_transformer::{ImageTransformer, RawImage};
pub use palette_pipeline::{PalettePipeline, RunSummary};
pub use storage::{sanitize_filename, AlbumWriter, OutputStore};
pub use track_source::{ManifestSource, SpotifyCredentials, SpotifyPlaylist, TrackSource};
