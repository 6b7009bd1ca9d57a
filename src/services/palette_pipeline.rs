use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lab_cluster::{
    ClusterCountSelector, ClusterError, ClusterResult, KMeans, LabImage, Palette, PixelPool,
    SelectionReport,
};
use tokio::sync::watch;

use crate::error::{PipelineError, RecordFailure, RenderError};
use crate::models::AppConfig;
use crate::rendering::encode_png;
use crate::services::image_pipeline::{ImagePipeline, PersistSink, PipelineOutput};
use crate::services::image_transformer::ImageTransformer;
use crate::services::storage::{sanitize_filename, write_file, OutputStore};
use crate::services::track_source::TrackSource;

/// Everything a palette run produced
#[derive(Debug)]
pub struct RunSummary {
    pub collection: String,
    /// Records the source returned
    pub records: usize,
    /// Images that made it into the pixel pool
    pub images_used: usize,
    pub failures: Vec<RecordFailure>,
    pub k: usize,
    /// Present when K was chosen automatically
    pub selection: Option<SelectionReport>,
    pub palette: Palette,
    pub png: Vec<u8>,
    /// Where the palette PNG was written, if anywhere
    pub palette_path: Option<PathBuf>,
    pub saved_albums: Vec<PathBuf>,
    pub iterations: usize,
    pub converged: bool,
}

/// Source -> images -> clustering -> palette PNG
pub struct PalettePipeline {
    config: Arc<AppConfig>,
    cancel: Option<watch::Receiver<bool>>,
}

impl PalettePipeline {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run once for the collection `source` yields.
    ///
    /// An invalid configuration fails before anything is fetched. A
    /// cancelled image stage aborts the run with
    /// [`PipelineError::Cancelled`] rather than clustering a partial set.
    pub async fn run(&self, source: &dyn TrackSource) -> Result<RunSummary, PipelineError> {
        let config = &self.config;
        config.validate()?;
        let collection = source.fetch().await?;

        let transformer = Arc::new(ImageTransformer::new(Duration::from_secs(
            config.pipeline.request_timeout_secs,
        ))?);
        let store = OutputStore::new(&config.output.dir);

        let sink: Option<Arc<dyn PersistSink>> = if config.pipeline.save_album_images {
            let writer = store
                .album_writer(&collection.id, &config.image.file_extension)
                .await?;
            tracing::info!(folder = %writer.folder().display(), "Saving album images");
            Some(Arc::new(writer))
        } else {
            None
        };

        let mut images = ImagePipeline::new(transformer, config.image.album_shape)
            .max_parallelism(config.pipeline.max_workers);
        if let Some(cancel) = &self.cancel {
            images = images.with_cancellation(cancel.clone());
        }

        let output = images.run(&collection.records, sink).await?;
        if output.cancelled {
            return Err(PipelineError::Cancelled);
        }
        let images_used = output.image_count();
        let PipelineOutput {
            slots,
            failures,
            saved,
            ..
        } = output;
        let lab_images: Vec<LabImage> = slots.into_iter().flatten().collect();

        let clustering_config = Arc::clone(&self.config);
        let (result, selection) =
            tokio::task::spawn_blocking(move || cluster(&clustering_config, lab_images))
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))??;

        if let Some(report) = &selection {
            for score in &report.scores {
                tracing::info!(
                    k = score.k,
                    silhouette = score.silhouette,
                    composite = score.composite,
                    "Cluster count score"
                );
            }
            tracing::info!(k = report.best_k, "Selected cluster count");
        }
        tracing::info!(
            k = result.k(),
            iterations = result.iterations(),
            converged = result.converged(),
            inertia = result.inertia(),
            "Clustering finished"
        );

        let palette = Palette::from_result(&result);
        tracing::info!(colors = ?palette.hex_colors(), "Palette colors");
        let shape = config.output.palette_shape;
        let bitmap = palette
            .render(shape.width, shape.height)
            .map_err(RenderError::from)?;
        let png = tokio::task::spawn_blocking(move || encode_png(&bitmap))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;

        let palette_path = match &config.output.palette_path {
            Some(path) => Some(path.clone()),
            None if config.pipeline.save_album_images => Some(
                store
                    .folder_path(&collection.id)
                    .join(sanitize_filename(&config.output.palette_filename)),
            ),
            None => None,
        };
        if let Some(path) = &palette_path {
            write_file(path, &png).await?;
            tracing::info!(path = %path.display(), bytes = png.len(), "Wrote palette image");
        }

        Ok(RunSummary {
            collection: collection.id,
            records: collection.records.len(),
            images_used,
            failures,
            k: result.k(),
            selection,
            palette,
            png,
            palette_path,
            saved_albums: saved,
            iterations: result.iterations(),
            converged: result.converged(),
        })
    }
}

/// Pool the images, pick K if a range is configured, then fit the full pool
fn cluster(
    config: &AppConfig,
    images: Vec<LabImage>,
) -> Result<(ClusterResult, Option<SelectionReport>), ClusterError> {
    let pool = PixelPool::from_images(images)?;
    tracing::debug!(pixels = pool.len(), "Built pixel pool");

    let params = &config.clustering;
    let seed = params.seed_or_default();

    let selection = match config.selection.k_range {
        Some((k_min, k_max)) => Some(
            ClusterCountSelector::new(k_min, k_max)
                .n_subsamples(config.selection.n_subsamples)
                .subsample_size(config.selection.subsample_size)
                .alpha(config.selection.alpha)
                .seed(seed)
                .kmeans(params.init.into(), params.max_iterations, params.tolerance)
                .select(&pool)?,
        ),
        None => None,
    };
    let k = selection
        .as_ref()
        .map_or(params.n_clusters, |report| report.best_k);

    let mut model = KMeans::new(k)
        .init(params.init.into())
        .max_iterations(params.max_iterations)
        .tolerance(params.tolerance)
        .seed(seed);
    model.fit(&pool)?;
    Ok((model.into_result()?, selection))
}
