use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use lab_cluster::LabImage;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::error::{ImageError, PipelineError, RecordFailure, StorageError};
use crate::models::{Shape, SourceRecord};
use crate::services::image_transformer::{ImageTransformer, RawImage};

/// Original image of one record, handed to a [`PersistSink`]
pub struct PersistRequest {
    /// Position in the input sequence
    pub index: usize,
    pub record: SourceRecord,
    pub image: RawImage,
}

/// Destination for original album images
#[async_trait]
pub trait PersistSink: Send + Sync {
    /// Write one image, returning where it went
    async fn persist(&self, request: PersistRequest) -> Result<PathBuf, StorageError>;
}

/// What one worker produces for one record
pub struct ItemResult {
    pub transformed: LabImage,
    pub persist_request: Option<PersistRequest>,
}

/// Images in input order plus everything that went wrong
#[derive(Debug)]
pub struct PipelineOutput {
    /// One slot per input record; `None` for failed or abandoned records
    pub slots: Vec<Option<LabImage>>,
    /// Sorted by record index
    pub failures: Vec<RecordFailure>,
    /// Saved original images, sorted by path
    pub saved: Vec<PathBuf>,
    pub persist_errors: Vec<StorageError>,
    pub cancelled: bool,
}

impl PipelineOutput {
    pub fn image_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn images(&self) -> impl Iterator<Item = &LabImage> {
        self.slots.iter().flatten()
    }

    /// Present images in input order
    pub fn into_images(self) -> Vec<LabImage> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Bounded-concurrency fetch and transform over an ordered record list
pub struct ImagePipeline {
    transformer: Arc<ImageTransformer>,
    shape: Shape,
    max_parallelism: usize,
    cancel: Option<watch::Receiver<bool>>,
}

impl ImagePipeline {
    pub fn new(transformer: Arc<ImageTransformer>, shape: Shape) -> Self {
        Self {
            transformer,
            shape,
            max_parallelism: 10,
            cancel: None,
        }
    }

    /// Records in flight at once (at least 1)
    pub fn max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism.max(1);
        self
    }

    /// Stop when the channel turns `true`
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Fetch and transform every record.
    ///
    /// Results land in the slot of their record, so output order equals
    /// input order whatever order the downloads finish in. A failed record
    /// is logged, recorded in `failures` and leaves its slot empty. Original
    /// images go to `sink` on their own tasks while other downloads
    /// continue; all writes are awaited before returning.
    ///
    /// Cancellation stops dispatching and drops in-flight downloads; their
    /// slots stay empty and `cancelled` is set. Without cancellation, a run
    /// with no successful record is [`PipelineError::EmptyPixelPool`].
    pub async fn run(
        &self,
        records: &[SourceRecord],
        sink: Option<Arc<dyn PersistSink>>,
    ) -> Result<PipelineOutput, PipelineError> {
        let keep_originals = sink.is_some();
        let mut slots: Vec<Option<LabImage>> = records.iter().map(|_| None).collect();
        let mut failures = Vec::new();
        let mut writes = JoinSet::new();
        let mut cancel = self.cancel.clone();
        let mut cancelled = false;

        let mut results = std::pin::pin!(stream::iter(records.iter().enumerate())
            .map(|(index, record)| async move {
                (index, self.process(index, record, keep_originals).await)
            })
            .buffer_unordered(self.max_parallelism));

        loop {
            let next = tokio::select! {
                biased;
                _ = cancellation(&mut cancel) => {
                    cancelled = true;
                    break;
                }
                next = results.next() => next,
            };
            let Some((index, outcome)) = next else {
                break;
            };

            match outcome {
                Ok(item) => {
                    slots[index] = Some(item.transformed);
                    if let (Some(request), Some(sink)) = (item.persist_request, &sink) {
                        let sink = Arc::clone(sink);
                        writes.spawn(async move { sink.persist(request).await });
                    }
                }
                Err(error) => {
                    let record = &records[index];
                    tracing::warn!(
                        index,
                        id = %record.id,
                        url = %record.image_url,
                        %error,
                        "Failed to process album image"
                    );
                    failures.push(RecordFailure {
                        index,
                        id: record.id.clone(),
                        name: record.display_name.clone(),
                        error,
                    });
                }
            }
        }

        let mut saved = Vec::new();
        let mut persist_errors = Vec::new();
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok(Ok(path)) => saved.push(path),
                Ok(Err(e)) => {
                    tracing::warn!(%e, "Failed to save album image");
                    persist_errors.push(e);
                }
                Err(e) => persist_errors.push(StorageError::Join(e.to_string())),
            }
        }
        saved.sort();
        failures.sort_by_key(|f| f.index);

        let output = PipelineOutput {
            slots,
            failures,
            saved,
            persist_errors,
            cancelled,
        };

        tracing::info!(
            records = records.len(),
            images = output.image_count(),
            failed = output.failures.len(),
            saved = output.saved.len(),
            cancelled,
            "Image pipeline finished"
        );

        if output.image_count() == 0 && !cancelled {
            return Err(PipelineError::EmptyPixelPool {
                failures: output.failures,
            });
        }
        Ok(output)
    }

    async fn process(
        &self,
        index: usize,
        record: &SourceRecord,
        keep_original: bool,
    ) -> Result<ItemResult, ImageError> {
        let (raw, transformed) = self
            .transformer
            .fetch_and_transform(&record.image_url, self.shape)
            .await?;
        tracing::debug!(index, id = %record.id, "Processed album image");

        let persist_request = keep_original.then(|| PersistRequest {
            index,
            record: record.clone(),
            image: raw,
        });
        Ok(ItemResult {
            transformed,
            persist_request,
        })
    }
}

/// Resolves once cancellation is requested; never without a live sender
async fn cancellation(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        if rx.wait_for(|&stop| stop).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
