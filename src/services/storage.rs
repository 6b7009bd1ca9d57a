use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::StorageError;
use crate::models::SourceRecord;
use crate::services::image_pipeline::{PersistRequest, PersistSink};

/// Replace characters that are invalid in file names on common platforms
///
/// Double quotes become single quotes; `<>:/\|?*` become underscores.
pub fn sanitize_filename(name: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let invalid = INVALID.get_or_init(|| Regex::new(r#"[<>:/\\|?*]"#).expect("valid regex"));
    invalid.replace_all(&name.replace('"', "'"), "_").into_owned()
}

/// `"007. Song [by A, B].jpg"` for the record at index 6
pub fn album_filename(index: usize, record: &SourceRecord, extension: &str) -> String {
    sanitize_filename(&format!(
        "{:03}. {} [by {}].{}",
        index + 1,
        record.display_name,
        record.artist_names.join(", "),
        extension
    ))
}

/// Output directory layout
#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the folder for `name` without creating it
    pub fn folder_path(&self, name: &str) -> PathBuf {
        self.root.join(sanitize_filename(name))
    }

    /// Create (if needed) the folder for `name` under the root
    pub async fn create_folder(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.folder_path(name);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Sink writing album images into the folder for `collection`
    pub async fn album_writer(
        &self,
        collection: &str,
        extension: &str,
    ) -> Result<AlbumWriter, StorageError> {
        let folder = self.create_folder(collection).await?;
        Ok(AlbumWriter {
            folder,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }
}

/// Write bytes to `path`, creating parent directories
pub async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, bytes).await.map_err(io_err)
}

/// Saves originals as `NNN. name [by artists].ext`; format follows `ext`
#[derive(Debug, Clone)]
pub struct AlbumWriter {
    folder: PathBuf,
    extension: String,
}

impl AlbumWriter {
    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

#[async_trait]
impl PersistSink for AlbumWriter {
    async fn persist(&self, request: PersistRequest) -> Result<PathBuf, StorageError> {
        let path = self
            .folder
            .join(album_filename(request.index, &request.record, &self.extension));
        let target = path.clone();

        tokio::task::spawn_blocking(move || {
            request
                .image
                .save(&target)
                .map_err(|e| StorageError::Encode {
                    path: target.clone(),
                    message: e.to_string(),
                })
        })
        .await
        .map_err(|e| StorageError::Join(e.to_string()))??;

        tracing::debug!(path = %path.display(), "Saved album image");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::image_transformer::RawImage;

    fn record(name: &str, artists: &[&str]) -> SourceRecord {
        SourceRecord::new(
            "id",
            name,
            artists.iter().map(|a| a.to_string()).collect(),
            "http://img",
        )
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(r#"AC/DC: "Live"?"#), "AC_DC_ 'Live'_");
        assert_eq!(sanitize_filename(r"a<b>c\d|e*f"), "a_b_c_d_e_f");
        assert_eq!(sanitize_filename("plain name"), "plain name");
    }

    #[test]
    fn test_album_filename() {
        assert_eq!(
            album_filename(6, &record("Song", &["A", "B"]), "jpg"),
            "007. Song [by A, B].jpg"
        );
        assert_eq!(
            album_filename(122, &record("What?", &[]), "png"),
            "123. What_ [by ].png"
        );
    }

    #[test]
    fn test_folder_path_is_sanitized() {
        let store = OutputStore::new("/out");
        assert_eq!(store.folder_path("a/b"), PathBuf::from("/out/a_b"));
    }

    #[tokio::test]
    async fn test_album_writer_saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        let writer = store.album_writer("mix", ".png").await.unwrap();

        let path = writer
            .persist(PersistRequest {
                index: 0,
                record: record("Blue", &["X"]),
                image: RawImage::from_pixel(4, 4, image::Rgb([0, 0, 255])),
            })
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("mix").join("001. Blue [by X].png"));
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.get_pixel(2, 2).0, [0, 0, 255]);
    }

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/palette.png");

        write_file(&path, b"bytes").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
    }
}
