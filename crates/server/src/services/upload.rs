//! Resume upload gate.
//!
//! Accepts a single PDF of at most [`MAX_UPLOAD_BYTES`] and stores it in the
//! upload directory as `resume-<unix-ms><ext>`. Bodies are buffered in
//! memory by [`UploadGate::read`] and only written by [`UploadGate::store`]
//! once every check has passed, so a rejected upload never leaves a file
//! behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use chrono::Utc;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use folio_core::UploadStats;

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "resume";
/// The only accepted declared content type.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
/// Maximum accepted file size (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Prefix every stored file name starts with.
pub const FILE_PREFIX: &str = "resume-";

const PDF_MAGIC: &[u8] = b"%PDF-";
const DEFAULT_EXTENSION: &str = ".pdf";
const MAX_NAME_ATTEMPTS: i64 = 1000;

/// Errors that can occur while accepting an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request carried no `resume` file.
    #[error("no file uploaded: expected a `{UPLOAD_FIELD}` field")]
    MissingFile,

    /// The request carried more than one file.
    #[error("only one file may be uploaded")]
    TooManyFiles,

    /// A file arrived under a field other than `resume`.
    #[error("unexpected file field `{0}`")]
    UnexpectedField(String),

    /// The declared content type is not `application/pdf`.
    #[error("only PDF files are allowed (got {0})")]
    UnsupportedType(String),

    /// The content does not start with the PDF signature.
    #[error("file content is not a PDF")]
    NotPdf,

    /// The file is larger than [`MAX_UPLOAD_BYTES`].
    #[error("file too large: the limit is {MAX_UPLOAD_BYTES} bytes")]
    TooLarge,

    /// The multipart body could not be read.
    #[error("malformed upload: {0}")]
    Malformed(String),

    /// Writing the file failed.
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge
        } else {
            Self::Malformed(err.body_text())
        }
    }
}

/// A file written by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// File name inside the upload directory.
    pub name: String,
    /// Public path, `uploads/<name>`.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
}

/// Validates and stores uploaded resumes.
#[derive(Debug, Clone)]
pub struct UploadGate {
    dir: PathBuf,
}

impl UploadGate {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check the declared content type before reading the body.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` unless the type is exactly
    /// `application/pdf`.
    pub fn check_content_type(content_type: Option<&str>) -> Result<(), UploadError> {
        match content_type {
            Some(PDF_CONTENT_TYPE) => Ok(()),
            Some(other) => Err(UploadError::UnsupportedType(other.to_owned())),
            None => Err(UploadError::UnsupportedType("no content type".to_owned())),
        }
    }

    /// Read a file body, enforcing the size limit and the PDF signature.
    ///
    /// Reading stops at the first chunk that crosses the limit.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::TooLarge` or `UploadError::NotPdf` for rejected
    /// bodies, or the stream's own error converted to `UploadError`.
    pub async fn read<S, E>(body: S) -> Result<Vec<u8>, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        UploadError: From<E>,
    {
        let mut body = std::pin::pin!(body);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if buffer.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(UploadError::TooLarge);
            }
            buffer.extend_from_slice(&chunk);
        }

        if !buffer.starts_with(PDF_MAGIC) {
            return Err(UploadError::NotPdf);
        }
        Ok(buffer)
    }

    /// Write an accepted file under a fresh `resume-<unix-ms><ext>` name.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the file cannot be written.
    pub async fn store(
        &self,
        original_name: Option<&str>,
        content: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        let extension = extension_of(original_name);
        self.write_new(Utc::now().timestamp_millis(), &extension, content)
            .await
    }

    /// Write `content` as `resume-<millis><extension>`, bumping the
    /// timestamp while the name is taken.
    async fn write_new(
        &self,
        millis: i64,
        extension: &str,
        content: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = format!("{FILE_PREFIX}{}{extension}", millis + attempt);
            let path = self.dir.join(&name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = write_all(&mut file, content).await {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e.into());
            }

            tracing::info!(file = %name, size = content.len(), "Upload stored");
            return Ok(StoredUpload {
                path: format!("uploads/{name}"),
                name,
                size: content.len() as u64,
            });
        }

        Err(UploadError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "no free upload file name",
        )))
    }
}

async fn write_all(file: &mut tokio::fs::File, content: &[u8]) -> std::io::Result<()> {
    file.write_all(content).await?;
    file.flush().await
}

/// Extension of the client's file name including the dot, or `.pdf`.
///
/// Only short alphanumeric extensions are kept.
fn extension_of(original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(
            || DEFAULT_EXTENSION.to_owned(),
            |ext| format!(".{}", ext.to_ascii_lowercase()),
        )
}

/// Count the files in the upload directory and their total size.
///
/// A missing directory counts as empty.
///
/// # Errors
///
/// Returns the I/O error if the directory exists but cannot be read.
pub async fn directory_stats(dir: &Path) -> std::io::Result<UploadStats> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(UploadStats::default()),
        Err(e) => return Err(e),
    };

    let mut stats = UploadStats::default();
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if metadata.is_file() {
            stats.files += 1;
            stats.total_bytes += metadata.len();
        }
    }
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::stream;

    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "folio-upload-{label}-{}-{n}",
            std::process::id()
        ))
    }

    fn pdf_bytes(len: usize) -> Vec<u8> {
        let mut bytes = PDF_MAGIC.to_vec();
        bytes.resize(len, b'0');
        bytes
    }

    fn body(chunks: Vec<Vec<u8>>) -> impl Stream<Item = Result<Bytes, UploadError>> {
        stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
    }

    #[test]
    fn test_content_type_must_be_pdf() {
        assert!(UploadGate::check_content_type(Some("application/pdf")).is_ok());
        assert!(matches!(
            UploadGate::check_content_type(Some("image/png")),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            UploadGate::check_content_type(Some("application/pdf; charset=binary")),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(UploadGate::check_content_type(None).is_err());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Some("cv.PDF")), ".pdf");
        assert_eq!(extension_of(Some("resume")), ".pdf");
        assert_eq!(extension_of(None), ".pdf");
        assert_eq!(extension_of(Some("a.b/../x.p d f")), ".pdf");
    }

    #[tokio::test]
    async fn test_accepts_pdf_at_limit() {
        let dir = scratch_dir("limit");
        let gate = UploadGate::new(&dir);

        let content = UploadGate::read(body(vec![pdf_bytes(MAX_UPLOAD_BYTES)]))
            .await
            .unwrap();
        let stored = gate.store(Some("cv.pdf"), &content).await.unwrap();

        assert!(stored.name.starts_with(FILE_PREFIX));
        assert!(stored.name.ends_with(".pdf"));
        assert_eq!(stored.path, format!("uploads/{}", stored.name));
        assert_eq!(stored.size, MAX_UPLOAD_BYTES as u64);
        assert_eq!(
            tokio::fs::metadata(dir.join(&stored.name)).await.unwrap().len(),
            MAX_UPLOAD_BYTES as u64
        );

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_oversized() {
        let half = pdf_bytes(MAX_UPLOAD_BYTES / 2 + 1);
        let err = UploadGate::read(body(vec![half.clone(), half]))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge));
    }

    #[tokio::test]
    async fn test_stream_error_is_propagated() {
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"%PDF-1.7")),
            Err(UploadError::Malformed("connection reset".into())),
        ]);
        let err = UploadGate::read(chunks).await.unwrap_err();
        assert!(matches!(err, UploadError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_content() {
        let err = UploadGate::read(body(vec![b"GIF89a...".to_vec()]))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::NotPdf));

        let err = UploadGate::read(body(Vec::new())).await.unwrap_err();
        assert!(matches!(err, UploadError::NotPdf));
    }

    #[tokio::test]
    async fn test_name_collision_bumps_timestamp() {
        let dir = scratch_dir("collide");
        let gate = UploadGate::new(&dir);
        let content = pdf_bytes(16);

        let first = gate.write_new(1_700_000_000_000, ".pdf", &content).await.unwrap();
        let second = gate.write_new(1_700_000_000_000, ".pdf", &content).await.unwrap();

        assert_eq!(first.name, "resume-1700000000000.pdf");
        assert_eq!(second.name, "resume-1700000000001.pdf");

        let stats = directory_stats(&dir).await.unwrap();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.total_bytes, 32);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_of_missing_directory_is_empty() {
        let stats = directory_stats(&scratch_dir("missing")).await.unwrap();
        assert_eq!(stats, UploadStats::default());
    }
}
