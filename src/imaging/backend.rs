//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the single seam between the curator and pixel
//! work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate and statically linked into the binary.

use super::params::ThumbnailParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Execute a thumbnail operation (cover-resize + center crop).
    ///
    /// The output's parent directory already exists when this is called.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;

    /// Whether `path` has an extension this backend can decode.
    fn can_decode(&self, path: &Path) -> bool;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::{Quality, ThumbnailFormat};
    use std::sync::Mutex;

    /// Mock backend that records operations instead of encoding.
    ///
    /// Each thumbnail call still writes a small placeholder to the output path
    /// so placement, deletion, and rollback see real files.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Sources whose file name contains this fragment fail to process.
        pub fail_on: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Thumbnail {
            source: String,
            output: String,
            edge: u32,
            format: ThumbnailFormat,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(fragment: &str) -> Self {
            Self {
                operations: Mutex::new(Vec::new()),
                fail_on: Some(fragment.to_string()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn thumbnail_outputs(&self) -> Vec<String> {
            self.get_operations()
                .into_iter()
                .map(|RecordedOp::Thumbnail { output, .. }| output)
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
            let name = params.source.to_string_lossy().to_string();
            if let Some(fragment) = &self.fail_on
                && name.contains(fragment.as_str())
            {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock failure for {name}"
                )));
            }

            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                source: name,
                output: params.output.to_string_lossy().to_string(),
                edge: params.edge,
                format: params.format,
                quality: params.quality.value(),
            });
            std::fs::write(&params.output, b"mock-thumbnail")?;
            Ok(())
        }

        fn can_decode(&self, _path: &Path) -> bool {
            true
        }
    }

    #[test]
    fn mock_records_thumbnail_and_writes_placeholder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("thumb.webp");
        let backend = MockBackend::new();

        backend
            .thumbnail(&ThumbnailParams {
                source: "/source.png".into(),
                output: output.clone(),
                edge: 300,
                format: ThumbnailFormat::Webp,
                quality: Quality::new(80),
            })
            .unwrap();

        assert!(output.exists());
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail {
                edge: 300,
                quality: 80,
                format: ThumbnailFormat::Webp,
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_on_matching_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::failing_on("broken");

        let result = backend.thumbnail(&ThumbnailParams {
            source: "/in/broken.png".into(),
            output: tmp.path().join("thumb.webp"),
            edge: 300,
            format: ThumbnailFormat::Webp,
            quality: Quality::default(),
        });

        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(backend.get_operations().is_empty());
    }
}
