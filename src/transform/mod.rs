//! Avatar Transform Pipeline
//!
//! Reads the single source image, crops it to fill the requested box and
//! re-encodes it as JPEG. Decoding, resizing and encoding are CPU-bound and
//! run on the blocking thread pool behind a concurrency limit.

mod pipeline;

pub use pipeline::{AvatarPipeline, RenderedAvatar, OUTPUT_CONTENT_TYPE, OUTPUT_FILENAME};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering the avatar
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Source image not found: {path}")]
    SourceMissing { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding failed: {reason}")]
    Decode { reason: String },

    #[error("Image encoding failed: {reason}")]
    Encode { reason: String },

    #[error("Transform task failed: {reason}")]
    TaskFailed { reason: String },

    #[error("Invalid transform configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Configuration for the transform pipeline
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Location of the one source image
    pub source_path: PathBuf,
    /// Maximum transforms running at once
    pub max_concurrent: usize,
}

impl TransformConfig {
    pub fn new(source_path: impl Into<PathBuf>, max_concurrent: usize) -> Self {
        Self {
            source_path: source_path.into(),
            max_concurrent,
        }
    }
}
