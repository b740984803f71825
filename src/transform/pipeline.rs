//! Cover-fit resize and JPEG re-encode of the source avatar

use std::io::{Cursor, ErrorKind};
use std::path::Path;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use tokio::sync::Semaphore;

use super::{TransformConfig, TransformError};
use crate::token::Dimensions;

/// MIME type of every rendered avatar
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// File name suggested to browsers for the rendered avatar
pub const OUTPUT_FILENAME: &str = "avatar.jpg";

/// A rendered avatar ready to be sent
#[derive(Debug, Clone)]
pub struct RenderedAvatar {
    /// Encoded JPEG bytes
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Avatar renderer
///
/// Cheap to clone; clones share the concurrency limit.
#[derive(Debug, Clone)]
pub struct AvatarPipeline {
    config: Arc<TransformConfig>,
    permits: Arc<Semaphore>,
}

impl AvatarPipeline {
    /// Initialize the pipeline once at startup.
    ///
    /// A missing or unreadable source is only logged: requests will report
    /// it as not found until the file appears.
    pub fn init(config: TransformConfig) -> Result<Self, TransformError> {
        if config.max_concurrent == 0 {
            return Err(TransformError::InvalidConfig {
                reason: "max_concurrent must be at least 1".to_string(),
            });
        }

        match image::image_dimensions(&config.source_path) {
            Ok((width, height)) => tracing::info!(
                path = %config.source_path.display(),
                width,
                height,
                max_concurrent = config.max_concurrent,
                "Avatar pipeline ready"
            ),
            Err(e) => tracing::warn!(
                path = %config.source_path.display(),
                error = %e,
                "Avatar source is not readable yet; requests will fail until it is"
            ),
        }

        let permits = Arc::new(Semaphore::new(config.max_concurrent));

        Ok(Self {
            config: Arc::new(config),
            permits,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.config.source_path
    }

    /// Render the source image at the given dimensions
    pub async fn render(&self, dims: Dimensions) -> Result<RenderedAvatar, TransformError> {
        let source = match tokio::fs::read(&self.config.source_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TransformError::SourceMissing {
                    path: self.config.source_path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| TransformError::TaskFailed {
                reason: format!("Transform limiter closed: {}", e),
            })?;

        // The permit moves into the blocking task so the limit holds even if
        // the request that started it goes away.
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            Self::transform(&source, dims)
        })
        .await
        .map_err(|e| TransformError::TaskFailed {
            reason: format!("Task join error: {}", e),
        })?
    }

    /// Decode, cover-fit and encode synchronously
    fn transform(source: &[u8], dims: Dimensions) -> Result<RenderedAvatar, TransformError> {
        let img = image::load_from_memory(source).map_err(|e| TransformError::Decode {
            reason: e.to_string(),
        })?;

        // Crop to fill: scale until both sides cover the box, then center-crop
        let filled = img.resize_to_fill(dims.width, dims.height, FilterType::Lanczos3);
        let (width, height) = filled.dimensions();
        let rgb = filled.to_rgb8();

        let mut buffer = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buffer, dims.quality)
            .encode_image(&rgb)
            .map_err(|e| TransformError::Encode {
                reason: e.to_string(),
            })?;

        Ok(RenderedAvatar {
            data: buffer.into_inner(),
            content_type: OUTPUT_CONTENT_TYPE,
            width,
            height,
        })
    }
}
