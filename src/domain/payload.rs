//! In-memory artifact payloads.
//!
//! A payload is an artifact that has not been written to disk yet. The
//! logging worker encodes it into a staging directory when the descriptor
//! is materialized.

use std::path::Path;

use image::DynamicImage;

use super::artifact::ArtifactError;

/// An in-memory artifact payload carried by a descriptor.
#[derive(Debug)]
pub enum ArtifactPayload {
    /// A decoded raster image. Encoded according to the filename extension
    /// (e.g. `plot.png`) when the descriptor is staged.
    Image(DynamicImage),

    /// A structured JSON value. No encoder is registered for structured
    /// payloads; staging one fails with [`ArtifactError::UnsupportedPayload`].
    Structured(serde_json::Value),
}

impl ArtifactPayload {
    /// Short name of the payload kind (used in errors and records)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Structured(_) => "structured",
        }
    }

    /// Encode the payload into `path`.
    ///
    /// Only image payloads have an encoder today; any other kind is a hard
    /// input-validation failure.
    pub(crate) fn write_to(&self, path: &Path) -> Result<(), ArtifactError> {
        match self {
            Self::Image(image) => image.save(path).map_err(|source| ArtifactError::Encode {
                path: path.to_path_buf(),
                source,
            }),
            Self::Structured(_) => Err(ArtifactError::UnsupportedPayload { kind: self.kind() }),
        }
    }
}

impl From<DynamicImage> for ArtifactPayload {
    fn from(image: DynamicImage) -> Self {
        Self::Image(image)
    }
}

impl From<serde_json::Value> for ArtifactPayload {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_payload_kinds() {
        let image = ArtifactPayload::from(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([0, 0, 0, 255]),
        )));
        assert_eq!(image.kind(), "image");

        let structured = ArtifactPayload::from(serde_json::json!({"loss": 0.25}));
        assert_eq!(structured.kind(), "structured");
    }

    #[test]
    fn test_image_payload_encodes_to_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.png");

        let payload = ArtifactPayload::from(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            4,
            Rgba([10, 20, 30, 255]),
        )));
        payload.write_to(&path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_structured_payload_has_no_encoder() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metrics.json");

        let payload = ArtifactPayload::from(serde_json::json!({"loss": 0.25}));
        let err = payload.write_to(&path).unwrap_err();

        assert!(matches!(
            err,
            ArtifactError::UnsupportedPayload { kind: "structured" }
        ));
        assert!(!path.exists());
    }
}
