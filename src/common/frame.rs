use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use uuid::Uuid;

/// One captured camera frame. Cloning shares the pixel buffer.
#[derive(Debug, Clone)]
pub struct Frame {
    frame_id: Uuid,
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(image: DynamicImage, captured_at: DateTime<Utc>, frame_id: Uuid) -> Self {
        Self {
            frame_id,
            image: Arc::new(image),
            captured_at,
        }
    }

    pub fn capture(image: DynamicImage) -> Self {
        Self::new(image, Utc::now(), Uuid::new_v4())
    }

    /// A black frame, used by the synthetic camera.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::capture(DynamicImage::ImageRgb8(RgbImage::new(width, height)))
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
