use crate::common::Frame;
use crate::pipeline::types::Detection;
use image::{Rgb, RgbImage};

/// Draws detections for human inspection. Never feeds back into decisions.
pub trait FrameAnnotator: Send + Sync {
    fn annotate(&self, frame: &Frame, detections: &[Detection]) -> RgbImage;
    fn name(&self) -> &'static str;
}

/// Outlines each well-formed bounding box on a copy of the frame.
#[derive(Debug, Clone)]
pub struct BoxOutlineAnnotator {
    color: Rgb<u8>,
    line_width: u32,
}

impl Default for BoxOutlineAnnotator {
    fn default() -> Self {
        // red, 1px
        Self::new(Rgb([255, 0, 0]), 1)
    }
}

impl BoxOutlineAnnotator {
    pub fn new(color: Rgb<u8>, line_width: u32) -> Self {
        Self {
            color,
            line_width: line_width.max(1),
        }
    }

    fn outline(&self, rgb: &mut RgbImage, detection: &Detection) {
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 || detection.validate().is_err() {
            return;
        }
        let bbox = detection.bounding_box;
        // float to int casts saturate, so negatives land on 0
        let x0 = (bbox.top.x as u32).min(width - 1);
        let x1 = (bbox.bottom.x as u32).min(width - 1);
        let y0 = (bbox.top.y as u32).min(height - 1);
        let y1 = (bbox.bottom.y as u32).min(height - 1);
        let (x0, x1) = (x0.min(x1), x0.max(x1));

        for offset in 0..self.line_width {
            for x in x0..=x1 {
                rgb.put_pixel(x, (y0 + offset).min(y1), self.color);
                rgb.put_pixel(x, y1.saturating_sub(offset).max(y0), self.color);
            }
            for y in y0..=y1 {
                rgb.put_pixel((x0 + offset).min(x1), y, self.color);
                rgb.put_pixel(x1.saturating_sub(offset).max(x0), y, self.color);
            }
        }
    }
}

impl FrameAnnotator for BoxOutlineAnnotator {
    fn annotate(&self, frame: &Frame, detections: &[Detection]) -> RgbImage {
        let mut rgb = frame.image().to_rgb8();
        for detection in detections {
            self.outline(&mut rgb, detection);
        }
        tracing::trace!(
            "Annotated frame {} with {} boxes",
            frame.frame_id(),
            detections.len()
        );
        rgb
    }

    fn name(&self) -> &'static str {
        "BoxOutlineAnnotator"
    }
}
