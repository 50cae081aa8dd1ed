use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{ImageError, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use schema::{BoxRecord, ClassCatalog, CountSummary, Detection, UnknownClassError};
use std::io::Cursor;
use thiserror::Error;

const LABEL_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_OFFSET_PX: i32 = 8;
const BOX_THICKNESS: i32 = 2;

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error(transparent)]
    UnknownClass(#[from] UnknownClassError),
    #[error("failed to load the embedded label font")]
    Font(#[from] InvalidFont),
    #[error("failed to encode annotated image: {0}")]
    Image(#[from] ImageError),
}

/// Everything one analyzed image produces for the client and the report.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub counts: CountSummary,
    pub boxes: Vec<BoxRecord>,
}

/// Draws detections onto the uploaded image and aggregates per-class counts.
#[derive(Clone)]
pub struct Annotator {
    catalog: ClassCatalog,
    font: FontRef<'static>,
}

impl Annotator {
    pub fn new(catalog: ClassCatalog) -> Result<Self, AnnotateError> {
        let font = FontRef::try_from_slice(LABEL_FONT)?;
        Ok(Self { catalog, font })
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Count detections per class, draw each box and label onto `image`
    /// in place, and build one display record per detection.
    ///
    /// Unknown class ids fail the whole call; nothing is drawn "best
    /// effort" past that point.
    pub fn annotate(
        &self,
        image: &mut RgbImage,
        detections: &[Detection],
    ) -> Result<Annotation, AnnotateError> {
        let mut counts = CountSummary::zeroed(&self.catalog);
        let mut boxes = Vec::with_capacity(detections.len());

        for det in detections {
            let spec = self.catalog.require(det.class_id)?;
            counts.record(&self.catalog, det.class_id)?;

            let x1 = det.bbox.x1 as i32;
            let y1 = det.bbox.y1 as i32;
            let x2 = det.bbox.x2 as i32;
            let y2 = det.bbox.y2 as i32;
            let confidence = round_percent(det.confidence);
            let label = format!("{} {:.1}%", spec.name, det.confidence * 100.0);

            self.draw_box(image, x1, y1, x2, y2, spec.color);
            // Label sits above the box top edge; near the image top it may
            // land off-canvas, which matches the drawing library clipping.
            draw_text_mut(
                image,
                Rgb(spec.color),
                x1,
                y1 - LABEL_OFFSET_PX - LABEL_FONT_SIZE as i32,
                PxScale::from(LABEL_FONT_SIZE),
                &self.font,
                &label,
            );

            boxes.push(BoxRecord {
                x: x1,
                y: y1,
                w: x2 - x1,
                h: y2 - y1,
                label: spec.name.to_string(),
                confidence,
                color: format!("rgb({}, {}, {})", spec.color[0], spec.color[1], spec.color[2]),
            });
        }

        tracing::debug!(
            detections = detections.len(),
            total = counts.total(),
            "Image annotated"
        );

        Ok(Annotation { counts, boxes })
    }

    fn draw_box(&self, image: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, color: [u8; 3]) {
        let w = (x2 - x1).max(1) as u32;
        let h = (y2 - y1).max(1) as u32;
        for inset in 0..BOX_THICKNESS {
            let iw = w.saturating_sub(2 * inset as u32);
            let ih = h.saturating_sub(2 * inset as u32);
            if iw == 0 || ih == 0 {
                break;
            }
            let rect = Rect::at(x1 + inset, y1 + inset).of_size(iw, ih);
            draw_hollow_rect_mut(image, rect, Rgb(color));
        }
    }
}

/// Model confidence as a percentage rounded to one decimal place.
pub fn round_percent(confidence: f32) -> f32 {
    (confidence * 1000.0).round() / 10.0
}

/// Encode the annotated image as JPEG for the single-slot output file.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, AnnotateError> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, image::ImageFormat::Jpeg)?;
    Ok(bytes.into_inner())
}
