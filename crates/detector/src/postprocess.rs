use crate::preprocess::LetterboxTransform;
use schema::{BoundingBox, Detection};

pub struct PostProcessor {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl PostProcessor {
    pub fn new(confidence_threshold: f32, iou_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            iou_threshold,
        }
    }

    /// Parse detections from the raw YOLO output tensor.
    ///
    /// Layout is `[1, 4 + num_classes, num_candidates]`: rows 0..4 hold the
    /// box as cxcywh in input pixels, the remaining rows hold per-class
    /// confidences. Candidates below the threshold are dropped, survivors
    /// are mapped back through the letterbox transform, clamped to image
    /// bounds, and deduplicated with per-class NMS.
    pub fn parse_detections(
        &self,
        preds: &ndarray::ArrayViewD<f32>,
        transform: &LetterboxTransform,
    ) -> anyhow::Result<Vec<Detection>> {
        let shape = preds.shape();
        if shape.len() != 3 || shape[1] < 5 {
            anyhow::bail!("unexpected model output shape {:?}", shape);
        }
        let num_classes = shape[1] - 4;
        let num_candidates = shape[2];

        let mut candidates = Vec::new();

        for i in 0..num_candidates {
            // argmax over class confidences
            let mut confidence = f32::NEG_INFINITY;
            let mut class_id = 0u16;
            for c in 0..num_classes {
                let score = preds[[0, 4 + c, i]];
                if score > confidence {
                    confidence = score;
                    class_id = c as u16;
                }
            }

            if confidence < self.confidence_threshold {
                continue;
            }

            let cx = preds[[0, 0, i]];
            let cy = preds[[0, 1, i]];
            let w = preds[[0, 2, i]];
            let h = preds[[0, 3, i]];

            let (x1_input, y1_input, x2_input, y2_input) = cxcywh_to_xyxy(cx, cy, w, h);

            // Undo the letterbox and clamp to the original image.
            let x1 = ((x1_input - transform.offset_x) / transform.scale)
                .clamp(0.0, transform.orig_width as f32);
            let y1 = ((y1_input - transform.offset_y) / transform.scale)
                .clamp(0.0, transform.orig_height as f32);
            let x2 = ((x2_input - transform.offset_x) / transform.scale)
                .clamp(0.0, transform.orig_width as f32);
            let y2 = ((y2_input - transform.offset_y) / transform.scale)
                .clamp(0.0, transform.orig_height as f32);

            if x2 <= x1 || y2 <= y1 {
                continue;
            }

            candidates.push(Detection {
                class_id,
                confidence,
                bbox: BoundingBox { x1, y1, x2, y2 },
            });
        }

        Ok(self.non_max_suppression(candidates))
    }

    /// Greedy per-class NMS, highest confidence first.
    fn non_max_suppression(&self, mut candidates: Vec<Detection>) -> Vec<Detection> {
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());
        for det in candidates {
            let suppressed = kept.iter().any(|k| {
                k.class_id == det.class_id && k.bbox.iou(&det.bbox) > self.iou_threshold
            });
            if !suppressed {
                kept.push(det);
            }
        }
        kept
    }
}

fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    (
        cx - w / 2.0,
        cy - h / 2.0,
        cx + w / 2.0,
        cy + h / 2.0,
    )
}
