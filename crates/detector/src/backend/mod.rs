use ndarray::{Array, ArrayD, IxDyn};

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Backend abstraction over the pretrained detection model.
///
/// Input is a normalized NCHW batch `[1, 3, H, W]`; output is the raw
/// prediction tensor `[1, 4 + num_classes, num_candidates]` with boxes in
/// cxcywh input-pixel coordinates.
pub trait DetectionBackend {
    fn load_model(path: &str) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>>;
}
