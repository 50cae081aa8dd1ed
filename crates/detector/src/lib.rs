pub mod backend;
pub mod config;
pub mod postprocess;
pub mod preprocess;

use crate::{
    backend::DetectionBackend,
    config::DetectorConfig,
    postprocess::PostProcessor,
    preprocess::Preprocessor,
};
use image::RgbImage;
use schema::Detection;

/// The detector adapter: image in, detections out. Object-safe so the
/// server can swap in a stub for tests.
pub trait ObjectDetector: Send {
    fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<Detection>>;
}

/// Wraps a model backend with letterbox preprocessing and YOLO
/// postprocessing. No retries, no timeouts; model failures surface as-is.
pub struct Detector<B: DetectionBackend> {
    backend: B,
    preprocessor: Preprocessor,
    postprocessor: PostProcessor,
}

impl<B: DetectionBackend> Detector<B> {
    pub fn new(backend: B, config: &DetectorConfig) -> Self {
        Self {
            backend,
            preprocessor: Preprocessor::new(config.input_size),
            postprocessor: PostProcessor::new(
                config.confidence_threshold,
                config.iou_threshold,
            ),
        }
    }
}

#[cfg(feature = "ort-backend")]
impl Detector<backend::ort::OrtBackend> {
    /// Load the ONNX model named by the config and build a ready detector.
    pub fn from_config(config: &DetectorConfig) -> anyhow::Result<Self> {
        let backend = backend::ort::OrtBackend::load_model(&config.model_path)?;
        Ok(Self::new(backend, config))
    }
}

impl<B: DetectionBackend + Send> ObjectDetector for Detector<B> {
    fn detect(&mut self, image: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        let (width, height) = image.dimensions();

        let (input, transform) = self
            .preprocessor
            .run(image.as_raw(), width, height)?;

        let preds = self.backend.infer(&input)?;

        let detections = self
            .postprocessor
            .parse_detections(&preds.view(), &transform)?;

        tracing::debug!(
            width,
            height,
            detections = detections.len(),
            "Image analyzed"
        );

        Ok(detections)
    }
}
