use crate::config::OutputPaths;
use annotator::Annotator;
use detector::ObjectDetector;
use schema::{BoxRecord, CountSummary};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One complete analysis result. Counts, display records, and the annotated
/// JPEG come from the same request and are swapped as a unit, so a reader
/// can never observe counts paired with another upload's image.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub counts: CountSummary,
    pub boxes: Vec<BoxRecord>,
    pub annotated_jpeg: Vec<u8>,
}

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<Mutex<Box<dyn ObjectDetector>>>,
    pub annotator: Arc<Annotator>,
    pub latest: Arc<RwLock<Option<Arc<Analysis>>>>,
    pub paths: Arc<OutputPaths>,
}

impl AppState {
    pub fn new(
        detector: Box<dyn ObjectDetector>,
        annotator: Annotator,
        paths: OutputPaths,
    ) -> Self {
        Self {
            detector: Arc::new(Mutex::new(detector)),
            annotator: Arc::new(annotator),
            latest: Arc::new(RwLock::new(None)),
            paths: Arc::new(paths),
        }
    }
}
