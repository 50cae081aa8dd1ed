mod catalog;
mod counts;
mod detection;

pub use catalog::{ClassCatalog, ClassSpec, UnknownClassError};
pub use counts::CountSummary;
pub use detection::{BoundingBox, BoxRecord, Detection};
