use thiserror::Error;

/// A recognized cell class: stable model id, display name, draw color (RGB).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSpec {
    pub id: u16,
    pub name: &'static str,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown class id {0} not present in the class catalog")]
pub struct UnknownClassError(pub u16);

/// Fixed set of classes the model was trained on. Defined at process start,
/// never mutated. Class ids must match the model's output indices.
#[derive(Debug, Clone, Copy)]
pub struct ClassCatalog {
    classes: &'static [ClassSpec],
}

const BLOOD_CELL_CLASSES: &[ClassSpec] = &[
    ClassSpec {
        id: 0,
        name: "Platelets",
        color: [255, 215, 0],
    },
    ClassSpec {
        id: 1,
        name: "RBC",
        color: [220, 53, 69],
    },
    ClassSpec {
        id: 2,
        name: "WBC",
        color: [30, 144, 255],
    },
];

impl ClassCatalog {
    /// The blood-smear catalog: platelets, red cells, white cells.
    pub fn blood_cells() -> Self {
        Self {
            classes: BLOOD_CELL_CLASSES,
        }
    }

    pub fn get(&self, class_id: u16) -> Option<&'static ClassSpec> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    /// Resolve a class id, failing hard on ids the catalog does not know.
    pub fn require(&self, class_id: u16) -> Result<&'static ClassSpec, UnknownClassError> {
        self.get(class_id).ok_or(UnknownClassError(class_id))
    }

    pub fn classes(&self) -> impl Iterator<Item = &'static ClassSpec> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
