use crate::catalog::{ClassCatalog, UnknownClassError};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Per-class detection counts for the most recent analyzed image.
///
/// Always carries every catalog class (zero-initialized) so tables and
/// charts downstream see a complete, stable key set. Iteration and JSON
/// serialization follow catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountSummary {
    entries: Vec<(&'static str, u64)>,
}

impl CountSummary {
    /// A summary with every catalog class present at zero.
    pub fn zeroed(catalog: &ClassCatalog) -> Self {
        Self {
            entries: catalog.classes().map(|c| (c.name, 0)).collect(),
        }
    }

    /// Increment the count for `class_id`, resolving it through the catalog.
    pub fn record(
        &mut self,
        catalog: &ClassCatalog,
        class_id: u16,
    ) -> Result<&'static str, UnknownClassError> {
        let spec = catalog.require(class_id)?;
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == spec.name) {
            entry.1 += 1;
        }
        Ok(spec.name)
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.entries.iter().map(|(_, count)| *count).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CountSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_covers_full_catalog() {
        let catalog = ClassCatalog::blood_cells();
        let counts = CountSummary::zeroed(&catalog);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.get("Platelets"), Some(0));
        assert_eq!(counts.get("RBC"), Some(0));
        assert_eq!(counts.get("WBC"), Some(0));
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn record_increments_only_the_named_class() {
        let catalog = ClassCatalog::blood_cells();
        let mut counts = CountSummary::zeroed(&catalog);
        for _ in 0..4 {
            counts.record(&catalog, 1).unwrap();
        }
        assert_eq!(counts.get("RBC"), Some(4));
        assert_eq!(counts.get("Platelets"), Some(0));
        assert_eq!(counts.get("WBC"), Some(0));
    }

    #[test]
    fn record_fails_on_unknown_class() {
        let catalog = ClassCatalog::blood_cells();
        let mut counts = CountSummary::zeroed(&catalog);
        assert_eq!(counts.record(&catalog, 99), Err(UnknownClassError(99)));
    }

    #[test]
    fn serializes_as_map_in_catalog_order() {
        let catalog = ClassCatalog::blood_cells();
        let mut counts = CountSummary::zeroed(&catalog);
        counts.record(&catalog, 2).unwrap();
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"Platelets":0,"RBC":0,"WBC":1}"#);
    }
}
