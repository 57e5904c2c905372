//! Ordered key/value record view consumed by [`crate::serializer::BasicSerializer`].

use crate::error::Result;
use crate::spec::EnumCellValue;

/// A record that can expose its fields as an ordered `(name, value)` list.
///
/// Field order is the record's natural order and becomes column order.
pub trait Record {
    /// Return fields in iteration order.
    fn fields(&self) -> Result<Vec<(String, EnumCellValue)>>;
}

/// Owned ordered record built field by field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRecord {
    l_fields: Vec<(String, EnumCellValue)>,
}

impl SpecRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one field, keeping insertion order.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<EnumCellValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append one field in place.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<EnumCellValue>) {
        self.l_fields.push((name.into(), value.into()));
    }

    /// Value of the first field named `name`.
    pub fn get(&self, name: &str) -> Option<&EnumCellValue> {
        self.l_fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.l_fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.l_fields.is_empty()
    }
}

impl Record for SpecRecord {
    fn fields(&self) -> Result<Vec<(String, EnumCellValue)>> {
        Ok(self.l_fields.clone())
    }
}

impl Record for Vec<(String, EnumCellValue)> {
    fn fields(&self) -> Result<Vec<(String, EnumCellValue)>> {
        Ok(self.clone())
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn fields(&self) -> Result<Vec<(String, EnumCellValue)>> {
        (**self).fields()
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, SpecRecord};
    use crate::spec::EnumCellValue;

    #[test]
    fn spec_record_keeps_insertion_order() {
        let record = SpecRecord::new().with("z", 1).with("a", "x").with("m", true);
        let l_names: Vec<String> = record
            .fields()
            .expect("fields")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(l_names, vec!["z", "a", "m"]);
        assert_eq!(record.get("a"), Some(&EnumCellValue::String("x".into())));
        assert_eq!(record.len(), 3);
    }
}
