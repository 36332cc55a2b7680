//! The generic decoder: JSON text to typed objects.
//!
//! Object types derive `LenientDeserialize`, so a field with the wrong shape
//! is left at its default instead of failing the whole file. Those defaults
//! are exactly the sentinels the reconciler later looks for.

use crate::category::Category;
use crate::error::{Error, Result};
use crate::objects::Stats;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A field that absorbs members of its parent object (`#[serde(flatten)]`).
pub trait Flatten {
    /// Takes `raw` when `key` belongs to this field; ignores it otherwise.
    fn absorb(&mut self, key: &str, raw: Value) -> std::result::Result<(), serde_json::Error>;
}

impl Flatten for Stats {
    fn absorb(&mut self, key: &str, raw: Value) -> std::result::Result<(), serde_json::Error> {
        if let Some(slot) = self.get_mut(key) {
            *slot = serde_json::from_value(raw)?;
        }
        Ok(())
    }
}

/// Decodes an array file.
pub fn decode_array<T: DeserializeOwned>(category: Category, text: &str) -> Result<Vec<T>> {
    serde_json::from_str(text).map_err(|source| Error::CategoryParse { category, source })
}

/// Decodes a single-object file.
pub fn decode_object<T: DeserializeOwned>(category: Category, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| Error::CategoryParse { category, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::Building;

    #[test]
    fn test_malformed_field_keeps_default() {
        let buildings: Vec<Building> = decode_array(
            Category::Buildings,
            r#"[
                { "name": "Granary", "cost": "40", "food": 2, "requiredTech": "Pottery" },
                { "name": "Monument", "cost": 40, "culture": "lots", "uniques": ["A"] }
            ]"#,
        )
        .unwrap();

        assert_eq!(buildings[0].cost, -1);
        assert_eq!(buildings[0].stats.food, 2.0);
        assert_eq!(buildings[0].required_tech.as_deref(), Some("Pottery"));
        assert_eq!(buildings[1].cost, 40);
        assert_eq!(buildings[1].stats.culture, 0.0);
        assert_eq!(buildings[1].uniques, vec!["A"]);
    }

    #[test]
    fn test_unparseable_file() {
        let err = decode_array::<Building>(Category::Buildings, "[{").unwrap_err();
        assert!(matches!(
            err,
            Error::CategoryParse {
                category: Category::Buildings,
                ..
            }
        ));
    }
}
