//! Gap filling of decoded objects from their raw parse tree.
//!
//! Each object type carries a table of fragile fields (generated by
//! `#[derive(Reconcile)]` from `#[reconcile]` attributes, or written by hand
//! for nested shapes). A field is filled from the raw entry only while it
//! still holds its sentinel, so reconciling twice is the same as once.

use crate::objects::{Counter, DepositAmount, RulesetObject, Stats};
use civjson::RawDocumentIndex;
pub use civjson::RawEntry;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A field type the reconciler knows how to read and how to recognise as
/// never set.
pub trait RawField: Sized {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self>;

    fn is_unset(&self) -> bool;

    /// Replaces `self` with `found` while `self` is unset. Returns true when
    /// something changed.
    fn merge_unset(&mut self, found: Self) -> bool {
        if self.is_unset() && !found.is_unset() {
            *self = found;
            true
        } else {
            false
        }
    }
}

/// A field stored on the parent object itself (`#[reconcile(flatten)]`).
pub trait FlatRawField: RawField {
    fn read_flat(raw: RawEntry<'_>) -> Option<Self>;
}

/// Scalars spelled as a JSON string: plain strings and unit enums.
pub trait RawScalar: Sized {
    fn from_raw_str(text: &str) -> Option<Self>;
}

impl RawScalar for String {
    fn from_raw_str(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

/// Implements [`RawScalar`] for enums through their serde spelling.
macro_rules! raw_scalar_enum {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::reconcile::RawScalar for $ty {
                fn from_raw_str(text: &str) -> Option<Self> {
                    ::serde_json::from_value(::serde_json::Value::String(text.trim().to_string())).ok()
                }
            }
        )*
    };
}

pub(crate) use raw_scalar_enum;

/// Per object type fill table.
pub trait Reconcile {
    /// Fills sentinel fields from `raw`. Returns how many fields changed.
    fn reconcile_fields(&mut self, raw: RawEntry<'_>) -> usize;

    /// JSON keys consulted, `"*"` for members read from the object itself.
    fn reconciled_keys() -> &'static [&'static str]
    where
        Self: Sized;
}

impl RawField for String {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        raw.get_string_or_none(key)
    }

    fn is_unset(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T: RawScalar> RawField for Option<T> {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        let text = raw.get_string_or_none(key)?;
        T::from_raw_str(&text).map(Some)
    }

    fn is_unset(&self) -> bool {
        self.is_none()
    }
}

impl RawField for i32 {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        raw.child(key)?.as_int()
    }

    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl RawField for f32 {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        raw.child(key)?.as_float()
    }

    fn is_unset(&self) -> bool {
        *self == 0.0
    }
}

impl RawField for bool {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        raw.child(key)?.as_bool()
    }

    fn is_unset(&self) -> bool {
        !*self
    }
}

impl RawField for Vec<String> {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        raw.has(key).then(|| raw.get_string_array(key))
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl RawField for Vec<i32> {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        raw.has(key).then(|| raw.get_int_array(key))
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl RawField for Counter {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        raw.get_counter(key).map(|pairs| pairs.into_iter().collect())
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl RawField for DepositAmount {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        let block = raw.child(key).filter(|c| c.is_object())?;
        let unset = DepositAmount::default();
        Some(DepositAmount {
            sparse: block.get_int("sparse", unset.sparse),
            default: block.get_int("default", unset.default),
            abundant: block.get_int("abundant", unset.abundant),
        })
    }

    fn is_unset(&self) -> bool {
        *self == DepositAmount::default()
    }
}

impl RawField for Stats {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        Self::read_flat(raw.child(key).filter(|c| c.is_object())?)
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }

    /// Stats are filled component by component.
    fn merge_unset(&mut self, found: Self) -> bool {
        let mut changed = false;
        for key in Stats::KEYS {
            if let (Some(slot), Some(value)) = (self.get_mut(key), found.get(key))
                && *slot == 0.0
                && value != 0.0
            {
                *slot = value;
                changed = true;
            }
        }
        changed
    }
}

impl FlatRawField for Stats {
    fn read_flat(raw: RawEntry<'_>) -> Option<Self> {
        let mut stats = Stats::default();
        let mut any = false;
        for key in Stats::KEYS {
            if let Some(value) = raw.child(key).and_then(|c| c.as_float())
                && let Some(slot) = stats.get_mut(key)
            {
                *slot = value;
                any = true;
            }
        }
        any.then_some(stats)
    }
}

/// Decodes `raw[key]` with serde when the decoded list came back empty.
///
/// Used for nested object arrays whose elements are themselves lenient.
pub(crate) fn read_nested<T: DeserializeOwned>(raw: RawEntry<'_>, key: &str) -> Option<Vec<T>> {
    let items = raw.child(key).filter(|c| c.is_array())?;
    serde_json::from_value::<Vec<T>>(items.value().clone()).ok()
}

/// Counts of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Objects matched with a raw entry.
    pub objects: usize,
    /// Objects whose name was replaced by the raw name.
    pub renamed: usize,
    /// Fields filled, across all objects.
    pub fields_filled: usize,
    /// Objects with no raw counterpart, left as decoded.
    pub skipped: usize,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.renamed > 0 || self.fields_filled > 0
    }
}

/// Reconciles every decoded object against the raw document.
///
/// The raw entry for the object at position `i` is the first raw entry named
/// like the object, or else the raw entry at `i`. A non-blank raw name is
/// authoritative and replaces the decoded one.
pub fn reconcile_all<T>(items: &mut [T], raw: &RawDocumentIndex) -> ReconcileReport
where
    T: RulesetObject + Reconcile,
{
    let mut report = ReconcileReport::default();
    if items.len() != raw.len() {
        log::debug!(
            "Decoded {} objects but the raw document has {} entries",
            items.len(),
            raw.len()
        );
    }

    for (index, item) in items.iter_mut().enumerate() {
        let entry = match raw.by_name(item.name()) {
            Some(entry) => entry,
            None => match raw.entry(index) {
                Some(entry) => entry,
                None => {
                    report.skipped += 1;
                    continue;
                }
            },
        };
        report.objects += 1;

        if let Some(raw_name) = entry.name()
            && raw_name != item.name()
        {
            log::trace!("Renaming decoded '{}' to '{}'", item.name(), raw_name);
            item.set_name(raw_name.to_string());
            report.renamed += 1;
        }
        report.fields_filled += item.reconcile_fields(entry);
    }

    report
}

/// Builds an index over a nested array such as a column's `techs`.
pub(crate) fn nested_index(raw: RawEntry<'_>, key: &str) -> Option<RawDocumentIndex> {
    let items = raw.child(key).filter(|c| c.is_array())?;
    Some(RawDocumentIndex::from_value(Value::clone(items.value())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_fill_only() {
        let v = json!({
            "unitType": "Melee",
            "promotions": ["Shock I", ""],
            "strength": "8",
            "requiredTech": "  "
        });
        let raw = RawEntry::new(&v);

        let mut unit_type = String::new();
        assert!(unit_type.merge_unset(String::read_raw(raw, "unitType").unwrap()));
        assert_eq!(unit_type, "Melee");

        let mut kept = "Ranged".to_string();
        assert!(!kept.merge_unset(String::read_raw(raw, "unitType").unwrap()));
        assert_eq!(kept, "Ranged");

        assert_eq!(
            <Vec<String>>::read_raw(raw, "promotions"),
            Some(vec!["Shock I".to_string()])
        );
        assert_eq!(i32::read_raw(raw, "strength"), Some(8));
        assert_eq!(<Option<String>>::read_raw(raw, "requiredTech"), None);
        assert_eq!(<Vec<String>>::read_raw(raw, "uniques"), None);
    }

    #[test]
    fn test_positional_match_and_skip() {
        use crate::buildings::Building;

        let raw = RawDocumentIndex::parse(r#"[{ "name": "Granary", "cost": 40 }]"#).unwrap();
        let mut items = vec![
            Building {
                name: "Garbled".to_string(),
                ..Building::default()
            },
            Building {
                name: "Extra".to_string(),
                ..Building::default()
            },
        ];

        let report = reconcile_all(&mut items, &raw);
        assert_eq!(
            report,
            ReconcileReport {
                objects: 1,
                renamed: 1,
                fields_filled: 1,
                skipped: 1,
            }
        );
        let names: Vec<&str> = items.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Granary", "Extra"]);
        assert_eq!(items[0].cost, 40);
        assert_eq!(items[1].cost, -1);

        assert!(!reconcile_all(&mut items, &raw).changed());
    }

    #[test]
    fn test_stats_merge_per_component() {
        let v = json!({ "production": 2, "food": "1", "gold": "x" });
        let found = Stats::read_flat(RawEntry::new(&v)).unwrap();
        assert_eq!(found.food, 1.0);

        let mut stats = Stats {
            production: 5.0,
            ..Stats::default()
        };
        assert!(stats.merge_unset(found.clone()));
        assert_eq!(stats.production, 5.0);
        assert_eq!(stats.food, 1.0);
        assert!(!stats.merge_unset(found));
    }

    #[test]
    fn test_flat_stats_absent() {
        let v = json!({ "name": "Ruins" });
        assert!(Stats::read_flat(RawEntry::new(&v)).is_none());
    }

    #[test]
    fn test_deposit_amount_partial_block() {
        let v = json!({ "majorDepositAmount": { "sparse": 4 } });
        let found = DepositAmount::read_raw(RawEntry::new(&v), "majorDepositAmount").unwrap();
        assert_eq!(
            found,
            DepositAmount {
                sparse: 4,
                default: 2,
                abundant: 3
            }
        );
        assert!(DepositAmount::read_raw(RawEntry::new(&v), "minorDepositAmount").is_none());
    }
}
