use crate::filter::FilterTarget;
use crate::objects::{Counter, Stats, impl_ruleset_object};
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::Serialize;

/// Cost value meaning "take it from the tech column".
pub const UNSET_COST: i32 = -1;

/// Unique that keeps a building out of cost resolution when unconditional.
pub const UNBUILDABLE: &str = "Unbuildable";

/// A city building, national wonder or world wonder.
#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub name: String,

    /// Production cost; [`UNSET_COST`] until post-processing resolves it.
    #[reconcile(unset = UNSET_COST)]
    pub cost: i32,

    #[reconcile]
    pub maintenance: i32,

    #[reconcile]
    pub hurry_cost_modifier: i32,

    #[reconcile]
    pub is_wonder: bool,

    #[reconcile]
    pub is_national_wonder: bool,

    #[reconcile]
    pub required_tech: Option<String>,

    #[reconcile]
    pub required_building: Option<String>,

    #[reconcile]
    pub required_resource: Option<String>,

    #[reconcile]
    pub required_nearby_improved_resources: Vec<String>,

    #[reconcile]
    pub city_strength: f32,

    #[reconcile]
    pub city_health: i32,

    /// Building this one replaces for its `unique_to` civilization.
    #[reconcile]
    pub replaces: Option<String>,

    #[reconcile]
    pub unique_to: Option<String>,

    #[reconcile]
    pub quote: String,

    #[reconcile]
    pub replacement_text_for_uniques: String,

    #[reconcile]
    pub great_person_points: Counter,

    #[reconcile]
    pub specialist_slots: Counter,

    #[reconcile(flatten)]
    #[serde(flatten)]
    pub stats: Stats,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Building {
    fn default() -> Self {
        Self {
            name: String::new(),
            cost: UNSET_COST,
            maintenance: 0,
            hurry_cost_modifier: 0,
            is_wonder: false,
            is_national_wonder: false,
            required_tech: None,
            required_building: None,
            required_resource: None,
            required_nearby_improved_resources: Vec::new(),
            city_strength: 0.0,
            city_health: 0,
            replaces: None,
            unique_to: None,
            quote: String::new(),
            replacement_text_for_uniques: String::new(),
            great_person_points: Counter::new(),
            specialist_slots: Counter::new(),
            stats: Stats::default(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

impl_ruleset_object!(Building);

impl Building {
    pub fn is_any_wonder(&self) -> bool {
        self.is_wonder || self.is_national_wonder
    }
}

impl FilterTarget for Building {
    fn keywords(&self) -> Vec<&str> {
        let mut keywords = if self.is_any_wonder() {
            vec!["Wonder", "Wonders"]
        } else {
            vec!["Building", "Buildings"]
        };
        if self.is_wonder {
            keywords.push("World Wonder");
        }
        if self.is_national_wonder {
            keywords.push("National Wonder");
        }
        if let Some(replaces) = &self.replaces {
            keywords.push(replaces);
        }
        keywords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{Reconcile, reconcile_all};
    use civjson::RawDocumentIndex;

    const RAW: &str = r#"[
        {
            "name": "Granary",
            "cost": "40",
            "food": 2,
            "production": "1",
            "isWonder": "false",
            "requiredTech": "Pottery",
            "specialistSlots": { "Engineer": { "value": 1 } },
            "uniques": ["[+1 Food] from [Wheat] tiles [in this city]"]
        },
        { "name": "Walls", "cost": 75, "cityStrength": 5, "cityHealth": 50 }
    ]"#;

    #[test]
    fn test_reconcile_fills_decoder_gaps() {
        let mut buildings: Vec<Building> = serde_json::from_str(RAW).unwrap();
        assert_eq!(buildings[0].cost, UNSET_COST);
        assert!(buildings[0].specialist_slots.is_empty());
        assert_eq!(buildings[0].stats.production, 0.0);

        let index = RawDocumentIndex::parse(RAW).unwrap();
        let report = reconcile_all(&mut buildings, &index);

        assert_eq!(report.objects, 2);
        assert_eq!(buildings[0].cost, 40);
        assert_eq!(buildings[0].stats.production, 1.0);
        assert_eq!(buildings[0].stats.food, 2.0);
        assert_eq!(buildings[0].specialist_slots.get("Engineer"), Some(&1));
        assert_eq!(buildings[1].city_strength, 5.0);
        assert_eq!(buildings[1].cost, 75);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut buildings: Vec<Building> = serde_json::from_str(RAW).unwrap();
        let index = RawDocumentIndex::parse(RAW).unwrap();
        reconcile_all(&mut buildings, &index);
        let once = buildings.clone();

        let second = reconcile_all(&mut buildings, &index);
        assert!(!second.changed());
        assert_eq!(buildings, once);
    }

    #[test]
    fn test_decoded_value_is_never_overwritten() {
        let mut building = Building {
            name: "Granary".to_string(),
            cost: 60,
            quote: "Bread".to_string(),
            ..Building::default()
        };
        let index = RawDocumentIndex::parse(RAW).unwrap();
        building.reconcile_fields(index.entry(0).unwrap());

        assert_eq!(building.cost, 60);
        assert_eq!(building.quote, "Bread");
        assert_eq!(building.required_tech.as_deref(), Some("Pottery"));
    }

    #[test]
    fn test_reconciled_keys() {
        let keys = Building::reconciled_keys();
        assert!(keys.contains(&"cost"));
        assert!(keys.contains(&"requiredNearbyImprovedResources"));
        assert!(keys.contains(&"*"));
        assert!(!keys.contains(&"name"));
    }

    #[test]
    fn test_keywords() {
        let wonder = Building {
            name: "Pyramids".to_string(),
            is_wonder: true,
            ..Building::default()
        };
        assert!(wonder.keywords().contains(&"World Wonder"));
        assert!(!wonder.keywords().contains(&"Building"));
    }
}
