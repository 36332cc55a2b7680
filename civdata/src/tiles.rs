use crate::objects::{DepositAmount, Stats, impl_ruleset_object};
use crate::reconcile::raw_scalar_enum;
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::{Deserialize, Serialize};

/// Prefix of improvements that clear a terrain feature.
pub const REMOVE_PREFIX: &str = "Remove ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainType {
    Land,
    Water,
    TerrainFeature,
    NaturalWonder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Bonus,
    Strategic,
    Luxury,
}

raw_scalar_enum!(TerrainType, ResourceType);

#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Terrain {
    pub name: String,

    #[reconcile]
    pub r#type: Option<TerrainType>,

    #[reconcile]
    pub override_stats: bool,

    #[reconcile]
    pub unbuildable: bool,

    #[reconcile]
    pub turns_into: Option<String>,

    /// Map generation weight.
    #[reconcile(unset = 10)]
    pub weight: i32,

    #[reconcile(unset = 1)]
    pub movement_cost: i32,

    #[reconcile]
    pub defence_bonus: f32,

    #[reconcile]
    pub impassable: bool,

    /// Base terrains a feature or wonder can appear on.
    #[reconcile]
    pub occurs_on: Vec<String>,

    #[reconcile]
    #[serde(rename = "RGB")]
    pub rgb: Vec<i32>,

    #[reconcile(flatten)]
    #[serde(flatten)]
    pub stats: Stats,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            name: String::new(),
            r#type: None,
            override_stats: false,
            unbuildable: false,
            turns_into: None,
            weight: 10,
            movement_cost: 1,
            defence_bonus: 0.0,
            impassable: false,
            occurs_on: Vec::new(),
            rgb: Vec::new(),
            stats: Stats::default(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct TileResource {
    pub name: String,

    #[reconcile]
    pub resource_type: Option<ResourceType>,

    #[reconcile]
    pub terrains_can_be_found_on: Vec<String>,

    #[reconcile]
    pub revealed_by: Option<String>,

    #[reconcile]
    pub improvement: Option<String>,

    #[reconcile]
    pub improved_by: Vec<String>,

    /// Extra yield once improved.
    #[reconcile]
    pub improvement_stats: Stats,

    #[reconcile]
    pub major_deposit_amount: DepositAmount,

    #[reconcile]
    pub minor_deposit_amount: DepositAmount,

    #[reconcile(flatten)]
    #[serde(flatten)]
    pub stats: Stats,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct TileImprovement {
    pub name: String,

    #[reconcile]
    pub replaces: Option<String>,

    #[reconcile]
    pub terrains_can_be_built_on: Vec<String>,

    #[reconcile]
    pub tech_required: Option<String>,

    #[reconcile]
    pub unique_to: Option<String>,

    /// -1 for improvements that are never worked on by a builder.
    #[reconcile(unset = -1)]
    pub turns_to_build: i32,

    #[reconcile(flatten)]
    #[serde(flatten)]
    pub stats: Stats,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for TileImprovement {
    fn default() -> Self {
        Self {
            name: String::new(),
            replaces: None,
            terrains_can_be_built_on: Vec::new(),
            tech_required: None,
            unique_to: None,
            turns_to_build: -1,
            stats: Stats::default(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

impl TileImprovement {
    pub fn is_removal(&self) -> bool {
        self.name.starts_with(REMOVE_PREFIX)
    }
}

impl_ruleset_object!(Terrain, TileResource, TileImprovement);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile_all;
    use civjson::RawDocumentIndex;

    #[test]
    fn test_terrain_type_and_colors() {
        let text = r#"[
            { "name": "Grassland", "type": "Land", "food": 2, "RGB": [97, 171, 58] },
            { "name": "Oasis", "type": "TerrainFeature ", "occursOn": ["Desert"], "RGB": ["1", 2, 3] }
        ]"#;
        let mut terrains: Vec<Terrain> = serde_json::from_str(text).unwrap();
        assert_eq!(terrains[0].r#type, Some(TerrainType::Land));
        assert_eq!(terrains[1].r#type, None);

        reconcile_all(&mut terrains, &RawDocumentIndex::parse(text).unwrap());
        assert_eq!(terrains[1].r#type, Some(TerrainType::TerrainFeature));
        assert_eq!(terrains[1].rgb, vec![1, 2, 3]);
        assert_eq!(terrains[0].rgb, vec![97, 171, 58]);
        assert_eq!(terrains[0].weight, 10);
    }

    #[test]
    fn test_resource_nested_blocks() {
        let text = r#"[
            {
                "name": "Iron",
                "resourceType": "Strategic",
                "majorDepositAmount": { "sparse": "4", "default": 6, "abundant": 9 },
                "improvementStats": { "production": "1" }
            }
        ]"#;
        let mut resources: Vec<TileResource> = serde_json::from_str(text).unwrap();
        assert_eq!(resources[0].major_deposit_amount, DepositAmount::default());

        reconcile_all(&mut resources, &RawDocumentIndex::parse(text).unwrap());
        let iron = &resources[0];
        assert_eq!(iron.resource_type, Some(ResourceType::Strategic));
        assert_eq!(
            iron.major_deposit_amount,
            DepositAmount {
                sparse: 4,
                default: 6,
                abundant: 9
            }
        );
        assert_eq!(iron.minor_deposit_amount, DepositAmount::default());
        assert_eq!(iron.improvement_stats.production, 1.0);
    }

    #[test]
    fn test_removal_improvements() {
        let remove = TileImprovement {
            name: "Remove Forest".to_string(),
            ..TileImprovement::default()
        };
        assert!(remove.is_removal());
        assert!(!TileImprovement::default().is_removal());
    }
}
