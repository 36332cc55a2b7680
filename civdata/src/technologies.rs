use crate::filter::FilterTarget;
use crate::objects::impl_ruleset_object;
use crate::reconcile::{
    RawEntry, Reconcile, ReconcileReport, nested_index, read_nested, reconcile_all,
};
use civdata_derive::{LenientDeserialize, Reconcile};
use civjson::RawDocumentIndex;
use serde::Serialize;

/// Era assumed for columns that do not name one.
pub const DEFAULT_ERA: &str = "Ancient era";

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub name: String,

    /// Research cost; 0 inherits the column's tech cost.
    #[reconcile]
    pub cost: i32,

    #[reconcile]
    pub row: i32,

    #[reconcile]
    pub quote: String,

    #[reconcile]
    pub prerequisites: Vec<String>,

    #[reconcile]
    pub uniques: Vec<String>,

    /// Column this technology was loaded from.
    #[serde(skip_deserializing)]
    pub column: Option<TechColumnInfo>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl_ruleset_object!(Technology);

impl Technology {
    pub fn era(&self) -> Option<&str> {
        self.column.as_ref().map(|c| c.era.as_str())
    }
}

impl FilterTarget for Technology {
    fn keywords(&self) -> Vec<&str> {
        self.era().into_iter().collect()
    }
}

/// The column values a technology keeps after its column is flattened away.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechColumnInfo {
    /// Position of the column in its file.
    pub index: usize,
    pub column_number: i32,
    pub era: String,
    pub tech_cost: i32,
    pub building_cost: i32,
    pub wonder_cost: i32,
}

/// One column of `Techs.json`.
#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct TechColumn {
    #[reconcile]
    pub column_number: i32,

    #[reconcile]
    pub era: String,

    #[reconcile]
    pub tech_cost: i32,

    /// Cost of buildings unlocked here; -1 when the column sets none.
    #[reconcile(unset = -1)]
    pub building_cost: i32,

    #[reconcile(unset = -1)]
    pub wonder_cost: i32,

    pub techs: Vec<Technology>,
}

impl Default for TechColumn {
    fn default() -> Self {
        Self {
            column_number: 0,
            era: String::new(),
            tech_cost: 0,
            building_cost: -1,
            wonder_cost: -1,
            techs: Vec::new(),
        }
    }
}

impl TechColumn {
    pub fn info(&self, index: usize) -> TechColumnInfo {
        TechColumnInfo {
            index,
            column_number: self.column_number,
            era: self.era.clone(),
            tech_cost: self.tech_cost,
            building_cost: self.building_cost,
            wonder_cost: self.wonder_cost,
        }
    }

    fn reconcile_techs(&mut self, raw: RawEntry<'_>) -> ReconcileReport {
        if self.techs.is_empty()
            && let Some(techs) = read_nested(raw, "techs")
        {
            self.techs = techs;
        }
        match nested_index(raw, "techs") {
            Some(index) => reconcile_all(&mut self.techs, &index),
            None => ReconcileReport {
                skipped: self.techs.len(),
                ..ReconcileReport::default()
            },
        }
    }
}

/// Columns carry no names, so they pair with raw entries by position only.
pub fn reconcile_columns(columns: &mut [TechColumn], raw: &RawDocumentIndex) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for (index, column) in columns.iter_mut().enumerate() {
        let Some(entry) = raw.entry(index) else {
            report.skipped += 1 + column.techs.len();
            continue;
        };
        report.objects += 1;
        report.fields_filled += column.reconcile_fields(entry);

        let techs = column.reconcile_techs(entry);
        report.objects += techs.objects;
        report.renamed += techs.renamed;
        report.fields_filled += techs.fields_filled;
        report.skipped += techs.skipped;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"[
        {
            "columnNumber": 0,
            "era": "Ancient era",
            "techCost": 20,
            "buildingCost": "40",
            "wonderCost": 185,
            "techs": [
                { "name": "Agriculture", "row": 5, "cost": "x" },
                { "name": "Pottery", "row": "3", "prerequisites": ["Agriculture"] }
            ]
        },
        {
            "columnNumber": 1,
            "techCost": 35,
            "techs": "oops"
        }
    ]"#;

    #[test]
    fn test_columns_and_nested_techs() {
        let mut columns: Vec<TechColumn> = serde_json::from_str(RAW).unwrap();
        assert_eq!(columns[0].building_cost, -1);
        assert_eq!(columns[0].techs[1].row, 0);

        let report = reconcile_columns(&mut columns, &RawDocumentIndex::parse(RAW).unwrap());

        assert_eq!(columns[0].building_cost, 40);
        assert_eq!(columns[0].wonder_cost, 185);
        assert_eq!(columns[0].techs[1].row, 3);
        assert_eq!(columns[0].techs[0].cost, 0);
        assert_eq!(columns[0].techs[1].prerequisites, vec!["Agriculture"]);
        assert!(columns[1].techs.is_empty());
        assert_eq!(columns[1].building_cost, -1);
        assert_eq!(report.objects, 4);
    }

    #[test]
    fn test_tech_keywords_follow_column_era() {
        let mut tech = Technology {
            name: "Writing".to_string(),
            ..Technology::default()
        };
        assert!(tech.keywords().is_empty());

        tech.column = Some(TechColumn::default().info(0));
        tech.column.as_mut().unwrap().era = DEFAULT_ERA.to_string();
        assert_eq!(tech.keywords(), vec![DEFAULT_ERA]);
    }
}
