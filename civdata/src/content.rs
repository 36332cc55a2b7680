//! Smaller categories: events, global uniques, quests, ruins, specialists,
//! tutorials and victory types.

use crate::objects::{Counter, RulesetObject, Stats, impl_ruleset_object};
use crate::reconcile::{RawEntry, RawField};
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::{Deserialize, Serialize};

/// One line of encyclopedia text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormattedLine {
    pub text: String,
    pub link: String,
    pub header: i32,
    pub separator: bool,
}

impl RawField for Vec<FormattedLine> {
    /// Separators and non-blank text lines; anything else is dropped.
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        let lines = raw.child(key)?;
        Some(
            lines
                .elements()
                .filter_map(|line| {
                    if line.get_bool("separator", false) {
                        return Some(FormattedLine {
                            separator: true,
                            ..FormattedLine::default()
                        });
                    }
                    let text = line.get_string_or_none("text")?;
                    Some(FormattedLine {
                        text,
                        link: line.get_string("link", ""),
                        header: line.get_int("header", 0),
                        separator: false,
                    })
                })
                .collect(),
        )
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// A choice offered by an [`Event`]; identified by its text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChoice {
    pub text: String,

    pub uniques: Vec<String>,

    pub civilopedia_text: Vec<FormattedLine>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl RulesetObject for EventChoice {
    fn name(&self) -> &str {
        &self.text
    }

    fn set_name(&mut self, name: String) {
        self.text = name;
    }

    fn uniques(&self) -> &[String] {
        &self.uniques
    }

    fn origin_ruleset(&self) -> &str {
        &self.origin_ruleset
    }

    fn set_origin_ruleset(&mut self, origin: &str) {
        self.origin_ruleset = origin.to_string();
    }
}

impl RawField for Vec<EventChoice> {
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        let choices = raw.child(key)?;
        Some(
            choices
                .elements()
                .filter(|choice| choice.is_object())
                .map(|choice| EventChoice {
                    text: choice.get_string("text", ""),
                    uniques: choice.get_string_array("uniques"),
                    civilopedia_text: <Vec<FormattedLine>>::read_raw(choice, "civilopediaText")
                        .unwrap_or_default(),
                    origin_ruleset: String::new(),
                })
                .collect(),
        )
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,

    #[reconcile]
    pub text: String,

    #[reconcile]
    pub presentation: String,

    #[reconcile]
    pub choices: Vec<EventChoice>,

    #[reconcile]
    pub civilopedia_text: Vec<FormattedLine>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Event {
    /// Provenance stamping reaches into the choices too.
    pub fn stamp_choices(&mut self) {
        for choice in &mut self.choices {
            choice.origin_ruleset.clone_from(&self.origin_ruleset);
        }
    }
}

/// Uniques applying to every civilization. Unlike other categories these
/// accumulate across packages instead of being replaced.
#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct GlobalUniques {
    pub name: String,

    #[reconcile]
    pub uniques: Vec<String>,

    /// Uniques applying to every unit.
    #[reconcile]
    pub unit_uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for GlobalUniques {
    fn default() -> Self {
        Self {
            name: "Global uniques".to_string(),
            uniques: Vec::new(),
            unit_uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

impl GlobalUniques {
    /// Appends `other`'s uniques; `other` becomes the origin if it has one.
    pub fn combine(&mut self, other: &GlobalUniques) {
        self.uniques.extend(other.uniques.iter().cloned());
        self.unit_uniques.extend(other.unit_uniques.iter().cloned());
        if !other.origin_ruleset.is_empty() {
            self.origin_ruleset.clone_from(&other.origin_ruleset);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uniques.is_empty() && self.unit_uniques.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub name: String,

    #[reconcile]
    pub description: String,

    /// `Individual` or `Global`.
    #[reconcile]
    pub r#type: String,

    #[reconcile(unset = 40.0)]
    pub influence: f32,

    /// Turns until expiry; 0 never expires.
    #[reconcile]
    pub duration: i32,

    #[reconcile(unset = 1)]
    pub minimum_civs: i32,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Quest {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            r#type: String::new(),
            influence: 40.0,
            duration: 0,
            minimum_civs: 1,
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

/// Outcome of exploring ancient ruins.
#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct RuinReward {
    pub name: String,

    #[reconcile]
    pub notification: String,

    #[reconcile]
    pub excluded_difficulties: Vec<String>,

    #[reconcile(unset = 1)]
    pub weight: i32,

    #[reconcile]
    pub color: String,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for RuinReward {
    fn default() -> Self {
        Self {
            name: String::new(),
            notification: String::new(),
            excluded_difficulties: Vec::new(),
            weight: 1,
            color: String::new(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Specialist {
    pub name: String,

    #[reconcile]
    pub color: Vec<i32>,

    #[reconcile]
    pub great_person_points: Counter,

    #[reconcile(flatten)]
    #[serde(flatten)]
    pub stats: Stats,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl RulesetObject for Specialist {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn uniques(&self) -> &[String] {
        &[]
    }

    fn origin_ruleset(&self) -> &str {
        &self.origin_ruleset
    }

    fn set_origin_ruleset(&mut self, origin: &str) {
        self.origin_ruleset = origin.to_string();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    pub name: String,

    #[reconcile]
    pub category: Option<String>,

    #[reconcile]
    pub steps: Vec<String>,

    #[reconcile]
    pub civilopedia_text: Vec<FormattedLine>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Victory {
    pub name: String,

    #[reconcile]
    pub victory_screen_header: String,

    #[reconcile]
    pub victory_string: String,

    #[reconcile]
    pub defeat_string: String,

    #[reconcile]
    pub hidden_in_victory_screen: bool,

    /// Milestone texts in completion order.
    #[reconcile]
    pub milestones: Vec<String>,

    #[reconcile]
    pub required_spaceship_parts: Vec<String>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl_ruleset_object!(Event, GlobalUniques, Quest, RuinReward, Tutorial, Victory);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile_all;
    use civjson::RawDocumentIndex;

    #[test]
    fn test_event_choices_from_raw() {
        let text = r#"[
            {
                "name": "Harvest",
                "text": "A good year",
                "choices": [
                    { "text": "Feast", "uniques": ["Gain [50] [Food]"], "civilopediaText": 3 },
                    "not a choice"
                ]
            }
        ]"#;
        let mut events: Vec<Event> = serde_json::from_str(text).unwrap();
        assert!(events[0].choices.is_empty());

        reconcile_all(&mut events, &RawDocumentIndex::parse(text).unwrap());
        let choices = &events[0].choices;
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].name(), "Feast");
        assert_eq!(choices[0].uniques, vec!["Gain [50] [Food]"]);
    }

    #[test]
    fn test_tutorial_lines() {
        let text = r#"[
            {
                "name": "Workers",
                "civilopediaText": [
                    { "text": "Build improvements" },
                    { "separator": "true" },
                    { "text": "  " },
                    { "text": "Roads", "link": "Improvement/Road", "header": "3" }
                ]
            }
        ]"#;
        let mut tutorials: Vec<Tutorial> = serde_json::from_str(text).unwrap();
        assert!(tutorials[0].civilopedia_text.is_empty());

        reconcile_all(&mut tutorials, &RawDocumentIndex::parse(text).unwrap());
        let lines = &tutorials[0].civilopedia_text;
        assert_eq!(lines.len(), 3);
        assert!(lines[1].separator);
        assert_eq!(lines[2].header, 3);
        assert_eq!(lines[2].link, "Improvement/Road");
    }

    #[test]
    fn test_global_uniques_combine() {
        let mut base = GlobalUniques {
            uniques: vec!["A".to_string()],
            ..GlobalUniques::default()
        };
        let other = GlobalUniques {
            uniques: vec!["B".to_string()],
            unit_uniques: vec!["U".to_string()],
            ..GlobalUniques::default()
        };
        base.combine(&other);

        assert_eq!(base.uniques, vec!["A", "B"]);
        assert_eq!(base.unit_uniques, vec!["U"]);
    }
}
