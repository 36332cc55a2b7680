use crate::filter::FilterTarget;
use crate::objects::{Counter, impl_ruleset_object};
use crate::reconcile::{
    RawEntry, RawField, Reconcile, ReconcileReport, nested_index, read_nested, reconcile_all,
};
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::Serialize;

/// Appended to a branch name to name its finisher.
pub const BRANCH_COMPLETE_SUFFIX: &str = "Complete";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PolicyType {
    #[default]
    Regular,
    /// The entry standing for the branch itself.
    Branch,
    /// The last policy of a branch, awarded on completion.
    Finisher,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub name: String,

    #[reconcile]
    pub row: i32,

    #[reconcile]
    pub column: i32,

    /// Prerequisite policies; `None` in the file means "the branch itself".
    pub requires: Option<Vec<String>>,

    #[reconcile]
    pub uniques: Vec<String>,

    /// Name of the owning branch.
    #[serde(skip_deserializing)]
    pub branch: String,

    #[serde(skip_deserializing)]
    pub policy_type: PolicyType,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Policy {
    /// Fills `requires` from the raw entry while decoding left it out.
    fn reconcile_requires(&mut self, raw: RawEntry<'_>) -> usize {
        if self.requires.is_none()
            && let Some(requires) = <Vec<String> as RawField>::read_raw(raw, "requires")
            && !requires.is_empty()
        {
            self.requires = Some(requires);
            return 1;
        }
        0
    }

    pub fn is_branch(&self) -> bool {
        self.policy_type == PolicyType::Branch
    }
}

impl FilterTarget for Policy {
    fn has_keyword(&self, keyword: &str) -> bool {
        keyword
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix("] branch"))
            .is_some_and(|branch| branch == self.branch)
    }
}

/// A policy tree. `Policies.json` is an array of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBranch {
    pub name: String,

    /// Era in which the branch unlocks.
    pub era: String,

    /// AI weight of the branch per victory type.
    pub priorities: Counter,

    pub uniques: Vec<String>,

    pub policies: Vec<Policy>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl_ruleset_object!(Policy, PolicyBranch);

impl PolicyBranch {
    /// Name the branch's last policy carries once loaded.
    pub fn finisher_name(&self) -> String {
        format!("{}{}", self.name, BRANCH_COMPLETE_SUFFIX)
    }

    /// The branch as an entry of the policies table.
    pub fn as_policy(&self) -> Policy {
        Policy {
            name: self.name.clone(),
            row: 0,
            column: 0,
            requires: Some(Vec::new()),
            uniques: self.uniques.clone(),
            branch: self.name.clone(),
            policy_type: PolicyType::Branch,
            origin_ruleset: self.origin_ruleset.clone(),
        }
    }

    fn reconcile_policies(&mut self, raw: RawEntry<'_>) -> ReconcileReport {
        if self.policies.is_empty()
            && let Some(policies) = read_nested::<Policy>(raw, "policies")
        {
            self.policies = policies
                .into_iter()
                .filter(|p| !p.name.trim().is_empty())
                .collect();
        }
        let Some(index) = nested_index(raw, "policies") else {
            return ReconcileReport::default();
        };
        let mut report = reconcile_all(&mut self.policies, &index);
        for (position, policy) in self.policies.iter_mut().enumerate() {
            let entry = index.by_name(&policy.name).or_else(|| index.entry(position));
            if let Some(entry) = entry {
                report.fields_filled += policy.reconcile_requires(entry);
            }
        }
        report
    }
}

impl Reconcile for PolicyBranch {
    fn reconcile_fields(&mut self, raw: RawEntry<'_>) -> usize {
        let mut filled = 0;
        if let Some(found) = String::read_raw(raw, "era")
            && self.era.merge_unset(found)
        {
            filled += 1;
        }
        if let Some(found) = Counter::read_raw(raw, "priorities")
            && self.priorities.merge_unset(found)
        {
            filled += 1;
        }
        if let Some(found) = <Vec<String>>::read_raw(raw, "uniques")
            && self.uniques.merge_unset(found)
        {
            filled += 1;
        }
        let policies = self.reconcile_policies(raw);
        filled + policies.fields_filled + policies.renamed
    }

    fn reconciled_keys() -> &'static [&'static str] {
        &["era", "priorities", "uniques", "policies"]
    }
}

impl FilterTarget for PolicyBranch {
    fn keywords(&self) -> Vec<&str> {
        if self.era.is_empty() {
            Vec::new()
        } else {
            vec![self.era.as_str()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civjson::RawDocumentIndex;

    const RAW: &str = r#"[
        {
            "name": "Tradition",
            "era": "Ancient era",
            "priorities": { "Neutral": 5, "Cultural": "10" },
            "policies": [
                { "name": "Aristocracy", "row": 1, "column": 1 },
                { "name": "Legalism", "row": "1", "column": 3, "requires": ["Aristocracy"] },
                { "name": "Tradition Complete", "uniques": ["A"] }
            ]
        },
        {
            "name": "Liberty",
            "policies": "broken"
        }
    ]"#;

    fn load() -> Vec<PolicyBranch> {
        let mut branches: Vec<PolicyBranch> = serde_json::from_str(RAW).unwrap();
        reconcile_all(&mut branches, &RawDocumentIndex::parse(RAW).unwrap());
        branches
    }

    #[test]
    fn test_branch_reconciliation() {
        let branches = load();
        let tradition = &branches[0];

        assert_eq!(tradition.priorities.get("Cultural"), Some(&10));
        assert_eq!(tradition.policies.len(), 3);
        assert_eq!(tradition.policies[1].row, 1);
        assert_eq!(
            tradition.policies[1].requires,
            Some(vec!["Aristocracy".to_string()])
        );
        assert_eq!(tradition.policies[0].requires, None);
        assert!(branches[1].policies.is_empty());
    }

    #[test]
    fn test_branch_reconciliation_is_idempotent() {
        let mut branches = load();
        let once = branches.clone();
        let report = reconcile_all(&mut branches, &RawDocumentIndex::parse(RAW).unwrap());
        assert!(!report.changed());
        assert_eq!(branches, once);
    }

    #[test]
    fn test_branch_keyword_on_policies() {
        let policy = Policy {
            name: "Legalism".to_string(),
            branch: "Tradition".to_string(),
            ..Policy::default()
        };
        assert!(policy.has_keyword("[Tradition] branch"));
        assert!(!policy.has_keyword("[Liberty] branch"));
        assert!(!policy.has_keyword("Tradition"));
    }

    #[test]
    fn test_as_policy() {
        let branches = load();
        let branch = &branches[0];
        let entry = branch.as_policy();
        assert!(entry.is_branch());
        assert_eq!(entry.branch, "Tradition");
        assert_eq!(branch.finisher_name(), "TraditionComplete");
    }
}
