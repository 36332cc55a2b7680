//! Loading of one category of one package into name-keyed tables.

use crate::category::Category;
use crate::context::LoadContext;
use crate::decode::{decode_array, decode_object};
use crate::error::Error;
use crate::objects::{RulesetObject, Table};
use crate::package::Package;
use crate::policies::{Policy, PolicyBranch, PolicyType};
use crate::reconcile::{Reconcile, ReconcileReport, reconcile_all};
use crate::technologies::{DEFAULT_ERA, TechColumn, Technology, reconcile_columns};
use civjson::RawDocumentIndex;
use serde::de::DeserializeOwned;

/// Decodes the categories of one package, reconciling the decoder's output
/// with the raw parse tree unless the platform marks the decoder trusted.
pub struct CategoryLoader<'a> {
    package: &'a Package,
    context: &'a LoadContext,
}

impl<'a> CategoryLoader<'a> {
    pub fn new(package: &'a Package, context: &'a LoadContext) -> CategoryLoader<'a> {
        CategoryLoader { package, context }
    }

    pub fn package(&self) -> &'a Package {
        self.package
    }

    fn reconciles(&self) -> bool {
        !self.context.capabilities().trusted_decode
    }

    /// Raw index of a category file. A document the tree parser rejects is
    /// treated as having no raw source.
    fn raw_index(&self, category: Category, text: &str) -> Option<RawDocumentIndex> {
        match RawDocumentIndex::parse(text) {
            Ok(index) => Some(index),
            Err(e) => {
                log::debug!(
                    "No raw index for {} of '{}': {}",
                    category,
                    self.package.name(),
                    e
                );
                None
            }
        }
    }

    fn log_report(&self, category: Category, report: ReconcileReport) {
        if report.skipped > 0 {
            log::debug!(
                "{} of '{}': {} objects had no raw counterpart",
                category,
                self.package.name(),
                report.skipped
            );
        }
        if report.changed() {
            log::debug!(
                "{} of '{}': reconciled {} objects, {} renamed, {} fields filled",
                category,
                self.package.name(),
                report.objects,
                report.renamed,
                report.fields_filled
            );
        }
    }

    /// Text of a category file, `None` when the package has none.
    fn document(&self, category: Category) -> Option<&'a str> {
        self.package.document(category)
    }

    /// Decodes an array category. `None` when the file is absent or
    /// malformed; the latter is logged.
    pub fn load_array<T>(&self, category: Category) -> Option<Vec<T>>
    where
        T: DeserializeOwned + RulesetObject + Reconcile,
    {
        let text = self.document(category)?;
        let mut items: Vec<T> = match decode_array(category, text) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Skipping {} of '{}': {}", category, self.package.name(), e);
                return None;
            }
        };
        if self.reconciles()
            && let Some(raw) = self.raw_index(category, text)
        {
            let report = reconcile_all(&mut items, &raw);
            self.log_report(category, report);
        }
        Some(items)
    }

    /// Decodes an array category straight into its table.
    pub fn load_table<T>(&self, category: Category) -> Table<T>
    where
        T: DeserializeOwned + RulesetObject + Reconcile,
    {
        self.load_array(category)
            .map(|items| into_table(category, items, self.package.name()))
            .unwrap_or_default()
    }

    /// Decodes a single-object category.
    pub fn load_object<T>(&self, category: Category) -> Option<T>
    where
        T: DeserializeOwned + RulesetObject + Reconcile,
    {
        let text = self.document(category)?;
        let mut object: T = match decode_object(category, text) {
            Ok(object) => object,
            Err(e) => {
                log::warn!("Skipping {} of '{}': {}", category, self.package.name(), e);
                return None;
            }
        };
        if self.reconciles()
            && let Some(raw) = self.raw_index(category, text)
        {
            let filled = object.reconcile_fields(raw.root());
            if filled > 0 {
                log::debug!(
                    "{} of '{}': {} fields filled",
                    category,
                    self.package.name(),
                    filled
                );
            }
        }
        object.set_origin_ruleset(self.package.name());
        Some(object)
    }

    /// Decodes a file holding a plain array of strings.
    pub fn load_strings(&self, category: Category) -> Option<Vec<String>> {
        let text = self.document(category)?;
        match decode_array::<String>(category, text) {
            Ok(items) => Some(items),
            Err(e) => {
                log::warn!("Skipping {} of '{}': {}", category, self.package.name(), e);
                None
            }
        }
    }

    /// Decodes `Techs.json`: columns of technologies, with nameless
    /// technologies dropped and tech costs and column info filled in.
    pub fn load_tech_columns(&self) -> Option<Vec<TechColumn>> {
        let category = Category::Techs;
        let text = self.document(category)?;
        let mut columns: Vec<TechColumn> = match decode_array(category, text) {
            Ok(columns) => columns,
            Err(e) => {
                log::warn!("Skipping {} of '{}': {}", category, self.package.name(), e);
                return None;
            }
        };
        if self.reconciles()
            && let Some(raw) = self.raw_index(category, text)
        {
            let report = reconcile_columns(&mut columns, &raw);
            self.log_report(category, report);
        }

        for (index, column) in columns.iter_mut().enumerate() {
            if column.era.trim().is_empty() {
                column.era = DEFAULT_ERA.to_string();
            }
            let info = column.info(index);
            let techs = std::mem::take(&mut column.techs);
            column.techs = named(category, techs)
                .map(|mut tech| {
                    if tech.cost == 0 {
                        tech.cost = column.tech_cost;
                    }
                    tech.column = Some(info.clone());
                    tech.set_origin_ruleset(self.package.name());
                    tech
                })
                .collect();
        }
        Some(columns)
    }

    /// Decodes `Policies.json` into its branches and the flat policies
    /// table.
    ///
    /// Every branch gets one priority per victory type in `victory_types`.
    /// The branch itself is listed in the policies table, each policy points
    /// back at its branch and by default requires it, a policy sharing a slot
    /// with an earlier one replaces it, and the last policy of a branch is
    /// its finisher.
    pub fn load_policies<'v>(
        &self,
        victory_types: impl IntoIterator<Item = &'v str> + Clone,
    ) -> Option<(Table<PolicyBranch>, Table<Policy>)> {
        let origin = self.package.name();
        let mut branches = self
            .load_array::<PolicyBranch>(Category::Policies)
            .map(|items| into_table(Category::Policies, items, origin))?;
        let mut policies = Table::new();

        for branch in branches.values_mut() {
            for victory in victory_types.clone() {
                branch.priorities.entry(victory.to_string()).or_insert(0);
            }
            policies.insert(branch.name.clone(), branch.as_policy());

            let last = branch.policies.len().saturating_sub(1);
            let finisher = branch.finisher_name();
            for (position, policy) in branch.policies.iter_mut().enumerate() {
                policy.branch.clone_from(&branch.name);
                policy.set_origin_ruleset(origin);
                if policy.requires.is_none() {
                    policy.requires = Some(vec![branch.name.clone()]);
                }

                if position == last {
                    policy.name.clone_from(&finisher);
                    policy.policy_type = PolicyType::Finisher;
                } else {
                    policy.policy_type = PolicyType::Regular;
                    let occupied = policies
                        .values()
                        .find(|p: &&Policy| {
                            p.policy_type == PolicyType::Regular
                                && p.branch == policy.branch
                                && p.row == policy.row
                                && p.column == policy.column
                        })
                        .map(|p| p.name.clone());
                    if let Some(occupied) = occupied {
                        log::debug!(
                            "Policy '{}' takes the slot of '{}' in '{}'",
                            policy.name,
                            occupied,
                            branch.name
                        );
                        policies.shift_remove(&occupied);
                    }
                }
                policies.insert(policy.name.clone(), policy.clone());
            }

            if branch.policies.is_empty() {
                log::error!(
                    "PolicyBranch '{}' has no policies after load (ruleset={})",
                    branch.name,
                    origin
                );
            }
        }
        Some((branches, policies))
    }
}

/// Drops objects without a name, logging each as a naming error.
fn named<T: RulesetObject>(category: Category, items: Vec<T>) -> impl Iterator<Item = T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(move |(index, item)| {
            if item.name().trim().is_empty() {
                log::warn!("{}", Error::ObjectNaming { category, index });
                None
            } else {
                Some(item)
            }
        })
}

/// Folds decoded objects into a table, later same-named objects replacing
/// earlier ones, and stamps each with its package.
pub fn into_table<T: RulesetObject>(category: Category, items: Vec<T>, origin: &str) -> Table<T> {
    let mut table = Table::with_capacity(items.len());
    for mut item in named(category, items) {
        item.set_origin_ruleset(origin);
        table.insert(item.name().to_string(), item);
    }
    table
}

/// All technologies of the given columns, keyed by name.
pub fn technologies_of(columns: &[TechColumn]) -> Table<Technology> {
    columns
        .iter()
        .flat_map(|c| c.techs.iter())
        .map(|tech| (tech.name.clone(), tech.clone()))
        .collect()
}
