//! Composition of a base ruleset and its mods into one ruleset.

use crate::context::LoadContext;
use crate::error::Result;
use crate::package::Package;
use crate::ruleset::Ruleset;
use std::path::PathBuf;

/// Where an assembly run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    NotStarted,
    /// Loading the package at this position of the (base-first) order.
    LoadPackage(usize),
    /// Folding the package at this position into the aggregate.
    Fold(usize),
    PostProcess,
    Done,
}

/// Loads packages and folds them, in order, into a single ruleset.
///
/// Base packages go first, each group keeping the order it was given in.
/// Building costs are resolved once, after the last fold.
pub struct RulesetAssembler<'a> {
    context: &'a LoadContext,
    stage: AssemblyStage,
}

impl<'a> RulesetAssembler<'a> {
    pub fn new(context: &'a LoadContext) -> RulesetAssembler<'a> {
        RulesetAssembler {
            context,
            stage: AssemblyStage::NotStarted,
        }
    }

    pub fn stage(&self) -> AssemblyStage {
        self.stage
    }

    fn enter(&mut self, stage: AssemblyStage) {
        log::trace!("Assembly: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Reads every folder before loading any of them, so an unreadable
    /// folder fails the whole call.
    pub fn load_dirs(&mut self, paths: &[PathBuf]) -> Result<Ruleset> {
        let packages = paths
            .iter()
            .map(|path| Package::from_dir(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.assemble(&packages))
    }

    pub fn assemble(&mut self, packages: &[Package]) -> Ruleset {
        let ordered = base_first(packages, Package::is_base);
        let mut aggregate = Ruleset::default();
        if let Some(first) = ordered.first() {
            aggregate.mod_options.is_base_ruleset = first.is_base();
        }

        for (position, package) in ordered.into_iter().enumerate() {
            self.enter(AssemblyStage::LoadPackage(position));
            let loaded = Ruleset::load(package, self.context);
            self.enter(AssemblyStage::Fold(position));
            aggregate.add_with(&loaded, self.context.filter());
        }
        self.finish(aggregate)
    }

    /// Folds already loaded rulesets.
    pub fn assemble_loaded(&mut self, rulesets: &[&Ruleset]) -> Ruleset {
        let ordered = base_first(rulesets, |r| r.mod_options.is_base_ruleset);
        let mut aggregate = Ruleset::default();
        if let Some(first) = ordered.first() {
            aggregate.mod_options.is_base_ruleset = first.mod_options.is_base_ruleset;
        }

        for (position, ruleset) in ordered.into_iter().enumerate() {
            self.enter(AssemblyStage::Fold(position));
            aggregate.add_with(ruleset, self.context.filter());
        }
        self.finish(aggregate)
    }

    fn finish(&mut self, mut aggregate: Ruleset) -> Ruleset {
        self.enter(AssemblyStage::PostProcess);
        aggregate.update_building_costs();
        self.enter(AssemblyStage::Done);
        log::info!("Assembled {}: {}", aggregate, aggregate.summary());
        aggregate
    }
}

/// Stable partition with the base items first.
fn base_first<T>(items: &[T], is_base: impl Fn(&T) -> bool) -> Vec<&T> {
    let (mut base, mods): (Vec<&T>, Vec<&T>) = items.iter().partition(|item| is_base(*item));
    base.extend(mods);
    base
}
