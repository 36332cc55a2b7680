//! Everything a load needs besides the package itself.

use crate::capabilities::PlatformCapabilities;
use crate::category::Category;
use crate::error::Result;
use crate::filter::{FilterMatcher, StandardFilter};
use crate::package::Package;
use crate::ruleset::Ruleset;
use crate::validation::{BasicUniqueValidator, UniqueValidator};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Name of the embedded baseline package.
pub const EMBEDDED_FALLBACK_NAME: &str = "Embedded fallback";

const EMBEDDED: [(Category, &str); 8] = [
    (
        Category::ModOptions,
        include_str!("../data/fallback/ModOptions.json"),
    ),
    (Category::Speeds, include_str!("../data/fallback/Speeds.json")),
    (
        Category::Difficulties,
        include_str!("../data/fallback/Difficulties.json"),
    ),
    (
        Category::VictoryTypes,
        include_str!("../data/fallback/VictoryTypes.json"),
    ),
    (
        Category::UnitTypes,
        include_str!("../data/fallback/UnitTypes.json"),
    ),
    (Category::Ruins, include_str!("../data/fallback/Ruins.json")),
    (
        Category::GlobalUniques,
        include_str!("../data/fallback/GlobalUniques.json"),
    ),
    (
        Category::CityStateTypes,
        include_str!("../data/fallback/CityStateTypes.json"),
    ),
];

/// Where the baseline used to backfill base packages comes from.
#[derive(Debug, Clone, Default)]
pub enum FallbackSource {
    /// The minimal baseline compiled into this crate.
    #[default]
    Embedded,
    /// A vanilla package folder on disk.
    Directory(PathBuf),
    /// An already loaded ruleset.
    Preloaded(Ruleset),
    /// No baseline; backfill is skipped.
    Disabled,
}

/// The baseline ruleset, built on first use and read-only afterwards.
///
/// Readers that want to change it must clone it first.
pub struct FallbackRuleset {
    source: FallbackSource,
    ruleset: OnceLock<Option<Ruleset>>,
}

impl FallbackRuleset {
    pub fn new(source: FallbackSource) -> FallbackRuleset {
        let ruleset = OnceLock::new();
        let source = match source {
            FallbackSource::Preloaded(preloaded) => {
                let _ = ruleset.set(Some(preloaded));
                FallbackSource::Disabled
            }
            other => other,
        };
        FallbackRuleset { source, ruleset }
    }

    /// The baseline, building it if this is the first request.
    pub fn get(&self, capabilities: PlatformCapabilities) -> Option<&Ruleset> {
        self.ruleset
            .get_or_init(|| match self.build(capabilities) {
                Ok(ruleset) => ruleset,
                Err(e) => {
                    log::error!("Failed to load fallback ruleset: {}", e);
                    None
                }
            })
            .as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.ruleset.get().is_some()
    }

    fn build(&self, capabilities: PlatformCapabilities) -> Result<Option<Ruleset>> {
        let package = match &self.source {
            FallbackSource::Embedded => Package::from_documents(
                EMBEDDED_FALLBACK_NAME,
                EMBEDDED.map(|(category, text)| (category, text.to_string())),
            ),
            FallbackSource::Directory(path) => Package::from_dir(path)?,
            FallbackSource::Preloaded(_) | FallbackSource::Disabled => return Ok(None),
        };
        log::debug!("Building fallback ruleset from '{}'", package.name());
        let context = LoadContext::new()
            .with_capabilities(capabilities)
            .with_fallback(FallbackSource::Disabled);
        Ok(Some(Ruleset::load(&package, &context)))
    }
}

impl fmt::Debug for FallbackRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackRuleset")
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Explicit inputs of every load.
pub struct LoadContext {
    capabilities: PlatformCapabilities,
    fallback: FallbackRuleset,
    unique_validator: Box<dyn UniqueValidator>,
    filter: Box<dyn FilterMatcher>,
    global_tutorials: Option<Package>,
}

impl LoadContext {
    /// A context reading the process-wide capabilities and the embedded
    /// fallback.
    pub fn new() -> LoadContext {
        LoadContext {
            capabilities: PlatformCapabilities::current(),
            fallback: FallbackRuleset::new(FallbackSource::Embedded),
            unique_validator: Box::new(BasicUniqueValidator),
            filter: Box::new(StandardFilter),
            global_tutorials: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> LoadContext {
        self.capabilities = capabilities;
        self
    }

    pub fn with_fallback(mut self, source: FallbackSource) -> LoadContext {
        self.fallback = FallbackRuleset::new(source);
        self
    }

    pub fn with_unique_validator(mut self, validator: impl UniqueValidator + 'static) -> LoadContext {
        self.unique_validator = Box::new(validator);
        self
    }

    pub fn with_filter(mut self, filter: impl FilterMatcher + 'static) -> LoadContext {
        self.filter = Box::new(filter);
        self
    }

    /// Tutorials loaded ahead of every package's own.
    pub fn with_global_tutorials(mut self, package: Package) -> LoadContext {
        self.global_tutorials = Some(package);
        self
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    pub fn fallback(&self) -> Option<&Ruleset> {
        self.fallback.get(self.capabilities)
    }

    pub fn unique_validator(&self) -> &dyn UniqueValidator {
        self.unique_validator.as_ref()
    }

    pub fn filter(&self) -> &dyn FilterMatcher {
        self.filter.as_ref()
    }

    pub fn global_tutorials(&self) -> Option<&Package> {
        self.global_tutorials.as_ref()
    }
}

impl Default for LoadContext {
    fn default() -> Self {
        LoadContext::new()
    }
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("capabilities", &self.capabilities)
            .field("fallback", &self.fallback)
            .field("global_tutorials", &self.global_tutorials.as_ref().map(Package::name))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_fallback_is_built_once() {
        let context = LoadContext::new().with_capabilities(PlatformCapabilities::default());
        assert!(!context.fallback.is_loaded());

        let first = context.fallback().unwrap() as *const Ruleset;
        let second = context.fallback().unwrap() as *const Ruleset;
        assert_eq!(first, second);
        assert!(context.fallback.is_loaded());
    }

    #[test]
    fn test_embedded_fallback_covers_mandatory_categories() {
        let context = LoadContext::new();
        let fallback = context.fallback().unwrap();

        assert!(fallback.mod_options.is_base_ruleset);
        assert!(!fallback.speeds.is_empty());
        assert!(!fallback.difficulties.is_empty());
        assert!(!fallback.victories.is_empty());
        assert!(!fallback.unit_types.is_empty());
        assert!(!fallback.ruin_rewards.is_empty());
        assert!(!fallback.global_uniques.is_empty());
        assert!(!fallback.city_state_types.is_empty());
    }

    #[test]
    fn test_disabled_and_preloaded() {
        let context = LoadContext::new().with_fallback(FallbackSource::Disabled);
        assert!(context.fallback().is_none());

        let mut preloaded = Ruleset::default();
        preloaded.name = "Preloaded".to_string();
        let context = LoadContext::new().with_fallback(FallbackSource::Preloaded(preloaded));
        assert_eq!(context.fallback().unwrap().name, "Preloaded");
    }

    #[test]
    fn test_missing_fallback_directory() {
        let dir = tempfile::tempdir().unwrap();
        let context =
            LoadContext::new().with_fallback(FallbackSource::Directory(dir.path().join("Nope")));
        assert!(context.fallback().is_none());
    }
}
