pub mod assembler;
pub mod buildings;
pub mod cache;
pub mod capabilities;
pub mod category;
pub mod content;
pub mod context;
pub mod decode;
pub mod eras;
pub mod error;
pub mod filter;
pub mod loader;
pub mod mod_options;
pub mod nations;
pub mod objects;
pub mod package;
pub mod path;
pub mod policies;
pub mod reconcile;
pub mod religions;
pub mod ruleset;
pub mod technologies;
pub mod tiles;
pub mod units;
pub mod validation;

// Re-export the types most callers need
pub use assembler::{AssemblyStage, RulesetAssembler};
pub use cache::RulesetCache;
pub use capabilities::PlatformCapabilities;
pub use category::Category;
pub use context::{FallbackSource, LoadContext};
pub use error::{Error, Result};
pub use filter::{FilterMatcher, FilterTarget, StandardFilter};
pub use mod_options::ModOptions;
pub use objects::{RulesetObject, Table};
pub use package::Package;
pub use ruleset::Ruleset;
pub use validation::{
    BasicUniqueValidator, ErrorSeverity, ReferenceValidator, RulesetError, RulesetValidator,
    UniqueValidator,
};
