use crate::assembler::RulesetAssembler;
use crate::context::LoadContext;
use crate::error::{Error, Result};
use crate::ruleset::Ruleset;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Every package under a mods folder, loaded once and kept by name.
#[derive(Debug, Default)]
pub struct RulesetCache {
    root: Option<PathBuf>,
    rulesets: IndexMap<String, Ruleset>,
}

impl RulesetCache {
    pub fn new() -> RulesetCache {
        RulesetCache::default()
    }

    /// Loads each sub-folder of `root` as a package. Folders that fail to
    /// load are logged and left out.
    pub fn scan(root: &Path, context: &LoadContext) -> Result<RulesetCache> {
        let entries = fs::read_dir(root).map_err(|source| Error::PackageIo {
            path: root.to_path_buf(),
            source,
        })?;
        let mut folders: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        folders.sort();

        let mut cache = RulesetCache {
            root: Some(root.to_path_buf()),
            rulesets: IndexMap::new(),
        };
        for folder in folders {
            match Ruleset::load_dir(&folder, context) {
                Ok(ruleset) => cache.insert(ruleset),
                Err(e) => log::warn!("{}", e),
            }
        }
        log::info!(
            "Found {} rulesets in {}",
            cache.rulesets.len(),
            root.display()
        );
        Ok(cache)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn insert(&mut self, ruleset: Ruleset) {
        self.rulesets.insert(ruleset.name.clone(), ruleset);
    }

    pub fn get(&self, name: &str) -> Option<&Ruleset> {
        self.rulesets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rulesets.keys().map(String::as_str)
    }

    pub fn base_rulesets(&self) -> impl Iterator<Item = &Ruleset> {
        self.rulesets
            .values()
            .filter(|r| r.mod_options.is_base_ruleset)
    }

    fn require(&self, name: &str) -> Result<&Ruleset> {
        self.get(name)
            .ok_or_else(|| Error::UnknownRuleset(name.to_string()))
    }

    /// A base ruleset combined with mods, in the order given.
    pub fn complex_ruleset(
        &self,
        base: &str,
        mods: &[String],
        context: &LoadContext,
    ) -> Result<Ruleset> {
        let mut parts = vec![self.require(base)?];
        for name in mods {
            parts.push(self.require(name)?);
        }
        Ok(RulesetAssembler::new(context).assemble_loaded(&parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FallbackSource;

    fn write_package(root: &Path, name: &str, files: &[(&str, &str)]) {
        let folder = root.join(name);
        fs::create_dir(&folder).unwrap();
        for (file, text) in files {
            fs::write(folder.join(file), text).unwrap();
        }
    }

    #[test]
    fn test_scan_and_combine() {
        let dir = tempfile::tempdir().unwrap();
        write_package(
            dir.path(),
            "Vanilla",
            &[
                ("ModOptions.json", r#"{ "isBaseRuleset": true }"#),
                ("Religions.json", r#"["Islam"]"#),
            ],
        );
        write_package(dir.path(), "Tengri", &[("Religions.json", r#"["Tengri"]"#)]);
        fs::write(dir.path().join("readme.txt"), "not a package").unwrap();

        let context = LoadContext::new().with_fallback(FallbackSource::Disabled);
        let cache = RulesetCache::scan(dir.path(), &context).unwrap();

        assert_eq!(cache.names().collect::<Vec<_>>(), vec!["Tengri", "Vanilla"]);
        assert_eq!(cache.base_rulesets().count(), 1);

        let combined = cache
            .complex_ruleset("Vanilla", &["Tengri".to_string()], &context)
            .unwrap();
        assert_eq!(combined.religions, vec!["Islam", "Tengri"]);

        let err = cache
            .complex_ruleset("Vanilla", &["Nope".to_string()], &context)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownRuleset(name) if name == "Nope"));
    }
}
