use crate::category::Category;
use crate::error::{Error, Result};
use crate::mod_options::ModOptions;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One contributor to a ruleset: a base ruleset or a mod.
///
/// Holds the text of every category file that exists, read up front so a
/// package either loads completely or not at all.
#[derive(Debug, Clone, Default)]
pub struct Package {
    name: String,
    path: Option<PathBuf>,
    documents: HashMap<Category, String>,
    mod_options: ModOptions,
}

impl Package {
    /// Reads a package folder. The package is named after the folder.
    pub fn from_dir(path: &Path) -> Result<Package> {
        fs::read_dir(path).map_err(io_error(path))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut documents = HashMap::new();
        for category in Category::ALL {
            let file = path.join(category.file_name());
            if !file.is_file() {
                continue;
            }
            let text = civjson::read_text(&file).map_err(io_error(&file))?;
            documents.insert(category, text);
        }

        log::debug!(
            "Read package '{}' from {} ({} files)",
            name,
            path.display(),
            documents.len()
        );
        let mut package = Package::from_documents(name, documents);
        package.path = Some(path.to_path_buf());
        Ok(package)
    }

    /// Builds a package from in-memory file contents.
    pub fn from_documents(
        name: impl Into<String>,
        documents: impl IntoIterator<Item = (Category, String)>,
    ) -> Package {
        let name = name.into();
        let documents: HashMap<Category, String> = documents.into_iter().collect();
        let mod_options = documents
            .get(&Category::ModOptions)
            .map(|text| ModOptions::parse(&name, text))
            .unwrap_or_default();
        Package {
            name,
            path: None,
            documents,
            mod_options,
        }
    }

    pub fn with_document(mut self, category: Category, text: impl Into<String>) -> Package {
        let text = text.into();
        if category == Category::ModOptions {
            self.mod_options = ModOptions::parse(&self.name, &text);
        }
        self.documents.insert(category, text);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source folder; `None` for in-memory packages.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn document(&self, category: Category) -> Option<&str> {
        self.documents.get(&category).map(String::as_str)
    }

    pub fn has(&self, category: Category) -> bool {
        self.documents.contains_key(&category)
    }

    pub fn mod_options(&self) -> &ModOptions {
        &self.mod_options
    }

    pub fn is_base(&self) -> bool {
        self.mod_options.is_base_ruleset
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> Error + use<> {
    let path = path.to_path_buf();
    move |source| Error::PackageIo { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_dir_reads_present_files() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Vanilla");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("Buildings.json"), r#"[{"name":"Granary"}]"#).unwrap();
        fs::write(root.join("ModOptions.json"), r#"{"isBaseRuleset":true}"#).unwrap();
        fs::write(root.join("Notes.txt"), "ignored").unwrap();

        let package = Package::from_dir(&root).unwrap();
        assert_eq!(package.name(), "Vanilla");
        assert!(package.has(Category::Buildings));
        assert!(!package.has(Category::Units));
        assert!(package.is_base());
        assert_eq!(package.path(), Some(root.as_path()));
    }

    #[test]
    fn test_missing_folder_is_fatal() {
        let dir = tempdir().unwrap();
        let err = Package::from_dir(&dir.path().join("Nope")).unwrap_err();
        assert!(matches!(err, Error::PackageIo { .. }));
    }

    #[test]
    fn test_with_document_updates_mod_options() {
        let package = Package::from_documents("X", Vec::new())
            .with_document(Category::ModOptions, r#"{"buildingsToRemove":["*Granary*"]}"#);
        assert_eq!(package.mod_options().buildings_to_remove, vec!["*Granary*"]);
        assert!(!package.is_base());
    }
}
