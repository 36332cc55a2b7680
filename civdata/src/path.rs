use std::path::PathBuf;

/// Per-user folder holding downloaded mods, e.g.
/// `~/.local/share/civrules/mods` on Linux.
pub fn default_mods_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("civrules").join("mods"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mods_dir_layout() {
        if let Some(dir) = default_mods_dir() {
            assert!(dir.ends_with("civrules/mods"));
        }
    }
}
