//! Process-wide deployment target facts.

use std::sync::OnceLock;

static CURRENT: OnceLock<PlatformCapabilities> = OnceLock::new();

/// What the current deployment target can be relied on for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// The object decoder populates every field it is given. When false the
    /// loader reconciles decoded objects against the raw parse tree.
    pub trusted_decode: bool,
}

impl PlatformCapabilities {
    /// Capabilities of a target whose decoder is known to be complete.
    pub fn trusted() -> PlatformCapabilities {
        PlatformCapabilities {
            trusted_decode: true,
        }
    }

    /// Installs the process-wide capabilities. Only the first call wins;
    /// later calls are logged and return false.
    pub fn install(self) -> bool {
        match CURRENT.set(self) {
            Ok(()) => {
                log::debug!("Platform capabilities installed: {:?}", self);
                true
            }
            Err(_) => {
                log::warn!(
                    "Platform capabilities already installed; ignoring {:?}",
                    self
                );
                false
            }
        }
    }

    /// The installed capabilities, or the defaults before installation.
    pub fn current() -> PlatformCapabilities {
        CURRENT.get().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reconciles() {
        assert!(!PlatformCapabilities::default().trusted_decode);
        assert!(PlatformCapabilities::trusted().trusted_decode);
    }
}
