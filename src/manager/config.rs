//! Manager configuration.

use serde::{Deserialize, Serialize};

/// Options fixed at manager construction.
///
/// ```rust
/// use animwatch::manager::ManagerConfig;
///
/// let config: ManagerConfig = serde_json::from_str("{}").unwrap();
/// assert!(!config.strict_metadata);
///
/// let strict = ManagerConfig::default().strict_metadata(true);
/// assert!(strict.strict_metadata);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Reject metadata that fails validation instead of logging the
    /// violations and continuing.
    pub strict_metadata: bool,
}

impl ManagerConfig {
    pub fn strict_metadata(mut self, strict: bool) -> Self {
        self.strict_metadata = strict;
        self
    }
}
