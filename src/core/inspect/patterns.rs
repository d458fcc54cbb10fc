//! AI workflow pattern recognition result.

use serde::{Deserialize, Serialize};

/// Derived from the payload set of one inspection; not persisted on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIPatternResult {
    /// Canonical tool name of the first matching signature.
    pub tool: Option<String>,
    pub graph_detected: bool,
    pub wildcards_present: bool,
    pub resolved_prompt_available: bool,
}

impl AIPatternResult {
    pub fn is_empty(&self) -> bool {
        self.tool.is_none()
            && !self.graph_detected
            && !self.wildcards_present
            && !self.resolved_prompt_available
    }
}
