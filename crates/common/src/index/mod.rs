//! Index naming for nested repeated structures
//!
//! Attribute paths for nested lists carry one `[LIST]` placeholder per
//! level (`household[LIST].members[LIST].name`). Each placeholder is
//! replaced, outermost first, with a distinct index variable name.

use crate::errors::{Result, ScaspError};
use serde::{Deserialize, Serialize};

/// Placeholder marking one list level in an attribute path
pub const LIST_PLACEHOLDER: &str = "[LIST]";

/// Index names used by the legacy scheme, outermost first
const LEGACY_NAMES: [&str; 5] = ["i", "j", "k", "l", "m"];

/// Index naming scheme
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexNaming {
    /// `i0`, `i1`, `i2`, ... with no depth limit
    #[default]
    Numbered,
    /// `i`, `j`, `k`, `l`, `m`; deeper nesting is an error
    Legacy,
}

impl IndexNaming {
    /// Name of the index variable for a nesting level (0 = outermost)
    pub fn name(&self, level: usize) -> Result<String> {
        match self {
            IndexNaming::Numbered => Ok(format!("i{}", level)),
            IndexNaming::Legacy => LEGACY_NAMES
                .get(level)
                .map(|name| name.to_string())
                .ok_or(ScaspError::NestingDepthExceeded {
                    depth: level + 1,
                    limit: LEGACY_NAMES.len(),
                }),
        }
    }

    /// Replace every `[LIST]` placeholder in `path` with `[<index>]`
    pub fn apply_indices(&self, path: &str) -> Result<String> {
        let depth = path.matches(LIST_PLACEHOLDER).count();
        if *self == IndexNaming::Legacy && depth > LEGACY_NAMES.len() {
            return Err(ScaspError::NestingDepthExceeded {
                depth,
                limit: LEGACY_NAMES.len(),
            });
        }

        let mut output = String::with_capacity(path.len());
        let mut rest = path;
        let mut level = 0;
        while let Some(pos) = rest.find(LIST_PLACEHOLDER) {
            output.push_str(&rest[..pos]);
            output.push('[');
            output.push_str(&self.name(level)?);
            output.push(']');
            rest = &rest[pos + LIST_PLACEHOLDER.len()..];
            level += 1;
        }
        output.push_str(rest);
        Ok(output)
    }
}
