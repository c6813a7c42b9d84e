//! Export field directives.
//!
//! The `export.fields` list of a resource configuration reshapes the
//! inferred schema. Each element is one of:
//!
//! - `"..."` — keep every source field as-is;
//! - `"not <name>"` — drop the named field;
//! - `"<name>[:<converter>][ as <target>]"` — copy (and optionally
//!   rename and/or convert) the named field. `*` as the source name hands
//!   the whole entry to the converter.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PipelineError, Result};

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:not\s+(?P<exclude>\w+)|(?P<name>\*|\w+)(?::(?P<converter>\w+(?:\.\w+)*))?(?:\s+as\s+(?P<target>\w+))?)$",
    )
    .expect("directive pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDirective {
    /// `"..."`: retain all source fields.
    Wildcard,
    /// `"not <name>"`: remove a field from the output schema.
    Exclude { name: String },
    /// `"<name>[:<converter>][ as <target>]"`.
    Map {
        name: String,
        converter: Option<String>,
        target: String,
    },
}

impl FieldDirective {
    pub fn parse(raw: &str) -> Result<FieldDirective> {
        if raw == "..." {
            return Ok(FieldDirective::Wildcard);
        }
        // a bare `not` is a malformed exclude, not a field named "not"
        if raw.trim() == "not" {
            return Err(PipelineError::InvalidDirective(raw.to_string()));
        }
        let captures = DIRECTIVE
            .captures(raw)
            .ok_or_else(|| PipelineError::InvalidDirective(raw.to_string()))?;
        if let Some(name) = captures.name("exclude") {
            return Ok(FieldDirective::Exclude {
                name: name.as_str().to_string(),
            });
        }
        let name = captures
            .name("name")
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| PipelineError::InvalidDirective(raw.to_string()))?;
        let converter = captures.name("converter").map(|m| m.as_str().to_string());
        // a whole-entry directive is meaningless without a converter to
        // compute the target value
        if name == "*" && converter.is_none() {
            return Err(PipelineError::InvalidDirective(raw.to_string()));
        }
        let target = captures
            .name("target")
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| name.clone());
        Ok(FieldDirective::Map {
            name,
            converter,
            target,
        })
    }
}
