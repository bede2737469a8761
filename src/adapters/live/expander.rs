//! `${NAME}` substitution from a variable map.

use std::collections::BTreeMap;

use crate::model::BuildInfo;
use crate::ports::TemplateExpander;

/// Expands `${NAME}` references from a fixed set of variables.
///
/// References to unknown variables, and an unterminated `${`, are left as
/// written.
#[derive(Debug, Clone, Default)]
pub struct VariableExpander {
    vars: BTreeMap<String, String>,
}

impl VariableExpander {
    /// Creates an expander with no variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an expander with the standard build variables
    /// (`BUILD_NUMBER`, `BUILD_TAG`, `BUILD_URL`, `BUILD_RESULT`) plus `extra`,
    /// which wins on conflicts.
    #[must_use]
    pub fn for_build(build: &BuildInfo, extra: &BTreeMap<String, String>) -> Self {
        let mut expander = Self::new()
            .with("BUILD_NUMBER", build.number.to_string())
            .with("BUILD_TAG", build.tag.clone())
            .with("BUILD_URL", build.url.clone())
            .with("BUILD_RESULT", build.result.clone());
        for (name, value) in extra {
            expander.vars.insert(name.clone(), value.clone());
        }
        expander
    }

    /// Adds or replaces a variable.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl TemplateExpander for VariableExpander {
    fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = &after[..end];
            match self.vars.get(name) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + end + 1]),
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}
