//! Template expansion port.

/// Substitutes build-scoped variables (`${BUILD_TAG}` and friends).
///
/// Owned by the orchestrator; the engine hands templates over and uses
/// the result verbatim.
pub trait TemplateExpander {
    /// Returns `template` with variables substituted.
    fn expand(&self, template: &str) -> String;
}
