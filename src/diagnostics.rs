use serde::{Deserialize, Serialize};

/// How much attention a recovery deserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,    // expected normalisation, nothing lost
    Warning, // data was dropped, renamed or guessed
}

/// What kind of recovery happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A document node had no id and one was generated
    GeneratedId,
    /// A document node reused an id already seen; it was given a fresh one
    DuplicateId,
    /// An edge points at a node that is not in the graph
    DanglingEdge,
    /// A node was reached twice while rebuilding the tree; its second
    /// occurrence was emitted without children
    CycleTruncated,
    /// Every node is the target of some edge, so the first node was used as root
    ForcedRoot,
    /// Several roots were found and wrapped under a synthetic root
    SyntheticRoot,
}

/// A single non-fatal finding from the converter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub affected_nodes: Vec<String>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
        affected_nodes: Vec<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            affected_nodes,
        }
    }
}

/// Collected diagnostics; every entry is logged as it is recorded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    issues: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!(
                "{:?}: {} (nodes: {:?})",
                diagnostic.kind,
                diagnostic.message,
                diagnostic.affected_nodes
            ),
            Severity::Info => log::info!("{:?}: {}", diagnostic.kind, diagnostic.message),
        }
        self.issues.push(diagnostic);
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>, nodes: Vec<String>) {
        self.push(Diagnostic::new(Severity::Warning, kind, message, nodes));
    }

    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>, nodes: Vec<String>) {
        self.push(Diagnostic::new(Severity::Info, kind, message, nodes));
    }

    /// Append already-logged diagnostics without logging them again
    pub fn extend(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|d| d.severity == Severity::Warning)
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.issues
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.issues.iter().filter(|d| d.kind == kind).collect()
    }

    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.issues.iter().any(|d| d.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.issues.iter()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn clear(&mut self) {
        self.issues.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_filters() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info(DiagnosticKind::GeneratedId, "generated", vec!["n00".into()]);
        diagnostics.warn(DiagnosticKind::ForcedRoot, "forced", vec!["a".into()]);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.warnings().len(), 1);
        assert_eq!(diagnostics.warnings()[0].kind, DiagnosticKind::ForcedRoot);
        assert!(diagnostics.contains(DiagnosticKind::GeneratedId));
        assert!(!diagnostics.contains(DiagnosticKind::CycleTruncated));
    }

    #[test]
    fn test_extend_and_clear() {
        let mut first = Diagnostics::new();
        first.info(DiagnosticKind::SyntheticRoot, "wrapped", vec![]);
        let mut second = Diagnostics::new();
        second.warn(DiagnosticKind::DanglingEdge, "dangling", vec!["x".into()]);

        first.extend(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.of_kind(DiagnosticKind::DanglingEdge).len(), 1);

        first.clear();
        assert!(first.is_empty());
    }
}
