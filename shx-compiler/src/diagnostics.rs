use log::{error, warn};
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// Pipeline step a diagnostic was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticPhase {
    Load,
    Compose,
    Link,
    CodeGen,
}

impl Display for DiagnosticPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Load => write!(f, "load"),
            Self::Compose => write!(f, "compose"),
            Self::Link => write!(f, "link"),
            Self::CodeGen => write!(f, "codegen"),
        }
    }
}

/// A non-fatal compiler message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub phase: DiagnosticPhase,
    pub entry_point: Option<String>,
    pub message: String,
}

/// Collected diagnostics of a single compile call.
///
/// Every recorded message is also written to the log, so callers that only
/// read the log see the same text.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, phase: DiagnosticPhase, message: impl Into<String>) {
        let message = message.into();

        if message.trim().is_empty() {
            return;
        }

        warn!("{} diagnostics:\n{}", phase, message);

        self.items.push(Diagnostic {
            severity: DiagnosticSeverity::Warning,
            phase,
            entry_point: None,
            message,
        });
    }

    pub fn entry_point_error(
        &mut self,
        phase: DiagnosticPhase,
        entry_point: &str,
        message: impl Into<String>,
    ) {
        let message = message.into();

        error!(
            "failed to get {} output for the entry point `{}`: {}",
            phase, entry_point, message
        );

        self.items.push(Diagnostic {
            severity: DiagnosticSeverity::Error,
            phase,
            entry_point: Some(entry_point.to_owned()),
            message,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.severity == DiagnosticSeverity::Error)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_warnings_are_dropped() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(DiagnosticPhase::Load, "  \n");

        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_entry_point_errors_are_tagged() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(DiagnosticPhase::Link, "unused binding");
        diagnostics.entry_point_error(DiagnosticPhase::CodeGen, "computeMain", "unsupported");

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_errors());

        let error = diagnostics.iter().nth(1).unwrap();
        assert_eq!(error.entry_point.as_deref(), Some("computeMain"));
        assert_eq!(error.phase, DiagnosticPhase::CodeGen);
    }
}
