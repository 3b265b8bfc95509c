// Diagnostics: what the checker reports, and how reports are rendered.

mod format;

// Re-export all public symbols
pub use format::*;

/// One finding about the document. `rule` is a stable machine-readable
/// name; `message` is the human-readable sentence; `offset` is a byte
/// position in the document source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub message: String,
    pub offset: usize,
}

/// Where the analyzer sends its findings. Emission order is document
/// order for per-call findings, followed by the end-of-document pass.
pub trait Reporter {
    fn warn(&mut self, diagnostic: Diagnostic);
}

impl Reporter for Vec<Diagnostic> {
    fn warn(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
