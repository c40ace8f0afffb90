//! Diagnostics: structured errors pinned to a source position, plus the
//! "accumulate everything, raise once" composite used by every pass.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::ast::SourcePos;

/// One diagnosable failure. Every variant carries enough of `SourcePos` to
/// render a caret-underlined line, matching the farthest-failure format
/// described for the parser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("{pos}: syntax error: expected {expected}")]
    Syntax { pos: SourcePos, expected: String },

    #[error("{pos}: {reason}")]
    Structural { pos: SourcePos, reason: String },

    #[error("{pos}: {reason}")]
    Semantic { pos: SourcePos, reason: String },

    #[error("{reason}")]
    SemanticNoLine { reason: String },

    /// Never user-visible: an encoder produced a byte that does not fit in
    /// 8 bits. Surfaced as an error rather than a panic so a library caller
    /// embedding malformed table data gets a `Result`, not an abort.
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl SourcePos {
    /// Render the classic two-line "source + caret" diagnostic snippet.
    pub fn caret_snippet(&self) -> String {
        let caret_col = self.column.saturating_sub(1).max(0);
        format!(
            "{}\n{}^",
            self.line_text,
            " ".repeat(caret_col)
        )
    }

    pub fn dummy() -> Self {
        SourcePos::new(Arc::from("<none>"), 0, 0, Arc::from(""))
    }
}

/// A composite error accumulating every failure for a single pass (parse,
/// layout, or compile). Each pass raises exactly one of these at the end
/// rather than aborting on the first error, so users see everything they
/// can fix in one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorList(pub Vec<AssemblyError>);

impl ErrorList {
    pub fn new() -> Self {
        ErrorList(Vec::new())
    }

    pub fn push(&mut self, err: AssemblyError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turn this list into a `Result`, succeeding iff no errors were
    /// recorded. `value` is typically the product the pass just built.
    pub fn into_result<T>(self, value: T) -> Result<T, ErrorList> {
        if self.0.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
            if let AssemblyError::Syntax { pos, .. } = err {
                write!(f, "\n{}", pos.caret_snippet())?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl From<AssemblyError> for ErrorList {
    fn from(err: AssemblyError) -> Self {
        ErrorList(vec![err])
    }
}
