//! Shared types used by every stage of the Wren analyzer pipeline.

mod diagnostic;
mod span;
mod token;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use span::{SourceBuffer, Span};
pub use token::{keyword_from_str, Token, TokenKind};
