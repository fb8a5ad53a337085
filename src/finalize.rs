//! Turns a span tree into a tree of owned, NUL-terminated words.
//!
//! Spans can only be resolved once parsing is finished: a terminator written
//! at the end of one token would sit exactly where the next token may start.
//! Instead of writing terminators into the line, each span is copied into its
//! own [`CString`], which leaves the input untouched.

use crate::command::{Command, ParsedCommand};
use crate::lexer::Span;
use crate::parser::ParseError;
use std::ffi::CString;

/// Resolve every span in `tree` against `input`, post-order.
pub fn finalize(tree: ParsedCommand, input: &[u8]) -> Result<Command, ParseError> {
    tree.try_map_words(&mut |span: Span| {
        CString::new(span.slice(input)).map_err(|e| ParseError::InteriorNul {
            offset: span.start + e.nul_position(),
        })
    })
}
