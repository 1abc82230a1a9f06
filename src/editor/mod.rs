//! Markdown editing engine: selection aware text operations, toolbar and
//! keyboard bindings, and the editing session that owns the document.

use crate::editor::actions::{FormatAction, Operation};
use crate::editor::text_ops::{prefix_lines, wrap, Edit, Selection};

pub mod actions;
pub mod session;
pub mod text_ops;

/// Runs a toolbar action against `body`.
pub fn apply_action(body: &str, selection: Selection, action: FormatAction) -> Edit {
    match action.operation() {
        Operation::Wrap { before, after, placeholder } => wrap(body, selection, before, after, placeholder),
        Operation::PrefixLines(prefix) => prefix_lines(body, selection, prefix),
    }
}
