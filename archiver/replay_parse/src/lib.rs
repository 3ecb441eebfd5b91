//! Replay Parse - reads archive-script text back into IR.
//!
//! The tokenizer is a logos-derived enum; the parser is a small
//! recursive-descent pass producing exactly the node shapes the generator
//! emits, so `parse(render(tree))` is identity over generated trees.
//!
//! Replaying a parsed archive is the reconstruction path: hand the
//! resulting node to `replay_eval` with a prelude environment.

mod lexer;
mod parser;

pub use lexer::{tokenize, Spanned, Token};
pub use parser::{parse, ParseError};
