//! Grammar adapter: selector text to generic syntax tree.
//!
//! [Selectors Level 4 § 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar)

pub mod generic;
pub mod parser;
pub mod tokenizer;

pub use generic::{GenericNode, GenericValue};
pub use parser::{GrammarError, parse_grammar};
pub use tokenizer::{Token, TokenKind, tokenize};
