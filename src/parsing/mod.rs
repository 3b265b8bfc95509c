//! Parser for algorithm step pseudocode. The front end hands over one
//! step at a time as a fragment sequence; this module tokenizes it and
//! builds the expression tree, or returns a position-tagged failure that
//! the caller can batch with the rest of the document's findings.

pub mod parser;
pub mod tokens;

pub use parser::{parse_fragments, Parser, ParsingError};
