//! The type side of the checker: the lattice of types operations can
//! declare, the parser for the English prose those declarations are
//! written in, and inference of a type for a parsed step expression.

pub mod describe;
pub mod infer;
pub mod lattice;

pub use describe::{parse_description, DescriptionError};
pub use infer::{type_from_expr, type_from_seq};
pub use lattice::{dominates, is_completion, join, meet, normal_contents, Type};
