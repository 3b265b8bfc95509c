// Types representing algorithm step content: rich-text fragments as
// delivered by the front end, and the expression tree the step parser
// builds from them.

mod expression;
mod fragment;

// Re-export all public symbols
pub use expression::*;
pub use fragment::*;
