//! Consistency checking for the algorithm pseudocode of specification
//! documents.
//!
//! The interesting machinery is in three layers: `parsing` turns the
//! pre-segmented rich text of a single algorithm step into a small
//! expression tree, `typing` understands the English prose used to declare
//! operation signatures and reasons about those types as a lattice, and
//! `analysis` walks a whole document cross-checking every invocation of
//! every operation against the bibliography of declared signatures.

pub mod analysis;
pub mod biblio;
pub mod language;
pub mod loading;
pub mod parsing;
pub mod problem;
pub mod regex;
pub mod typing;
