//! scasplens Relevance Library
//!
//! Drives an s(CASP) solver to find which input predicates a query
//! actually depends on, so an interview only asks relevant questions.

pub mod program;
pub mod reasoner;
pub mod search;

pub use program::{Program, Statement, StatementKind};
pub use reasoner::{query, Reasoner, ScaspProcess};
pub use search::RelevanceSearch;
