//! scasplens Common Library
//!
//! Shared code for the scasplens crates including:
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability
//! - Predicate utilities (generalize / expand / abducible declarations)
//! - Escaping of free-text values embedded in generated facts
//! - Index naming for nested repeated structures

pub mod config;
pub mod errors;
pub mod escape;
pub mod index;
pub mod metrics;
pub mod predicate;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{ErrorCode, Result, ScaspError};
pub use index::IndexNaming;
pub use predicate::{declare_abducible, expand, generalize, PredicateRef};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
