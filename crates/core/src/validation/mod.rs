//! Draft validation engine.
//!
//! Provides issue/result types and a pure evaluator over a draft and an
//! injected catalog — no I/O, no caching.

pub mod engine;
pub mod rules;

pub use engine::ValidationEngine;
pub use rules::{codes, IssueScope, ValidationIssue, ValidationResult};
