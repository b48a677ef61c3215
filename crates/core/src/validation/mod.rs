//! Per-step validation.
//!
//! Provides rule types, the static step schemas and a pure-logic evaluator.
//! Validation is always scoped to one step; the draft as a whole is only
//! checked step by step.

pub mod evaluator;
pub mod rules;
pub mod schema;

pub use evaluator::{validate_all_steps, validate_step, ValidationContext};
pub use rules::{FieldRule, ValidationErrors};
pub use schema::{schema_for, StepSchema};
