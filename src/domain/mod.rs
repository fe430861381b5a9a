//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, statuses, errors)
//! - `interrogation` - Session aggregate, transcript rules, reports and fallbacks

pub mod foundation;
pub mod interrogation;
