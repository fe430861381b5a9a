//! Reality Check - five-round guided interrogation sessions
//!
//! A user states a goal; a language model asks five probing questions, analyses
//! each answer and closes with a report. This crate holds the session state
//! machine, the model gateway around the provider, the transcript stores and
//! the HTTP facade.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
