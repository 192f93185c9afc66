//! Domain logic for the postforge content workspace.
//!
//! Everything in this crate is synchronous and I/O free: content enums,
//! brief validation, the generation-webhook response contract, result panel
//! state, upload rules, history filtering, and the paid-content templates.
//! The async workflows that drive these live in `postforge-pipeline`.

pub mod approval;
pub mod brief;
pub mod content;
pub mod contract;
pub mod error;
pub mod history;
pub mod paid;
pub mod panel;
pub mod types;
pub mod upload;
