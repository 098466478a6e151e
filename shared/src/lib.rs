//! Shared types and domain rules for the Farm Ledger platform
//!
//! This crate holds everything the backend, the client SDK and the browser
//! (via WASM) must agree on: the data model, the stock ledger rules, money
//! rounding, error classification and the lot intake saga.

pub mod errors;
pub mod ledger;
pub mod models;
pub mod money;
pub mod saga;
pub mod types;
pub mod validation;

pub use errors::*;
pub use ledger::*;
pub use models::*;
pub use money::*;
pub use types::*;
pub use validation::*;
