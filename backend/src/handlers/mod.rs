//! HTTP handlers for the Farm Ledger API

mod buyer;
mod catalog;
mod expense;
mod field;
mod health;
mod inventory;
mod lot;
mod master_data;
mod profile;
mod reporting;
mod sale;
mod warehouse;
mod work;

pub use buyer::*;
pub use catalog::*;
pub use expense::*;
pub use field::*;
pub use health::*;
pub use inventory::*;
pub use lot::*;
pub use master_data::*;
pub use profile::*;
pub use reporting::*;
pub use sale::*;
pub use warehouse::*;
pub use work::*;
