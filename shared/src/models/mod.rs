//! Domain models for the Farm Ledger platform

mod buyer;
mod catalog;
mod expense;
mod farm;
mod field;
mod inventory;
mod lot;
mod report;
mod sale;
mod warehouse;
mod work;

pub use buyer::*;
pub use catalog::*;
pub use expense::*;
pub use farm::*;
pub use field::*;
pub use inventory::*;
pub use lot::*;
pub use report::*;
pub use sale::*;
pub use warehouse::*;
pub use work::*;
