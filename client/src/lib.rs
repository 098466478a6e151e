//! Farm Ledger client SDK
//!
//! Request layer over the `/api/v1` routes, addressed by table name the way
//! the web front-end addresses them. Holds the signed-in session, runs the
//! two-step lot intake with client-side compensation and keeps a local copy
//! of the master data.

pub mod client;
pub mod config;
pub mod error;
pub mod intake;
pub mod master_data;
pub mod session;
pub mod tables;

pub use client::FarmClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use intake::LotIntake;
pub use master_data::MASTER_DATA_CACHE_KEY;
pub use session::Session;
pub use tables::{Operation, Table};
