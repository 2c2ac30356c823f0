//! [`PermitSource`](permit_finder_engine::PermitSource) backed by the NYC Open
//! Data Socrata API.
//!
//! Structured [`PermitQuery`](permit_finder_engine::PermitQuery) values are
//! rendered into SoQL (`$where`, `$order`, `$limit`) by [`soql`] and sent as
//! query-string parameters.

mod client;
mod config;
mod error;
pub mod soql;

pub use client::SocrataClient;
pub use config::DEFAULT_BASE_URL;
pub use config::SocrataConfig;
pub use error::ConfigError;
pub use error::Result;
