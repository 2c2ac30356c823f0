use thiserror::Error;

/// Failure to build a [`crate::SocrataClient`]. Request failures are reported
/// as [`permit_finder_engine::TransportError`] instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid source configuration: {0}")]
    Invalid(String),

    #[error("invalid app token: {0}")]
    AppToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
