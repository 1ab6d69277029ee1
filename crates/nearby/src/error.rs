use thiserror::Error;

#[derive(Error, Debug)]
pub enum NearbyError {
    #[error("Services error: {0}")]
    Services(#[from] nearby_services::ServicesError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NearbyError>;
