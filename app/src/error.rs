use std::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DBError {
    #[error(transparent)]
    SQLError(#[from] sqlx::Error),
    #[error("Did not find sensor: {0}")]
    SensorNotFound(i32),
    #[error("Did not find sensor method: {0}")]
    SensorMethodNotFound(i32),
}

impl DBError {
    /// True for every "row not found" flavour, including the driver's own.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DBError::SensorNotFound(_)
                | DBError::SensorMethodNotFound(_)
                | DBError::SQLError(sqlx::Error::RowNotFound)
        )
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Invalid http method: {0}")]
    InvalidMethod(String),
    #[error("Invalid target url {0}: {1}")]
    InvalidUrl(String, String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("cannot find sensor with id {0}: {1}")]
    SensorNotFound(i32, #[source] DBError),
    #[error("sensor with id {0} has no methods")]
    NoMethods(i32),
    #[error("sending http request: {0}")]
    Send(#[from] SendError),
    #[error(transparent)]
    DB(#[from] DBError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid bind address {0}: {1}")]
    InvalidAddr(String, #[source] std::net::AddrParseError),
}

/// Transport classification of everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(Box<dyn error::Error + Send + Sync>),
    #[error("{0}")]
    BadRequest(Box<dyn error::Error + Send + Sync>),
    #[error("{0}")]
    Internal(Box<dyn error::Error + Send + Sync>),
}

impl From<DBError> for ApiError {
    fn from(err: DBError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(Box::from(err))
        } else {
            ApiError::Internal(Box::from(err))
        }
    }
}

/// Every dispatch failure is a server error, including an unknown sensor
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Internal(Box::from(err))
    }
}
