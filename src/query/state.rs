//! Observable state of a query entry

use chrono::{DateTime, Local};
use thiserror::Error;

use super::QueryData;
use crate::data::{ApiError, PokemonDetailData, PokemonListing};

/// Failure payload of a rejected query
///
/// Views never distinguish causes; the message is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ApiError> for QueryError {
    fn from(err: ApiError) -> Self {
        Self::new(err.to_string())
    }
}

/// Request status of a query entry
///
/// Data only exists inside `Success` and the error only inside `Error`,
/// so neither can be populated independently of the status.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryStatus {
    #[default]
    Uninitialized,
    Loading,
    Success(QueryData),
    Error(QueryError),
}

/// Point-in-time view of a query entry, as delivered to subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    /// A request is in flight (first load or revalidation)
    pub is_fetching: bool,
    /// When the current data was received
    pub updated_at: Option<DateTime<Local>>,
}

impl QuerySnapshot {
    pub fn is_uninitialized(&self) -> bool {
        matches!(self.status, QueryStatus::Uninitialized)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, QueryStatus::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, QueryStatus::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, QueryStatus::Error(_))
    }

    /// The payload, defined iff the query succeeded
    pub fn data(&self) -> Option<&QueryData> {
        match &self.status {
            QueryStatus::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match &self.status {
            QueryStatus::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn listing(&self) -> Option<&PokemonListing> {
        self.data().and_then(QueryData::as_listing)
    }

    pub fn detail(&self) -> Option<&PokemonDetailData> {
        self.data().and_then(QueryData::as_detail)
    }
}
