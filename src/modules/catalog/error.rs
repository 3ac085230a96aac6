use axum::response::{IntoResponse, Response};
use libris_db::{AggregateError, BundleError, StoreError};
use libris_http::AppError;
use thiserror::Error;

/// Conditions that end a catalog request on the error surface.
///
/// Validation failures and guard-blocked deletes are not errors; they
/// re-render a view.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError<StoreError>),

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// The store error behind this failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            CatalogError::Store(err) => Some(err),
            CatalogError::Aggregate(AggregateError::Query { source, .. }) => Some(source),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
            || matches!(self.store_error(), Some(StoreError::Missing { .. }))
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        if !err.is_not_found() {
            return AppError::Internal(anyhow::Error::new(err));
        }
        match err.store_error() {
            Some(missing) => AppError::not_found(missing.to_string()),
            None => AppError::not_found(err.to_string()),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
