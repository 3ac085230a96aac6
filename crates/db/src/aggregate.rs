//! Concurrent fan-out of independent named queries.
//!
//! Each query runs as its own task. The first failure, by completion order,
//! is reported immediately and the remaining tasks are aborted; a caller
//! never sees a partially filled [`Bundle`].

use std::{
    any::{type_name, Any},
    collections::HashMap,
    future::Future,
    pin::Pin,
};

use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

type Erased = Box<dyn Any + Send>;
type PendingQuery<E> = Pin<Box<dyn Future<Output = Result<Erased, E>> + Send>>;

#[derive(Debug, Error)]
pub enum AggregateError<E> {
    #[error("aggregate query '{name}' failed")]
    Query {
        name: &'static str,
        #[source]
        source: E,
    },

    #[error("aggregate query task did not complete")]
    Task(#[from] JoinError),
}

impl<E> AggregateError<E> {
    /// The failed query's error, if the failure came from the query itself.
    pub fn into_query_error(self) -> Option<E> {
        match self {
            AggregateError::Query { source, .. } => Some(source),
            AggregateError::Task(_) => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    #[error("no aggregate result named '{0}'")]
    Missing(&'static str),

    #[error("aggregate result '{name}' is not a {expected}")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
    },
}

/// Named results of a successful fetch.
pub struct Bundle {
    values: HashMap<&'static str, Erased>,
}

impl Bundle {
    /// Move a result out of the bundle, checking its type.
    pub fn take<T: 'static>(&mut self, name: &'static str) -> Result<T, BundleError> {
        let value = self.values.remove(name).ok_or(BundleError::Missing(name))?;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| BundleError::TypeMismatch {
                name,
                expected: type_name::<T>(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builder collecting the queries to run together.
///
/// ```ignore
/// let mut bundle = AggregateFetcher::new()
///     .query("author", || authors.find_by_id(&id))
///     .query("author_books", || books.find(&by_author))
///     .fetch()
///     .await?;
/// let author: Option<Record<Author>> = bundle.take("author")?;
/// ```
pub struct AggregateFetcher<E> {
    queries: Vec<(&'static str, PendingQuery<E>)>,
}

impl<E: Send + 'static> AggregateFetcher<E> {
    pub fn new() -> Self {
        Self {
            queries: Vec::new(),
        }
    }

    /// Add a query under `name`. Names must be unique within one fetch.
    pub fn query<T, F, Fut>(mut self, name: &'static str, operation: F) -> Self
    where
        T: Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        debug_assert!(
            self.queries.iter().all(|(existing, _)| *existing != name),
            "duplicate aggregate query name '{name}'"
        );

        let pending = operation();
        self.queries.push((
            name,
            Box::pin(async move { pending.await.map(|value| Box::new(value) as Erased) }),
        ));
        self
    }

    /// Run every query concurrently and gather the results.
    pub async fn fetch(self) -> Result<Bundle, AggregateError<E>> {
        let mut tasks = JoinSet::new();
        let expected = self.queries.len();

        for (name, pending) in self.queries {
            tasks.spawn(async move { (name, pending.await) });
        }

        let mut values = HashMap::with_capacity(expected);
        while let Some(joined) = tasks.join_next().await {
            let (name, result) = joined?;
            match result {
                Ok(value) => {
                    values.insert(name, value);
                }
                Err(source) => {
                    tracing::debug!(query = name, "aggregate query failed; aborting siblings");
                    // Dropping the set aborts whatever is still in flight.
                    return Err(AggregateError::Query { name, source });
                }
            }
        }

        Ok(Bundle { values })
    }
}

impl<E: Send + 'static> Default for AggregateFetcher<E> {
    fn default() -> Self {
        Self::new()
    }
}
