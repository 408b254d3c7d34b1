//! The storage contract shared by every entity.

use async_trait::async_trait;

use crate::error::QueryResult;
use crate::query::QueryFilter;

/// A store for one entity type.
///
/// `get`, `update` and `delete` fail with a not-found error when no row has
/// the entity's id; `find` fails with a not-found error when nothing matches.
/// `create` reports duplicates as a unique-constraint error so callers can
/// decide whether a conflict is benign.
#[async_trait]
pub trait EntityStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// The filter type accepted by [`find`](Self::find).
    type Filter: QueryFilter + Send + Sync;

    /// Load one entity by id.
    async fn get(&self, id: i64) -> QueryResult<T>;

    /// Insert an entity, returning its new id.
    async fn create(&self, entity: &T) -> QueryResult<i64>;

    /// Overwrite the stored entity with the same id.
    async fn update(&self, entity: &T) -> QueryResult<()>;

    /// Remove the stored entity with the same id.
    async fn delete(&self, entity: &T) -> QueryResult<()>;

    /// All entities matching `filter`.
    async fn find(&self, filter: &Self::Filter) -> QueryResult<Vec<T>>;
}
