//! Repository trait definitions
//!
//! Uses RPITIT (Return Position Impl Trait In Traits), so implementations are
//! plain `async fn`s without boxing.

use std::future::Future;

use super::pagination::{FilterCondition, Pagination};
use crate::error::Result;

/// CRUD over one catalog entity keyed by its integer id
///
/// Mutations run in their own transaction and report constraint violations
/// as domain errors. `update` and `delete` fail with `NotFound` when no row
/// has the given id.
pub trait Repository<Entity, Create, Update>: Send + Sync {
    /// Find an entity by its id
    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Entity>>> + Send;

    /// List entities matching every filter, ordered by id, within the window
    fn find_all(
        &self,
        filters: &[FilterCondition],
        pagination: &Pagination,
    ) -> impl Future<Output = Result<Vec<Entity>>> + Send;

    /// Insert a new entity
    fn create(&self, data: Create) -> impl Future<Output = Result<Entity>> + Send;

    /// Merge changes onto an existing entity
    fn update(&self, id: i64, data: Update) -> impl Future<Output = Result<Entity>> + Send;

    /// Remove an entity
    fn delete(&self, id: i64) -> impl Future<Output = Result<()>> + Send;
}
