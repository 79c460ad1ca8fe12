//! Port for loading and saving the restaurant aggregate.
//!
//! Absence is a value here, not an error: lookups return `Option`, and
//! update/delete report [`UpdateOutcome::NotFound`] / [`DeleteOutcome::NotFound`]
//! both for ids that never existed and for rows that vanished or changed
//! underneath the write.

use async_trait::async_trait;

use crate::domain::{NewRestaurant, Restaurant, RestaurantId, RestaurantUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by restaurant repository adapters.
    pub enum RestaurantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "restaurant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "restaurant repository query failed: {message}",
    }
}

/// Result of a conditional write against an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Result of a physical delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    /// True when a row was removed.
    #[must_use]
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// Persistence gateway for the restaurant aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Insert the root and all of its dishes atomically, returning the new id.
    async fn create(
        &self,
        restaurant: &NewRestaurant,
    ) -> Result<RestaurantId, RestaurantRepositoryError>;

    /// Every restaurant with dishes populated, in creation order.
    async fn list_all(&self) -> Result<Vec<Restaurant>, RestaurantRepositoryError>;

    /// One restaurant with dishes populated.
    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError>;

    /// Overwrite the supplied columns. Last writer wins; no retry.
    async fn update(
        &self,
        id: &RestaurantId,
        update: &RestaurantUpdate,
    ) -> Result<UpdateOutcome, RestaurantRepositoryError>;

    /// Remove the root; its dishes go with it.
    async fn delete(&self, id: &RestaurantId) -> Result<DeleteOutcome, RestaurantRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRestaurantRepository;

#[async_trait]
impl RestaurantRepository for FixtureRestaurantRepository {
    async fn create(
        &self,
        _restaurant: &NewRestaurant,
    ) -> Result<RestaurantId, RestaurantRepositoryError> {
        Ok(RestaurantId::random())
    }

    async fn list_all(&self) -> Result<Vec<Restaurant>, RestaurantRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError> {
        Ok(None)
    }

    async fn update(
        &self,
        _id: &RestaurantId,
        _update: &RestaurantUpdate,
    ) -> Result<UpdateOutcome, RestaurantRepositoryError> {
        Ok(UpdateOutcome::NotFound)
    }

    async fn delete(&self, _id: &RestaurantId) -> Result<DeleteOutcome, RestaurantRepositoryError> {
        Ok(DeleteOutcome::NotFound)
    }
}
