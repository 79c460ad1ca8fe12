//! PostgreSQL-backed `DishRepository` implementation using Diesel ORM.
//!
//! Ownership is enforced by the `dishes_restaurant_id_fkey` constraint;
//! writes addressing a dish are always scoped by its owning restaurant.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{DeleteOutcome, DishRepository, DishRepositoryError, UpdateOutcome};
use crate::domain::{Dish, DishId, NewDish, RestaurantId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_foreign_key,
};
use super::models::{DishChangeset, DishRow, NewDishRow};
use super::pool::{DbPool, PoolError};
use super::schema::dishes;

const RESTAURANT_FK: &str = "dishes_restaurant_id_fkey";

/// Diesel-backed implementation of the dish repository port.
#[derive(Clone)]
pub struct DieselDishRepository {
    pool: DbPool,
}

impl DieselDishRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DishRepositoryError {
    map_basic_pool_error(error, DishRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DishRepositoryError {
    map_basic_diesel_error(
        error,
        DishRepositoryError::query,
        DishRepositoryError::connection,
    )
}

/// Map insert failures, recognising the owner foreign key.
fn map_insert_error(
    error: diesel::result::Error,
    restaurant_id: RestaurantId,
) -> DishRepositoryError {
    match violated_foreign_key(&error) {
        Some(RESTAURANT_FK) => DishRepositoryError::restaurant_not_found(restaurant_id),
        Some(other) => {
            warn!(constraint = other, "unrecognised foreign key violation");
            map_diesel_error(error)
        }
        None => map_diesel_error(error),
    }
}

#[async_trait]
impl DishRepository for DieselDishRepository {
    async fn create(&self, dish: &NewDish) -> Result<DishId, DishRepositoryError> {
        let id = DishId::random();
        let row = NewDishRow::from_draft(id, dish.restaurant_id, &dish.dish);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(dishes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|error| map_insert_error(error, dish.restaurant_id))?;

        Ok(id)
    }

    async fn list_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<Dish>, DishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DishRow> = dishes::table
            .filter(dishes::restaurant_id.eq(restaurant_id.as_uuid()))
            .select(DishRow::as_select())
            .order((dishes::created_at.asc(), dishes::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Dish::from).collect())
    }

    async fn get_by_id(&self, id: &DishId) -> Result<Dish, DishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DishRow> = dishes::table
            .filter(dishes::id.eq(id.as_uuid()))
            .select(DishRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Dish::from)
            .ok_or_else(|| DishRepositoryError::not_found(*id))
    }

    async fn update(&self, dish: &Dish) -> Result<UpdateOutcome, DishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = dishes::table.filter(
            dishes::id
                .eq(dish.id.as_uuid())
                .and(dishes::restaurant_id.eq(dish.restaurant_id.as_uuid())),
        );
        let affected = diesel::update(target)
            .set(&DishChangeset::from(dish))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if affected == 0 {
            UpdateOutcome::NotFound
        } else {
            UpdateOutcome::Updated
        })
    }

    async fn delete(
        &self,
        restaurant_id: &RestaurantId,
        id: &DishId,
    ) -> Result<DeleteOutcome, DishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = dishes::table.filter(
            dishes::id
                .eq(id.as_uuid())
                .and(dishes::restaurant_id.eq(restaurant_id.as_uuid())),
        );
        let deleted = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if deleted == 0 {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted
        })
    }
}
