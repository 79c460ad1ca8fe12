//! PostgreSQL-backed `RestaurantRepository` implementation using Diesel ORM.
//!
//! The aggregate spans two tables. Creation writes the root and its dishes in
//! one transaction; reads load roots first and then every owned dish in a
//! single query, grouping them in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    DeleteOutcome, RestaurantRepository, RestaurantRepositoryError, UpdateOutcome,
};
use crate::domain::{DishId, NewRestaurant, Restaurant, RestaurantId, RestaurantUpdate};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DishRow, NewDishRow, NewRestaurantRow, RestaurantChangeset, RestaurantRow};
use super::pool::{DbPool, PoolError};
use super::schema::{dishes, restaurants};

/// Diesel-backed implementation of the restaurant repository port.
#[derive(Clone)]
pub struct DieselRestaurantRepository {
    pool: DbPool,
}

impl DieselRestaurantRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use restaurants::outbound::persistence::{DbPool, DieselRestaurantRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/restaurants")).await?;
    /// let repository = DieselRestaurantRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RestaurantRepositoryError {
    map_basic_pool_error(error, RestaurantRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RestaurantRepositoryError {
    map_basic_diesel_error(
        error,
        RestaurantRepositoryError::query,
        RestaurantRepositoryError::connection,
    )
}

fn group_by_owner(rows: Vec<DishRow>) -> HashMap<Uuid, Vec<DishRow>> {
    let mut grouped: HashMap<Uuid, Vec<DishRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.restaurant_id).or_default().push(row);
    }
    grouped
}

fn new_restaurant_row(id: RestaurantId, restaurant: &NewRestaurant) -> NewRestaurantRow<'_> {
    let address = restaurant.address.as_ref();
    NewRestaurantRow {
        id: *id.as_uuid(),
        name: &restaurant.name,
        description: &restaurant.description,
        category: &restaurant.category,
        has_delivery: restaurant.has_delivery,
        contact_email: restaurant.contact_email.as_deref(),
        contact_phone: restaurant.contact_phone.as_deref(),
        address_street: address.map(|a| a.street.as_str()),
        address_city: address.map(|a| a.city.as_str()),
        address_zip_code: address.map(|a| a.zip_code.as_str()),
        address_country: address.map(|a| a.country.as_str()),
    }
}

#[async_trait]
impl RestaurantRepository for DieselRestaurantRepository {
    async fn create(
        &self,
        restaurant: &NewRestaurant,
    ) -> Result<RestaurantId, RestaurantRepositoryError> {
        let id = RestaurantId::random();
        let root = new_restaurant_row(id, restaurant);
        let dish_rows: Vec<NewDishRow<'_>> = restaurant
            .dishes
            .iter()
            .map(|draft| NewDishRow::from_draft(DishId::random(), id, draft))
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(restaurants::table)
                    .values(&root)
                    .execute(conn)
                    .await?;
                // Row-by-row keeps created_at increasing in draft order.
                for row in &dish_rows {
                    diesel::insert_into(dishes::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?;

        debug!(%id, dishes = restaurant.dishes.len(), "restaurant inserted");
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Restaurant>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let roots: Vec<RestaurantRow> = restaurants::table
            .select(RestaurantRow::as_select())
            .order((restaurants::created_at.asc(), restaurants::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if roots.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = roots.iter().map(|row| row.id).collect();
        let dish_rows: Vec<DishRow> = dishes::table
            .filter(dishes::restaurant_id.eq_any(&ids))
            .select(DishRow::as_select())
            .order((dishes::created_at.asc(), dishes::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut grouped = group_by_owner(dish_rows);
        Ok(roots
            .into_iter()
            .map(|root| {
                let owned = grouped.remove(&root.id).unwrap_or_default();
                root.into_restaurant(owned)
            })
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let root: Option<RestaurantRow> = restaurants::table
            .filter(restaurants::id.eq(id.as_uuid()))
            .select(RestaurantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(root) = root else {
            return Ok(None);
        };

        let owned: Vec<DishRow> = dishes::table
            .filter(dishes::restaurant_id.eq(id.as_uuid()))
            .select(DishRow::as_select())
            .order((dishes::created_at.asc(), dishes::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Some(root.into_restaurant(owned)))
    }

    async fn update(
        &self,
        id: &RestaurantId,
        update: &RestaurantUpdate,
    ) -> Result<UpdateOutcome, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Diesel rejects an empty changeset, so a no-op update only checks
        // that the row exists.
        let matched = if update.is_empty() {
            let count: i64 = restaurants::table
                .filter(restaurants::id.eq(id.as_uuid()))
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            count > 0
        } else {
            let changeset = RestaurantChangeset::from(update);
            let target = restaurants::table.filter(restaurants::id.eq(id.as_uuid()));
            let affected = diesel::update(target)
                .set(&changeset)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            affected > 0
        };

        Ok(if matched {
            UpdateOutcome::Updated
        } else {
            UpdateOutcome::NotFound
        })
    }

    async fn delete(&self, id: &RestaurantId) -> Result<DeleteOutcome, RestaurantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = restaurants::table.filter(restaurants::id.eq(id.as_uuid()));
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
