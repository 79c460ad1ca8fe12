//! In-process store implementing every persistence port.
//!
//! Used when no database URL is configured and by integration tests. Tables
//! live behind one mutex, so each port call observes and mutates a
//! consistent snapshot, mirroring the transactional guarantees of the
//! PostgreSQL adapters. Rows keep insertion order, matching the
//! `created_at` ordering of the SQL queries.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    DeleteOutcome, DishRepository, DishRepositoryError, IdentityStore, IdentityStoreError,
    RestaurantRepository, RestaurantRepositoryError, UpdateOutcome,
};
use crate::domain::{
    Dish, DishId, IdentityUser, NewDish, NewRestaurant, Restaurant, RestaurantId,
    RestaurantUpdate, RoleName, UserDetailsUpdate, UserId, roles,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug)]
struct Tables {
    /// Roots without dishes; dishes live in their own table.
    restaurants: Vec<Restaurant>,
    dishes: Vec<Dish>,
    users: Vec<IdentityUser>,
    role_catalogue: BTreeSet<String>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            restaurants: Vec::new(),
            dishes: Vec::new(),
            users: Vec::new(),
            role_catalogue: [roles::ADMIN, roles::OWNER, roles::USER]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl Tables {
    fn assemble(&self, root: &Restaurant) -> Restaurant {
        let mut restaurant = root.clone();
        restaurant.dishes = self
            .dishes
            .iter()
            .filter(|dish| dish.restaurant_id == root.id)
            .cloned()
            .collect();
        restaurant
    }

    fn user_mut(&mut self, id: &UserId) -> Option<&mut IdentityUser> {
        self.users.iter_mut().find(|user| user.id == *id)
    }
}

/// Mutex-guarded tables shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Empty store with the default role catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity record, replacing any with the same id.
    ///
    /// # Errors
    /// Returns [`IdentityStoreError::Query`] when the lock is poisoned.
    pub fn insert_user(&self, user: IdentityUser) -> Result<(), IdentityStoreError> {
        let mut tables = self.lock().map_err(IdentityStoreError::query)?;
        tables.users.retain(|existing| existing.id != user.id);
        tables.users.push(user);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, &'static str> {
        self.tables.lock().map_err(|_| POISONED)
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryStore {
    async fn create(
        &self,
        restaurant: &NewRestaurant,
    ) -> Result<RestaurantId, RestaurantRepositoryError> {
        let id = RestaurantId::random();
        let dish_ids: Vec<DishId> = restaurant.dishes.iter().map(|_| DishId::random()).collect();
        let mut aggregate = restaurant.clone().into_restaurant(id, dish_ids);
        let owned = std::mem::take(&mut aggregate.dishes);

        let mut tables = self.lock().map_err(RestaurantRepositoryError::query)?;
        tables.restaurants.push(aggregate);
        tables.dishes.extend(owned);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Restaurant>, RestaurantRepositoryError> {
        let tables = self.lock().map_err(RestaurantRepositoryError::query)?;
        Ok(tables
            .restaurants
            .iter()
            .map(|root| tables.assemble(root))
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError> {
        let tables = self.lock().map_err(RestaurantRepositoryError::query)?;
        Ok(tables
            .restaurants
            .iter()
            .find(|root| root.id == *id)
            .map(|root| tables.assemble(root)))
    }

    async fn update(
        &self,
        id: &RestaurantId,
        update: &RestaurantUpdate,
    ) -> Result<UpdateOutcome, RestaurantRepositoryError> {
        let mut tables = self.lock().map_err(RestaurantRepositoryError::query)?;
        let Some(root) = tables.restaurants.iter_mut().find(|root| root.id == *id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        update.apply_to(root);
        Ok(UpdateOutcome::Updated)
    }

    async fn delete(&self, id: &RestaurantId) -> Result<DeleteOutcome, RestaurantRepositoryError> {
        let mut tables = self.lock().map_err(RestaurantRepositoryError::query)?;
        let before = tables.restaurants.len();
        tables.restaurants.retain(|root| root.id != *id);
        if tables.restaurants.len() == before {
            return Ok(DeleteOutcome::NotFound);
        }
        tables.dishes.retain(|dish| dish.restaurant_id != *id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl DishRepository for InMemoryStore {
    async fn create(&self, dish: &NewDish) -> Result<DishId, DishRepositoryError> {
        let mut tables = self.lock().map_err(DishRepositoryError::query)?;
        if !tables
            .restaurants
            .iter()
            .any(|root| root.id == dish.restaurant_id)
        {
            return Err(DishRepositoryError::restaurant_not_found(dish.restaurant_id));
        }
        let id = DishId::random();
        tables
            .dishes
            .push(Dish::from_draft(id, dish.restaurant_id, dish.dish.clone()));
        Ok(id)
    }

    async fn list_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
    ) -> Result<Vec<Dish>, DishRepositoryError> {
        let tables = self.lock().map_err(DishRepositoryError::query)?;
        Ok(tables
            .dishes
            .iter()
            .filter(|dish| dish.restaurant_id == *restaurant_id)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &DishId) -> Result<Dish, DishRepositoryError> {
        let tables = self.lock().map_err(DishRepositoryError::query)?;
        tables
            .dishes
            .iter()
            .find(|dish| dish.id == *id)
            .cloned()
            .ok_or_else(|| DishRepositoryError::not_found(*id))
    }

    async fn update(&self, dish: &Dish) -> Result<UpdateOutcome, DishRepositoryError> {
        let mut tables = self.lock().map_err(DishRepositoryError::query)?;
        let Some(stored) = tables
            .dishes
            .iter_mut()
            .find(|stored| stored.id == dish.id && stored.restaurant_id == dish.restaurant_id)
        else {
            return Ok(UpdateOutcome::NotFound);
        };
        stored.clone_from(dish);
        Ok(UpdateOutcome::Updated)
    }

    async fn delete(
        &self,
        restaurant_id: &RestaurantId,
        id: &DishId,
    ) -> Result<DeleteOutcome, DishRepositoryError> {
        let mut tables = self.lock().map_err(DishRepositoryError::query)?;
        let before = tables.dishes.len();
        tables
            .dishes
            .retain(|dish| !(dish.id == *id && dish.restaurant_id == *restaurant_id));
        Ok(if tables.dishes.len() == before {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted
        })
    }
}

#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityUser>, IdentityStoreError> {
        let tables = self.lock().map_err(IdentityStoreError::query)?;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<IdentityUser>, IdentityStoreError> {
        let tables = self.lock().map_err(IdentityStoreError::query)?;
        Ok(tables.users.iter().find(|user| user.id == *id).cloned())
    }

    async fn add_to_role(&self, id: &UserId, role: &RoleName) -> Result<(), IdentityStoreError> {
        let mut tables = self.lock().map_err(IdentityStoreError::query)?;
        if !tables.role_catalogue.contains(role.as_ref()) {
            return Err(IdentityStoreError::role_not_found(role.as_ref()));
        }
        let Some(user) = tables.user_mut(id) else {
            return Err(IdentityStoreError::query("user not found"));
        };
        if !user.roles.insert(role.clone()) {
            return Err(IdentityStoreError::already_in_role(role.as_ref()));
        }
        Ok(())
    }

    async fn remove_from_role(
        &self,
        id: &UserId,
        role: &RoleName,
    ) -> Result<(), IdentityStoreError> {
        let mut tables = self.lock().map_err(IdentityStoreError::query)?;
        if !tables.role_catalogue.contains(role.as_ref()) {
            return Err(IdentityStoreError::role_not_found(role.as_ref()));
        }
        let Some(user) = tables.user_mut(id) else {
            return Err(IdentityStoreError::query("user not found"));
        };
        if !user.roles.remove(role) {
            return Err(IdentityStoreError::not_in_role(role.as_ref()));
        }
        Ok(())
    }

    async fn update_details(
        &self,
        id: &UserId,
        details: &UserDetailsUpdate,
    ) -> Result<UpdateOutcome, IdentityStoreError> {
        let mut tables = self.lock().map_err(IdentityStoreError::query)?;
        let Some(user) = tables.user_mut(id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        details.apply_to(user);
        Ok(UpdateOutcome::Updated)
    }
}
