//! PostgreSQL-backed `IdentityStore` over the `users`, `roles`, and
//! `user_roles` tables.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{IdentityStore, IdentityStoreError, UpdateOutcome};
use crate::domain::{IdentityUser, RoleName, UserDetailsUpdate, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRoleRow, UserDetailsChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{roles, user_roles, users};

diesel::define_sql_function! {
    /// SQL `LOWER()` for case-insensitive email lookups.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Diesel-backed implementation of the identity store port.
#[derive(Clone)]
pub struct DieselIdentityStore {
    pool: DbPool,
}

impl DieselIdentityStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdentityStoreError {
    map_basic_pool_error(error, IdentityStoreError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> IdentityStoreError {
    map_basic_diesel_error(
        error,
        IdentityStoreError::query,
        IdentityStoreError::connection,
    )
}

async fn load_roles<C>(conn: &mut C, user_id: Uuid) -> Result<Vec<String>, IdentityStoreError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    user_roles::table
        .filter(user_roles::user_id.eq(user_id))
        .select(user_roles::role_name)
        .order(user_roles::role_name.asc())
        .load(conn)
        .await
        .map_err(map_diesel_error)
}

async fn role_exists<C>(conn: &mut C, role: &RoleName) -> Result<bool, IdentityStoreError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let count: i64 = roles::table
        .filter(roles::name.eq(role.as_ref()))
        .count()
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(count > 0)
}

#[async_trait]
impl IdentityStore for DieselIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityUser>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(lower(users::email).eq(email.to_lowercase()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let held = load_roles(&mut conn, row.id).await?;
        Ok(Some(row.into_identity_user(held)))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<IdentityUser>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let held = load_roles(&mut conn, row.id).await?;
        Ok(Some(row.into_identity_user(held)))
    }

    async fn add_to_role(&self, id: &UserId, role: &RoleName) -> Result<(), IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        if !role_exists(&mut conn, role).await? {
            return Err(IdentityStoreError::role_not_found(role.as_ref()));
        }

        let inserted = diesel::insert_into(user_roles::table)
            .values(&NewUserRoleRow {
                user_id: *id.as_uuid(),
                role_name: role.as_ref(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if inserted == 0 {
            return Err(IdentityStoreError::already_in_role(role.as_ref()));
        }
        Ok(())
    }

    async fn remove_from_role(
        &self,
        id: &UserId,
        role: &RoleName,
    ) -> Result<(), IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = user_roles::table.filter(
            user_roles::user_id
                .eq(id.as_uuid())
                .and(user_roles::role_name.eq(role.as_ref())),
        );
        let deleted = diesel::delete(target)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted > 0 {
            return Ok(());
        }
        if role_exists(&mut conn, role).await? {
            Err(IdentityStoreError::not_in_role(role.as_ref()))
        } else {
            Err(IdentityStoreError::role_not_found(role.as_ref()))
        }
    }

    async fn update_details(
        &self,
        id: &UserId,
        details: &UserDetailsUpdate,
    ) -> Result<UpdateOutcome, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let target = users::table.filter(users::id.eq(id.as_uuid()));
        let matched = if details.birth_date.is_none() && details.nationality.is_none() {
            let count: i64 = target
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            count > 0
        } else {
            let affected = diesel::update(target)
                .set(&UserDetailsChangeset::from(details))
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
}
