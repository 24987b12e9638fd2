use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::error::DomainError;
use wayfare_core::user::User;

use crate::error::map_sqlx;
use crate::rows::UserRow;

const USER_COLUMNS: &str = "id, identity_id, email, password_hash, role, first_name, last_name, \
     phone, street_address, city, state, zip, profile_image_url, is_active, created_at, updated_at";

/// Profile fields a PATCH may change; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub profile_image_url: Option<String>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn create(pool: &PgPool, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO users (id, identity_id, email, password_hash, role, first_name, last_name, \
             phone, street_address, city, state, zip, profile_image_url, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(user.id)
        .bind(&user.identity_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.street_address)
        .bind(&user.city)
        .bind(&user.state)
        .bind(&user.zip)
        .bind(&user.profile_image_url)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(User::from))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(User::from))
    }

    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                 first_name = COALESCE($2, first_name), \
                 last_name = COALESCE($3, last_name), \
                 phone = COALESCE($4, phone), \
                 street_address = COALESCE($5, street_address), \
                 city = COALESCE($6, city), \
                 state = COALESCE($7, state), \
                 zip = COALESCE($8, zip), \
                 profile_image_url = COALESCE($9, profile_image_url), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.phone)
        .bind(&changes.street_address)
        .bind(&changes.city)
        .bind(&changes.state)
        .bind(&changes.zip)
        .bind(&changes.profile_image_url)
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(User::from))
    }

    /// Admin listing, newest first.
    pub async fn list(
        pool: &PgPool,
        is_active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), DomainError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::BOOLEAN IS NULL OR is_active = $1) \
             ORDER BY created_at DESC, id ASC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx)?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::BOOLEAN IS NULL OR is_active = $1)",
        )
        .bind(is_active)
        .fetch_one(pool)
        .await
        .map_err(map_sqlx)?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    /// Soft-deactivation; the user's bookings survive.
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(User::from))
    }

    /// Cohort source for the city trace: user ids whose profile city matches.
    pub async fn user_ids_by_city(
        pool: &PgPool,
        city: &str,
        limit: i64,
    ) -> Result<Vec<Uuid>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM users WHERE LOWER(city) = LOWER($1) ORDER BY created_at ASC LIMIT $2",
        )
        .bind(city)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx)?;

        Ok(ids)
    }
}
