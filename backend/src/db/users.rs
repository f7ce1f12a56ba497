use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::{Store, StoreError, StoreResult, UnknownVariant, UserStore};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Role {
    BusinessOwner,
    SystemAdmin,
    Staff,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BusinessOwner => "BusinessOwner",
            Self::SystemAdmin => "SystemAdmin",
            Self::Staff => "Staff",
        }
    }

    /// Roles allowed to manage their tenant's plan and members.
    #[must_use]
    pub const fn can_manage_tenant(self) -> bool {
        matches!(self, Self::BusinessOwner | Self::SystemAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BusinessOwner" => Ok(Self::BusinessOwner),
            "SystemAdmin" => Ok(Self::SystemAdmin),
            "Staff" => Ok(Self::Staff),
            _ => Err(UnknownVariant { kind: "role", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub tenant_id: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    /// Only kept for business owners.
    pub business_registration_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(
        email: &str,
        full_name: &str,
        password_hash: String,
        tenant_id: &str,
        role: Role,
        business_registration_number: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            full_name: full_name.to_string(),
            password_hash,
            tenant_id: tenant_id.to_string(),
            role,
            business_registration_number: business_registration_number.filter(|_| role == Role::BusinessOwner),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Emails are compared and stored trimmed and lower-cased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const USER_COLUMNS: &str = "id, email, full_name, password_hash, tenant_id, role, business_registration_number, is_active, created_at";

pub(super) async fn insert_user<'e, E>(executor: E, user: &User) -> StoreResult<()>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query(
        r"
        INSERT INTO users (id, email, full_name, password_hash, tenant_id, role, business_registration_number, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.password_hash)
    .bind(&user.tenant_id)
    .bind(user.role.as_str())
    .bind(&user.business_registration_number)
    .bind(user.is_active)
    .bind(user.created_at)
    .execute(executor)
    .await
    .map_err(|e| StoreError::from_sqlx("user", e))?;
    Ok(())
}

#[async_trait]
impl UserStore for Store {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"))
            .bind(normalize_email(email))
            .fetch_optional(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("user", e))
    }

    async fn get_user(&self, id: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("user", e))
    }

    async fn add_user(&self, user: &User) -> StoreResult<()> {
        insert_user(&self.db, user).await
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET email = ?, full_name = ?, password_hash = ?, role = ?,
                business_registration_number = ?, is_active = ?
            WHERE id = ?
            ",
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.business_registration_number)
        .bind(user.is_active)
        .bind(&user.id)
        .execute(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("user", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    async fn list_users_by_tenant(&self, tenant_id: &str) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE tenant_id = ? ORDER BY created_at"))
            .bind(tenant_id)
            .fetch_all(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("user", e))
    }
}
