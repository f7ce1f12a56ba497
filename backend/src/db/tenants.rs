use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::{Store, StoreError, StoreResult, TenantStore, UnknownVariant, User};

/// Subscription state of a tenant.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlanType {
    Trial,
    Paid,
}

impl PlanType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "Trial",
            Self::Paid => "Paid",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Trial" => Ok(Self::Trial),
            "Paid" => Ok(Self::Paid),
            _ => Err(UnknownVariant { kind: "plan type", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for PlanType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A venue account: the unit of billing and data isolation.
#[derive(Clone, Debug, FromRow)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub location: String,
    #[sqlx(try_from = "String")]
    pub plan_type: PlanType,
    /// Set once when the tenant first goes on Trial; never cleared.
    pub trial_started_at: Option<DateTime<Utc>>,
    pub subscription_started_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// A fresh trial tenant, as created at registration.
    #[must_use]
    pub fn new_trial(name: &str, location: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: location.to_string(),
            plan_type: PlanType::Trial,
            trial_started_at: Some(now),
            subscription_started_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the tenant to `plan`, keeping the trial start for auditing.
    pub fn change_plan(&mut self, plan: PlanType, now: DateTime<Utc>) {
        match plan {
            PlanType::Paid if self.plan_type != PlanType::Paid => {
                self.subscription_started_at = Some(now);
            }
            PlanType::Trial => {
                self.trial_started_at.get_or_insert(now);
            }
            PlanType::Paid => {}
        }
        self.plan_type = plan;
        self.updated_at = now;
    }
}

const TENANT_COLUMNS: &str = "id, name, location, plan_type, trial_started_at, subscription_started_at, is_active, created_at, updated_at";

#[async_trait]
impl TenantStore for Store {
    async fn get_tenant(&self, id: &str) -> StoreResult<Tenant> {
        sqlx::query_as::<_, Tenant>(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?"))
            .bind(id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("tenant", e))
    }

    async fn add_tenant_with_owner(&self, tenant: &Tenant, owner: &User) -> StoreResult<()> {
        let mut tx = self.db.begin().await.map_err(StoreError::OperationFailed)?;

        sqlx::query(
            r"
            INSERT INTO tenants (id, name, location, plan_type, trial_started_at, subscription_started_at, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.location)
        .bind(tenant.plan_type.as_str())
        .bind(tenant.trial_started_at)
        .bind(tenant.subscription_started_at)
        .bind(tenant.is_active)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::from_sqlx("tenant", e))?;

        super::users::insert_user(&mut *tx, owner).await?;

        tx.commit().await.map_err(StoreError::OperationFailed)?;
        Ok(())
    }

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<()> {
        let result = sqlx::query(
            r"
            UPDATE tenants
            SET name = ?, location = ?, plan_type = ?, trial_started_at = ?,
                subscription_started_at = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&tenant.name)
        .bind(&tenant.location)
        .bind(tenant.plan_type.as_str())
        .bind(tenant.trial_started_at)
        .bind(tenant.subscription_started_at)
        .bind(tenant.is_active)
        .bind(tenant.updated_at)
        .bind(&tenant.id)
        .execute(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("tenant", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("tenant"));
        }
        Ok(())
    }

    async fn delete_tenant(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("tenant", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("tenant"));
        }
        Ok(())
    }
}
