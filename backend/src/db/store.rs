use crate::core::DbContext;

/// SQLite-backed implementation of the repository traits.
#[derive(Clone, Debug)]
pub struct Store {
    pub db: DbContext,
}

impl Store {
    #[must_use]
    pub const fn new(db: DbContext) -> Self {
        Self { db }
    }

    /// Cheap round trip used by the health check.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
