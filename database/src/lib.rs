//! Durable record of processed items and rejected domains.

use relaybot_core::{CoreError, DatabaseError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};


pub struct Database {
    pool: SqlitePool,
    path: String,
}

impl Database {
    /// Opens the SQLite file at `path`, creating it if it does not exist yet.
    pub async fn connect(path: &str) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // Writes come from a single flow of control; one connection is enough.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: format!("{}: {}", path, e),
            })?;

        info!("Opened database {}", path);
        Ok(Self {
            pool,
            path: path.to_string(),
        })
    }

    /// Connects and makes sure both tables exist.
    pub async fn open(path: &str) -> Result<Self, CoreError> {
        let db = Self::connect(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::MigrationFailed {
                migration: e.to_string(),
            })?;
        debug!("Schema ready in {}", self.path);
        Ok(())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn has_seen(&self, item_id: &str) -> Result<bool, CoreError> {
        let row = sqlx::query_scalar::<_, i64>("SELECT 1 FROM seen_entries WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Sql)?;

        Ok(row.is_some())
    }

    /// Marks `item_id` as processed. Recording the same id twice fails with
    /// [`DatabaseError::DuplicateItem`].
    pub async fn record_seen(&self, item_id: &str) -> Result<(), CoreError> {
        sqlx::query("INSERT INTO seen_entries (id) VALUES (?)")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    DatabaseError::DuplicateItem {
                        id: item_id.to_string(),
                    }
                }
                _ => DatabaseError::Sql(e),
            })?;

        debug!("Recorded {} as seen", item_id);
        Ok(())
    }

    /// Bumps the rejection counter of `domain` and returns the new count.
    pub async fn reject_domain(&self, domain: &str) -> Result<i64, CoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO blocked_domains (domain) VALUES (?)
            ON CONFLICT(domain) DO UPDATE SET blocked_count = blocked_count + 1
            RETURNING blocked_count
            "#,
        )
        .bind(domain)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Sql)?;

        debug!("Domain {} rejected {} time(s)", domain, count);
        Ok(count)
    }

    pub async fn domain_rejections(&self, domain: &str) -> Result<Option<i64>, CoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT blocked_count FROM blocked_domains WHERE domain = ?",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Sql)?;

        Ok(count)
    }

    pub async fn seen_count(&self) -> Result<i64, CoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM seen_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Sql)?;

        Ok(count)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
