//! PostgreSQL-backed `BusinessStore` implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    db::traits::{escape_like, BusinessStore},
    models::{Business, NewBusiness, Verification},
    Error, Result,
};

const BUSINESS_COLUMNS: &str = "id, name, registration_number, owner, address, phone_number, \
     email, business_type, date_registered, verified, verified_at, verified_by, \
     ipfs_hash, solana_hash, created_at, updated_at";

/// PostgreSQL-backed BusinessStore implementation
#[derive(Clone)]
pub struct PostgresBusinessStore {
    pub(crate) pool: PgPool,
}

impl PostgresBusinessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessStore for PostgresBusinessStore {
    async fn insert(&self, new: NewBusiness) -> Result<Business> {
        new.check()?;
        let record = Business::from_new(new, Utc::now());

        let sql = format!(
            "INSERT INTO businesses (
                 id, name, registration_number, owner, address, phone_number, email,
                 business_type, date_registered, ipfs_hash, solana_hash, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
             RETURNING {BUSINESS_COLUMNS}"
        );

        sqlx::query_as::<_, Business>(&sql)
            .bind(&record.id)
            .bind(&record.name)
            .bind(&record.registration_number)
            .bind(&record.owner)
            .bind(&record.address)
            .bind(&record.phone_number)
            .bind(&record.email)
            .bind(&record.business_type)
            .bind(record.date_registered)
            .bind(&record.ipfs_hash)
            .bind(&record.solana_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    Error::DuplicateRegistration {
                        registration_number: record.registration_number.clone(),
                    }
                }
                other => Error::Database(other),
            })
    }

    async fn get(&self, id: &str) -> Result<Option<Business>> {
        let sql = format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1");
        let business = sqlx::query_as::<_, Business>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(business)
    }

    async fn find_by_registration_number(
        &self,
        registration_number: &str,
    ) -> Result<Option<Business>> {
        let sql =
            format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE registration_number = $1");
        let business = sqlx::query_as::<_, Business>(&sql)
            .bind(registration_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(business)
    }

    async fn search_by_name(&self, query: &str, limit: i64) -> Result<Vec<Business>> {
        let sql = format!(
            r#"SELECT {BUSINESS_COLUMNS}
              FROM businesses
              WHERE name ILIKE $1 ESCAPE '\'
              ORDER BY verified DESC, LOWER(name) COLLATE "C" ASC, name COLLATE "C" ASC, id ASC
              LIMIT $2"#
        );
        let rows = sqlx::query_as::<_, Business>(&sql)
            .bind(format!("%{}%", escape_like(query)))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows)
    }

    async fn suggest_names(
        &self,
        name_fragment: &str,
        business_type: &str,
        limit: i64,
    ) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"SELECT name
              FROM businesses
              WHERE name ILIKE $1 ESCAPE '\'
                 OR business_type ILIKE $2 ESCAPE '\'
              GROUP BY name
              ORDER BY LOWER(name) COLLATE "C" ASC, name COLLATE "C" ASC
              LIMIT $3"#,
        )
        .bind(format!("%{}%", escape_like(name_fragment)))
        .bind(format!("%{}%", escape_like(business_type)))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(names)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Business>> {
        let sql = format!(
            "SELECT {BUSINESS_COLUMNS}
             FROM businesses
             ORDER BY verified DESC, updated_at DESC, id ASC
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, Business>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows)
    }

    async fn list_by_verification(
        &self,
        verified: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Business>> {
        // Note: the ORDER BY column is chosen from a boolean, not from user input.
        let order_column = if verified { "verified_at" } else { "created_at" };
        let sql = format!(
            "SELECT {BUSINESS_COLUMNS}
             FROM businesses
             WHERE verified = $1
             ORDER BY {order_column} DESC, id ASC
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, Business>(&sql)
            .bind(verified)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows)
    }

    async fn count(&self, verified: Option<bool>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM businesses WHERE ($1::BOOLEAN IS NULL OR verified = $1)",
        )
        .bind(verified)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(count)
    }

    async fn set_verification(
        &self,
        id: &str,
        verification: Option<Verification>,
    ) -> Result<Option<Business>> {
        let (verified, verified_at, verified_by) = match verification {
            Some(v) => (true, Some(v.verified_at), Some(v.verified_by)),
            None => (false, None, None),
        };

        let sql = format!(
            "UPDATE businesses
             SET verified = $2, verified_at = $3, verified_by = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {BUSINESS_COLUMNS}"
        );
        let business = sqlx::query_as::<_, Business>(&sql)
            .bind(id)
            .bind(verified)
            .bind(verified_at)
            .bind(verified_by)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(business)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
