use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{like_pattern, Store, StoreError, StoreResult};
use crate::ads::repo_types::{Ad, AdChanges, NewAd};
use crate::reviews::repo_types::Review;
use crate::users::repo_types::{NewUser, ProfileChanges, User};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone, role, image, is_active, created_at";
const AD_COLUMNS: &str = "id, title, price, description, author_id, created_at";
const REVIEW_COLUMNS: &str = "id, text, author_id, ad_id, created_at";

/// PostgreSQL-backed store. Cascades are enforced by foreign keys.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn map_unique(e: sqlx::Error, what: &'static str) -> StoreError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict(what),
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_unique(e, "email"))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET first_name = COALESCE($2, first_name),
                   last_name  = COALESCE($3, last_name),
                   phone      = CASE WHEN $4 THEN $5 ELSE phone END,
                   image      = CASE WHEN $6 THEN $7 ELSE image END
             WHERE id = $1
         RETURNING {USER_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.phone.is_some())
            .bind(changes.phone.flatten())
            .bind(changes.image.is_some())
            .bind(changes.image.flatten())
            .fetch_optional(&self.db)
            .await?)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn count_ads(&self, search: Option<&str>) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
              FROM ads
             WHERE $1::TEXT IS NULL OR title ILIKE $1
            "#,
        )
        .bind(search.map(like_pattern))
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn list_ads(&self, search: Option<&str>, limit: i64, offset: i64) -> StoreResult<Vec<Ad>> {
        let sql = format!(
            r#"
            SELECT {AD_COLUMNS}
              FROM ads
             WHERE $1::TEXT IS NULL OR title ILIKE $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3
            "#
        );
        Ok(sqlx::query_as::<_, Ad>(&sql)
            .bind(search.map(like_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?)
    }

    async fn find_ad(&self, id: Uuid) -> StoreResult<Option<Ad>> {
        let sql = format!("SELECT {AD_COLUMNS} FROM ads WHERE id = $1");
        Ok(sqlx::query_as::<_, Ad>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn create_ad(&self, author_id: Uuid, ad: NewAd) -> StoreResult<Ad> {
        let sql = format!(
            r#"
            INSERT INTO ads (title, price, description, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {AD_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Ad>(&sql)
            .bind(ad.title)
            .bind(ad.price)
            .bind(ad.description)
            .bind(author_id)
            .fetch_one(&self.db)
            .await?)
    }

    async fn update_ad(&self, id: Uuid, changes: AdChanges) -> StoreResult<Option<Ad>> {
        let sql = format!(
            r#"
            UPDATE ads
               SET title       = COALESCE($2, title),
                   price       = COALESCE($3, price),
                   description = COALESCE($4, description)
             WHERE id = $1
         RETURNING {AD_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Ad>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.price)
            .bind(changes.description)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn delete_ad(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn list_reviews(&self, ad_id: Uuid) -> StoreResult<Vec<Review>> {
        let sql = format!(
            r#"
            SELECT {REVIEW_COLUMNS}
              FROM reviews
             WHERE ad_id = $1
             ORDER BY created_at ASC
            "#
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(ad_id)
            .fetch_all(&self.db)
            .await?)
    }

    async fn find_review(&self, ad_id: Uuid, id: Uuid) -> StoreResult<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1 AND ad_id = $2");
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(ad_id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn create_review(&self, ad_id: Uuid, author_id: Uuid, text: &str) -> StoreResult<Review> {
        let sql = format!(
            r#"
            INSERT INTO reviews (text, author_id, ad_id)
            VALUES ($1, $2, $3)
            RETURNING {REVIEW_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(text)
            .bind(author_id)
            .bind(ad_id)
            .fetch_one(&self.db)
            .await?)
    }

    async fn update_review(&self, id: Uuid, text: &str) -> StoreResult<Option<Review>> {
        let sql = format!("UPDATE reviews SET text = $2 WHERE id = $1 RETURNING {REVIEW_COLUMNS}");
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(text)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
