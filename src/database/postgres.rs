use async_trait::async_trait;
use sqlx::PgPool;

use crate::config::StoreBackend;
use crate::filter::SearchFilter;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{FeedItem, NewFeedItem, NewUser, User, UserChanges};
use super::store::{email_taken, Store};

const USER_COLUMNS: &str = "id, email, name, password, is_active, is_staff, created_at";
const FEED_COLUMNS: &str = "f.id, f.owner_id, f.status_text, f.created_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique violation on the users table to a field conflict
fn map_user_write(err: sqlx::Error) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => email_taken(),
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn list_users(&self, search: &SearchFilter) -> Result<Vec<User>, DatabaseError> {
        let mut sql = format!("SELECT {} FROM users", USER_COLUMNS);
        let mut params = Vec::new();
        if let Some((clause, values)) = search.where_clause(&["name", "email"], 1) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            params = values;
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query_as::<_, User>(&sql);
        for param in params {
            query = query.bind(param);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (email, name, password, is_staff) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password)
            .bind(user.is_staff)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_write)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                name = COALESCE($3, name), \
                password = COALESCE($4, password) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.name)
            .bind(changes.password)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_write)?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))
    }

    async fn delete_user(&self, id: i64) -> Result<(), DatabaseError> {
        // feed_items and auth_tokens cascade
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<User, DatabaseError> {
        let sql = format!("UPDATE users SET is_active = $2 WHERE id = $1 RETURNING {}", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))
    }

    async fn list_feed_items(&self, search: &SearchFilter) -> Result<Vec<FeedItem>, DatabaseError> {
        let mut sql = format!(
            "SELECT {} FROM feed_items f JOIN users u ON u.id = f.owner_id",
            FEED_COLUMNS
        );
        let mut params = Vec::new();
        if let Some((clause, values)) = search.where_clause(&["u.name", "u.email", "f.status_text"], 1) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            params = values;
        }
        sql.push_str(" ORDER BY f.id");

        let mut query = sqlx::query_as::<_, FeedItem>(&sql);
        for param in params {
            query = query.bind(param);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn get_feed_item(&self, id: i64) -> Result<Option<FeedItem>, DatabaseError> {
        let sql = format!("SELECT {} FROM feed_items f WHERE f.id = $1", FEED_COLUMNS);
        Ok(sqlx::query_as::<_, FeedItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_feed_item(&self, item: NewFeedItem) -> Result<FeedItem, DatabaseError> {
        Ok(sqlx::query_as::<_, FeedItem>(
            "INSERT INTO feed_items (owner_id, status_text) VALUES ($1, $2) \
             RETURNING id, owner_id, status_text, created_at",
        )
        .bind(item.owner_id)
        .bind(&item.status_text)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_feed_item(&self, id: i64, status_text: String) -> Result<FeedItem, DatabaseError> {
        sqlx::query_as::<_, FeedItem>(
            "UPDATE feed_items SET status_text = $2 WHERE id = $1 \
             RETURNING id, owner_id, status_text, created_at",
        )
        .bind(id)
        .bind(status_text)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("feed item {}", id)))
    }

    async fn delete_feed_item(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM feed_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("feed item {}", id)));
        }
        Ok(())
    }

    async fn insert_token(&self, digest: &str, user_id: i64) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO auth_tokens (digest, user_id) VALUES ($1, $2)")
            .bind(digest)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn user_for_token(&self, digest: &str) -> Result<Option<User>, DatabaseError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.name, u.password, u.is_active, u.is_staff, u.created_at \
             FROM auth_tokens t JOIN users u ON u.id = t.user_id \
             WHERE t.digest = $1",
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?)
    }
}
