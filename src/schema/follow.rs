use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::database::{Connection, ErrorExt, Result};
use crate::types::id::{FollowId, UserId};

/// Directed subscription edge: `user_id` follows `author_id`.
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Follow {
    pub id: FollowId,
    pub created_at: NaiveDateTime,
    pub user_id: UserId,
    pub author_id: UserId,
}

impl Follow {
    #[tracing::instrument(skip(conn))]
    pub async fn exists(conn: &mut Connection, user_id: UserId, author_id: UserId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (
                   SELECT 1 FROM "follows" WHERE user_id = $1 AND author_id = $2
               )"#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    /// Inserts the edge, doing nothing when it already exists.
    /// The unique constraint makes this race-free under concurrent
    /// requests for the same pair.
    #[tracing::instrument(skip(conn))]
    pub async fn create(conn: &mut Connection, user_id: UserId, author_id: UserId) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO "follows" (user_id, author_id)
               VALUES ($1, $2)
               ON CONFLICT (user_id, author_id) DO NOTHING"#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(conn)
        .await
        .into_db_error()?;

        Ok(())
    }

    /// Deletes the edge if present; absent edges are a no-op.
    #[tracing::instrument(skip(conn))]
    pub async fn delete(conn: &mut Connection, user_id: UserId, author_id: UserId) -> Result<()> {
        sqlx::query(r#"DELETE FROM "follows" WHERE user_id = $1 AND author_id = $2"#)
            .bind(user_id)
            .bind(author_id)
            .execute(conn)
            .await
            .into_db_error()?;

        Ok(())
    }
}
