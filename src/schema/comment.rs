use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::database::{Connection, ErrorExt, Result};
use crate::types::id::{CommentId, PostId, UserId};

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub created_at: NaiveDateTime,
    pub text: String,
    pub post_id: PostId,
    pub author_id: UserId,
}

/// Comment joined with its author's username, the shape the post
/// detail page renders.
#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct CommentView {
    pub id: CommentId,
    pub created_at: NaiveDateTime,
    pub text: String,
    pub author: String,
}

impl Comment {
    /// All comments of a post, newest first.
    #[tracing::instrument(skip(conn))]
    pub async fn for_post(conn: &mut Connection, post_id: PostId) -> Result<Vec<CommentView>> {
        sqlx::query_as::<_, CommentView>(
            r#"SELECT c.id, c.created_at, c.text, u.name AS author
               FROM "comments" c
               INNER JOIN "users" u ON u.id = c.author_id
               WHERE c.post_id = $1
               ORDER BY c.created_at DESC, c.id DESC"#,
        )
        .bind(post_id)
        .fetch_all(conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(conn, text))]
    pub async fn create(
        conn: &mut Connection,
        post_id: PostId,
        author_id: UserId,
        text: &str,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "comments" (text, post_id, author_id)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(text)
        .bind(post_id)
        .bind(author_id)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}
