use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::database::{Connection, ErrorExt, Result};
use crate::types::id::{GroupId, PostId, UserId};

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub created_at: NaiveDateTime,
    pub text: String,
    pub image: Option<String>,
    pub author_id: UserId,
    pub group_id: Option<GroupId>,
}

/// Fields the author controls when creating or editing a post.
#[derive(Debug)]
pub struct PostDraft<'a> {
    pub text: &'a str,
    pub image: Option<&'a str>,
    pub group_id: Option<GroupId>,
}

/// One row of a feed page: the post joined with its author's
/// username and (when present) the group it belongs to. Assembled
/// in a single query to avoid per-row lookups.
#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: PostId,
    pub created_at: NaiveDateTime,
    pub text: String,
    pub image: Option<String>,
    pub author: String,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

const FEED_SELECT: &str = r#"
    SELECT p.id, p.created_at, p.text, p.image,
           u.name AS author, g.slug AS group_slug, g.title AS group_title
    FROM "posts" p
    INNER JOIN "users" u ON u.id = p.author_id
    LEFT JOIN "groups" g ON g.id = p.group_id
"#;

// Ties broken by id so pages stay stable when two posts share a
// creation timestamp.
const FEED_ORDER: &str = r#" ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2"#;

impl Post {
    #[tracing::instrument(skip(conn))]
    pub async fn by_id(conn: &mut Connection, id: PostId) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "posts" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    /// The detail-page shape of one post, with author and group
    /// names already joined in.
    #[tracing::instrument(skip(conn))]
    pub async fn entry_by_id(conn: &mut Connection, id: PostId) -> Result<Option<FeedEntry>> {
        sqlx::query_as::<_, FeedEntry>(&format!("{FEED_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn, draft))]
    pub async fn create(
        conn: &mut Connection,
        author_id: UserId,
        draft: &PostDraft<'_>,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO "posts" (text, image, author_id, group_id)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(draft.text)
        .bind(draft.image)
        .bind(author_id)
        .bind(draft.group_id)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(conn, draft))]
    pub async fn update(conn: &mut Connection, id: PostId, draft: &PostDraft<'_>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"UPDATE "posts" SET text = $2, image = $3, group_id = $4
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(draft.text)
        .bind(draft.image)
        .bind(draft.group_id)
        .fetch_one(conn)
        .await
        .into_db_error()
    }
}

// Feed queries. Each view is a count plus a page of joined rows;
// the paginator in `crate::feed` turns these into page metadata.
impl Post {
    #[tracing::instrument(skip(conn))]
    pub async fn count_all(conn: &mut Connection) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "posts""#)
            .fetch_one(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn page_all(
        conn: &mut Connection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedEntry>> {
        sqlx::query_as::<_, FeedEntry>(&format!("{FEED_SELECT}{FEED_ORDER}"))
            .bind(limit)
            .bind(offset)
            .fetch_all(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn count_in_group(conn: &mut Connection, group_id: GroupId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "posts" WHERE group_id = $1"#)
            .bind(group_id)
            .fetch_one(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn page_in_group(
        conn: &mut Connection,
        group_id: GroupId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedEntry>> {
        sqlx::query_as::<_, FeedEntry>(&format!(
            "{FEED_SELECT} WHERE p.group_id = $3{FEED_ORDER}"
        ))
        .bind(limit)
        .bind(offset)
        .bind(group_id)
        .fetch_all(conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn count_by_author(conn: &mut Connection, author_id: UserId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "posts" WHERE author_id = $1"#)
            .bind(author_id)
            .fetch_one(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn page_by_author(
        conn: &mut Connection,
        author_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedEntry>> {
        sqlx::query_as::<_, FeedEntry>(&format!(
            "{FEED_SELECT} WHERE p.author_id = $3{FEED_ORDER}"
        ))
        .bind(limit)
        .bind(offset)
        .bind(author_id)
        .fetch_all(conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn count_followed_by(conn: &mut Connection, user_id: UserId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM "posts" p
               INNER JOIN "follows" f ON f.author_id = p.author_id
               WHERE f.user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(conn)
        .await
        .into_db_error()
    }

    /// Posts authored by anyone the given user follows.
    #[tracing::instrument(skip(conn))]
    pub async fn page_followed_by(
        conn: &mut Connection,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedEntry>> {
        sqlx::query_as::<_, FeedEntry>(&format!(
            "{FEED_SELECT} INNER JOIN \"follows\" f ON f.author_id = p.author_id \
             AND f.user_id = $3{FEED_ORDER}"
        ))
        .bind(limit)
        .bind(offset)
        .bind(user_id)
        .fetch_all(conn)
        .await
        .into_db_error()
    }
}
