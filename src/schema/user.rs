use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::database::{Connection, ErrorExt, Result};
use crate::types::id::UserId;

/// Identity row managed by the external auth collaborator. This
/// service never writes to it.
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub created_at: NaiveDateTime,
    pub name: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: String,
    pub updated_at: Option<NaiveDateTime>,
}

impl User {
    #[tracing::instrument(skip(conn))]
    pub async fn by_id(conn: &mut Connection, id: UserId) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(conn))]
    pub async fn by_name(conn: &mut Connection, name: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE name = $1"#)
            .bind(name)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }
}
