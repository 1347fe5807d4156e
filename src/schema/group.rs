use serde::Serialize;
use sqlx::FromRow;

use crate::database::{Connection, ErrorExt, Result};
use crate::types::id::GroupId;

#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    #[tracing::instrument(skip(conn))]
    pub async fn by_slug(conn: &mut Connection, slug: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(r#"SELECT * FROM "groups" WHERE slug = $1"#)
            .bind(slug)
            .fetch_optional(conn)
            .await
            .into_db_error()
    }
}
