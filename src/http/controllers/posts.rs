use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::{Validate, ValidateError};

use crate::database::{Connection, ErrorExt};
use crate::http::{Actor, Error};
use crate::schema::{Comment, Group, Post, PostDraft};
use crate::types;
use crate::types::form::post as post_form;
use crate::types::id::GroupId;
use crate::App;

#[tracing::instrument(skip(app))]
pub async fn detail(app: web::Data<App>, id: web::Path<String>) -> Result<HttpResponse, Error> {
    #[derive(Debug, Error)]
    #[error("no post under the requested id")]
    struct UnknownPost;

    let id = super::parse_post_id(&id)?;

    let mut conn = app.db_read().await?;
    let Some(post) = Post::entry_by_id(&mut conn, id).await? else {
        return Err(Error::from_context(types::Error::NotFound, UnknownPost));
    };

    let comments = Comment::for_post(&mut conn, id).await?;
    Ok(HttpResponse::Ok().json(json!({ "post": post, "comments": comments })))
}

/// Creates a post owned by the caller and sends them to their own
/// profile, where the new post sits on top.
#[tracing::instrument(skip(app, req))]
pub async fn create(
    app: web::Data<App>,
    req: HttpRequest,
    actor: Actor,
    form: web::Json<post_form::Request>,
) -> Result<HttpResponse, Error> {
    let user = actor.require_user(&req)?;
    form.validate()?;

    let mut conn = app.db_write().await?;
    let group_id = resolve_group(&mut conn, form.group.as_deref()).await?;

    let draft = PostDraft {
        text: &form.text,
        image: form.image.as_deref(),
        group_id,
    };
    Post::create(&mut conn, user.id, &draft).await?;

    Ok(super::redirect(format!("/profile/{}/", user.name)))
}

/// Author-only edit. Anyone else lands back on the detail page
/// with the post untouched.
#[tracing::instrument(skip(app, req))]
pub async fn edit(
    app: web::Data<App>,
    req: HttpRequest,
    actor: Actor,
    id: web::Path<String>,
    form: web::Json<post_form::Request>,
) -> Result<HttpResponse, Error> {
    #[derive(Debug, Error)]
    #[error("no post under the requested id")]
    struct UnknownPost;

    let user = actor.require_user(&req)?;
    let id = super::parse_post_id(&id)?;

    let mut tx = app.primary_db.begin().await?;
    let Some(post) = Post::by_id(&mut tx, id).await? else {
        return Err(Error::from_context(types::Error::NotFound, UnknownPost));
    };

    if post.author_id != user.id {
        return Ok(super::redirect(format!("/posts/{id}/")));
    }

    form.validate()?;
    let group_id = resolve_group(&mut tx, form.group.as_deref()).await?;

    let draft = PostDraft {
        text: &form.text,
        image: form.image.as_deref(),
        group_id,
    };
    Post::update(&mut tx, id, &draft).await?;
    tx.commit().await.into_db_error()?;

    Ok(super::redirect(format!("/posts/{id}/")))
}

/// Posts reference groups by slug on the wire; an unknown slug is
/// a form error, not a 404.
async fn resolve_group(
    conn: &mut Connection,
    slug: Option<&str>,
) -> Result<Option<GroupId>, Error> {
    let Some(slug) = slug else {
        return Ok(None);
    };

    match Group::by_slug(conn, slug).await? {
        Some(group) => Ok(Some(group.id)),
        None => {
            let mut msg = ValidateError::msg_builder();
            msg.insert("Unknown group");
            let mut fields = ValidateError::field_builder();
            fields.insert("group", msg.build());
            Err(Error::from(fields.build()))
        }
    }
}
