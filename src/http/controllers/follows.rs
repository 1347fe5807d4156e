use actix_web::{web, HttpRequest, HttpResponse};
use thiserror::Error;

use crate::http::{Actor, Error};
use crate::schema::{Follow, User};
use crate::types;
use crate::App;

#[derive(Debug, Error)]
#[error("no user under the requested username")]
struct UnknownUser;

/// Idempotent subscribe. Following an already-followed author or
/// yourself changes nothing; every outcome lands on the author's
/// profile.
#[tracing::instrument(skip(app, req))]
pub async fn follow(
    app: web::Data<App>,
    req: HttpRequest,
    actor: Actor,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user = actor.require_user(&req)?;

    let mut conn = app.db_write().await?;
    let Some(author) = User::by_name(&mut conn, &username).await? else {
        return Err(Error::from_context(types::Error::NotFound, UnknownUser));
    };

    if user.id != author.id {
        Follow::create(&mut conn, user.id, author.id).await?;
    }

    Ok(super::redirect(format!("/profile/{}/", author.name)))
}

/// Deletes the edge when present; unfollowing someone you never
/// followed is a quiet no-op.
#[tracing::instrument(skip(app, req))]
pub async fn unfollow(
    app: web::Data<App>,
    req: HttpRequest,
    actor: Actor,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user = actor.require_user(&req)?;

    let mut conn = app.db_write().await?;
    let Some(author) = User::by_name(&mut conn, &username).await? else {
        return Err(Error::from_context(types::Error::NotFound, UnknownUser));
    };

    Follow::delete(&mut conn, user.id, author.id).await?;

    Ok(super::redirect(format!("/profile/{}/", author.name)))
}
