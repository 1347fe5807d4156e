use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::feed;
use crate::http::{Actor, Error};
use crate::schema::{Follow, Group, User};
use crate::types;
use crate::App;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
}

/// Global feed. The only cached route: the full response body is
/// stored per path+query and served until the TTL runs out, even
/// if posts were written in the meantime.
#[tracing::instrument(skip(app, req))]
pub async fn index(
    app: web::Data<App>,
    req: HttpRequest,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, Error> {
    let key = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| "/".to_owned());

    if let Some(body) = app.page_cache.get(&key).await {
        tracing::debug!(%key, "serving home feed from cache");
        return Ok(json_body(body));
    }

    let mut conn = app.db_read().await?;
    let page = feed::global(&mut conn, app.paginator(), query.page.as_deref()).await?;

    let body = serialize_page(&json!({ "page": page }))?;
    app.page_cache.insert(key, body.clone()).await;
    Ok(json_body(body))
}

#[tracing::instrument(skip(app))]
pub async fn group_posts(
    app: web::Data<App>,
    slug: web::Path<String>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, Error> {
    #[derive(Debug, Error)]
    #[error("no group under the requested slug")]
    struct UnknownGroup;

    let mut conn = app.db_read().await?;
    let Some(group) = Group::by_slug(&mut conn, &slug).await? else {
        return Err(Error::from_context(types::Error::NotFound, UnknownGroup));
    };

    let page = feed::group(&mut conn, app.paginator(), group.id, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(json!({ "group": group, "page": page })))
}

#[tracing::instrument(skip(app))]
pub async fn profile(
    app: web::Data<App>,
    actor: Actor,
    username: web::Path<String>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, Error> {
    #[derive(Debug, Error)]
    #[error("no user under the requested username")]
    struct UnknownUser;

    let mut conn = app.db_read().await?;
    let Some(author) = User::by_name(&mut conn, &username).await? else {
        return Err(Error::from_context(types::Error::NotFound, UnknownUser));
    };

    // anonymous viewers are never following anyone
    let following = match actor.user() {
        Some(viewer) => Follow::exists(&mut conn, viewer.id, author.id).await?,
        None => false,
    };

    let page = feed::profile(&mut conn, app.paginator(), author.id, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "author": {
            "username": author.name,
            "display_name": author.display_name,
        },
        "following": following,
        "page": page,
    })))
}

/// Posts by every author the caller follows.
#[tracing::instrument(skip(app, req))]
pub async fn follow_index(
    app: web::Data<App>,
    req: HttpRequest,
    actor: Actor,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, Error> {
    let user = actor.require_user(&req)?;

    let mut conn = app.db_read().await?;
    let page = feed::following(&mut conn, app.paginator(), user.id, query.page.as_deref()).await?;
    Ok(HttpResponse::Ok().json(json!({ "page": page })))
}

fn json_body(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(actix_web::http::header::ContentType::json())
        .body(body)
}

fn serialize_page(value: &serde_json::Value) -> Result<String, Error> {
    #[derive(Debug, Error)]
    #[error("failed to serialize feed page")]
    struct SerializePage;

    serde_json::to_string(value).map_err(|e| {
        Error::from_report(
            types::Error::Internal,
            error_stack::Report::new(e).change_context(SerializePage),
        )
    })
}
