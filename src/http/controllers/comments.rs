use actix_web::{web, HttpRequest, HttpResponse};
use thiserror::Error;
use validator::Validate;

use crate::http::{Actor, Error};
use crate::schema::{Comment, Post};
use crate::types;
use crate::types::form::comment as comment_form;
use crate::App;

/// Attaches a comment to a post and returns to the detail page.
/// An invalid submission is dropped without feedback; the caller
/// is redirected either way.
#[tracing::instrument(skip(app, req))]
pub async fn add_comment(
    app: web::Data<App>,
    req: HttpRequest,
    actor: Actor,
    id: web::Path<String>,
    form: web::Json<comment_form::Request>,
) -> Result<HttpResponse, Error> {
    #[derive(Debug, Error)]
    #[error("no post under the requested id")]
    struct UnknownPost;

    let user = actor.require_user(&req)?;
    let id = super::parse_post_id(&id)?;

    let mut conn = app.db_write().await?;
    let Some(post) = Post::by_id(&mut conn, id).await? else {
        return Err(Error::from_context(types::Error::NotFound, UnknownPost));
    };

    match form.validate() {
        Ok(()) => {
            Comment::create(&mut conn, post.id, user.id, &form.text).await?;
        }
        Err(error) => {
            tracing::debug!(?error, "dropping invalid comment submission");
        }
    }

    Ok(super::redirect(format!("/posts/{id}/")))
}
