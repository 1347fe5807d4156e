use actix_web::http::header;
use actix_web::{web, HttpResponse};
use thiserror::Error;

use crate::types;
use crate::types::id::PostId;

use super::Error as HttpError;

pub mod comments;
pub mod feed;
pub mod follows;
pub mod posts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(feed::index))
        .route("/create/", web::post().to(posts::create))
        .route("/follow/", web::get().to(feed::follow_index))
        .service(web::scope("/group").route("/{slug}/", web::get().to(feed::group_posts)))
        .service(
            web::scope("/posts")
                .route("/{id}/", web::get().to(posts::detail))
                .route("/{id}/edit/", web::post().to(posts::edit))
                .route("/{id}/comment/", web::post().to(comments::add_comment)),
        )
        .service(
            web::scope("/profile")
                .route("/{username}/", web::get().to(feed::profile))
                .route("/{username}/follow/", web::post().to(follows::follow))
                .route("/{username}/unfollow/", web::post().to(follows::unfollow)),
        )
        .default_service(web::route().to(not_found));
}

/// Branded catch-all for routes and resources that do not exist.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(types::Error::NotFound)
}

/// The handlers answer successful writes with a redirect to the
/// page the user should see next, like any classic form-driven
/// blog.
pub(crate) fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Route ids come in as raw path segments; anything that is not a
/// positive integer cannot name a post, which makes it a 404
/// rather than a bad request.
pub(crate) fn parse_post_id(raw: &str) -> Result<PostId, HttpError> {
    #[derive(Debug, Error)]
    #[error("path segment does not name a post")]
    struct UnknownPost;

    raw.parse::<u64>()
        .ok()
        .and_then(PostId::new_checked)
        .ok_or_else(|| HttpError::from_context(types::Error::NotFound, UnknownPost))
}
