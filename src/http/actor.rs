use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, LocalBoxFuture};
use thiserror::Error;

use crate::schema::User;
use crate::types;
use crate::App;

use super::{Error, Jwt};

/// Who is making the request. Routes open to everyone take the
/// actor as-is; user-only routes call
/// [`require_user`](Actor::require_user) which turns an anonymous
/// caller into a login redirect.
#[derive(Debug)]
pub enum Actor {
    Anonymous,
    User(User),
}

impl Actor {
    pub fn require_user(self, req: &HttpRequest) -> Result<User, Error> {
        #[derive(Debug, Error)]
        #[error("Attempt to access user-only route")]
        struct Unauthorized;

        match self {
            Self::User(n) => Ok(n),
            Self::Anonymous => {
                let next = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_owned())
                    .unwrap_or_else(|| "/".to_owned());

                Err(Error::from_context(
                    types::Error::LoginRequired { next },
                    Unauthorized,
                ))
            }
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(n) => Some(n),
            Self::Anonymous => None,
        }
    }
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(ToOwned::to_owned);

        let Some(token) = token else {
            return Box::pin(ready(Ok(Actor::Anonymous)));
        };

        let Some(app) = req.app_data::<web::Data<App>>() else {
            #[derive(Debug, Error)]
            #[error("The web app has no available configuration")]
            struct NoConfig;
            return Box::pin(ready(Err(Error::from_context(
                types::Error::Internal,
                NoConfig,
            ))));
        };

        let app = app.clone();
        Box::pin(async move {
            // a malformed or re-signed token is simply a logged
            // out caller, not an error
            let jwt = match Jwt::decode(&token, app.config.jwt_secret.as_str()) {
                Ok(jwt) => jwt,
                Err(error) => {
                    tracing::debug!(report = ?error, "received an invalid bearer token");
                    return Ok(Actor::Anonymous);
                }
            };

            let mut conn = app.db_read_prefer_primary().await?;
            if let Some(user) = User::by_id(&mut *conn, jwt.user_id).await? {
                Ok(Actor::User(user))
            } else {
                Ok(Actor::Anonymous)
            }
        })
    }
}
