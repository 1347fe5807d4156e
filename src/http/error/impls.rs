use actix_web::body::BoxBody;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use error_stack::Report;

use super::Error;
use crate::database;
use crate::types::Error as ErrorType;

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::ReadonlyMode => StatusCode::SERVICE_UNAVAILABLE,
            ErrorType::LoginRequired { .. } => StatusCode::FOUND,
            ErrorType::InvalidFormBody(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        if let ErrorType::LoginRequired { next } = &self.error_type {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, login_redirect(next)))
                .finish();
        }

        if matches!(self.error_type, ErrorType::Internal) {
            tracing::error!("{self}");
        }

        HttpResponse::build(self.status_code()).json(&self.error_type)
    }
}

/// Login URL carrying the original path, so the auth flow can
/// send the user back after signing in.
fn login_redirect(next: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("/auth/login/?{query}")
}

impl From<Report<database::Error>> for Error {
    fn from(value: Report<database::Error>) -> Self {
        match value.current_context() {
            database::Error::Readonly => Error::from_report(ErrorType::ReadonlyMode, value),
            _ => Error::from_report(ErrorType::Internal, value),
        }
    }
}

impl From<validator::ValidateError> for Error {
    fn from(value: validator::ValidateError) -> Self {
        #[derive(Debug, thiserror::Error)]
        #[error("Validation error occurred")]
        struct ValidateError;
        Error::from_context(ErrorType::InvalidFormBody(value), ValidateError)
    }
}
