use serde::ser::SerializeMap;
use serde::Serialize;
use thiserror::Error;
use validator::ValidateError;

/// Client-facing error taxonomy.
///
/// Every HTTP error the service can emit boils down to one of
/// these. [`LoginRequired`](Error::LoginRequired) is special: it
/// renders as a redirect to the login flow instead of an error
/// body, carrying the original path in the `next` parameter.
#[derive(Debug, Error)]
pub enum Error {
    #[error("internal server error")]
    Internal,
    #[error("requested resource was not found")]
    NotFound,
    #[error("database is currently in read-only mode")]
    ReadonlyMode,
    #[error("authentication required")]
    LoginRequired { next: String },
    #[error("submitted form is invalid")]
    InvalidFormBody(ValidateError),
}

impl Error {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::NotFound => "not_found",
            Self::ReadonlyMode => "readonly_mode",
            Self::LoginRequired { .. } => "login_required",
            Self::InvalidFormBody(..) => "invalid_form_body",
        }
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("code", self.code())?;
        map.serialize_entry("message", &self.to_string())?;
        match self {
            Self::InvalidFormBody(errors) => {
                map.serialize_entry("errors", errors)?;
            }
            Self::LoginRequired { next } => {
                map.serialize_entry("next", next)?;
            }
            _ => {}
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_code_and_message() {
        let json = serde_json::to_value(Error::NotFound).unwrap();
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["message"], "requested resource was not found");
    }

    #[test]
    fn form_errors_are_embedded() {
        let mut msg = ValidateError::msg_builder();
        msg.insert("Enter the post text");

        let mut fields = ValidateError::field_builder();
        fields.insert("text", msg.build());

        let json = serde_json::to_value(Error::InvalidFormBody(fields.build())).unwrap();
        assert_eq!(json["code"], "invalid_form_body");
        assert_eq!(json["errors"]["text"]["_errors"][0], "Enter the post text");
    }
}
