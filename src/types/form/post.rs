use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use super::TEXT_MAX;

/// Submission body for creating or editing a post.
///
/// `group` is an optional group slug; `image` is an opaque
/// reference to an already-uploaded file (upload storage is
/// outside of this service).
#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
}

impl Validate for Request {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("text", {
            let mut error = ValidateError::msg_builder();
            if self.text.trim().is_empty() {
                error.insert("Enter the post text");
            } else if self.text.len() > TEXT_MAX {
                error.insert("Post text is too long");
            }
            error.build()
        });

        if let Some(group) = self.group.as_deref() {
            fields.insert("group", {
                let mut error = ValidateError::msg_builder();
                if group.trim().is_empty() {
                    error.insert("Group slug must not be blank");
                }
                error.build()
            });
        }

        if let Some(image) = self.image.as_deref() {
            fields.insert("image", {
                let mut error = ValidateError::msg_builder();
                if image.trim().is_empty() {
                    error.insert("Image reference must not be blank");
                }
                error.build()
            });
        }

        fields.build().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn must_fail<T: Validate>(value: &T, args: std::fmt::Arguments<'_>) {
        if value.validate().is_ok() {
            panic!("expected to fail but passed (entry = {args})");
        }
    }

    #[test]
    fn test_text_field() {
        static INVALID_TEXTS: &[&str] = &["", "   ", "\t\n"];

        for text in INVALID_TEXTS {
            let form = Request {
                text: (*text).to_string(),
                group: None,
                image: None,
            };
            must_fail(&form, format_args!("{text:?}"));
        }

        let form = Request {
            text: "x".repeat(TEXT_MAX + 1),
            group: None,
            image: None,
        };
        assert!(form.validate().is_err());

        let form = Request {
            text: "Fresh out of the nest".to_string(),
            group: None,
            image: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_optional_fields() {
        let form = Request {
            text: "hello".to_string(),
            group: Some(String::new()),
            image: None,
        };
        assert!(form.validate().is_err());

        let form = Request {
            text: "hello".to_string(),
            group: Some("birds".to_string()),
            image: Some("posts/owl.png".to_string()),
        };
        assert!(form.validate().is_ok());
    }
}
