use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateError};

use super::TEXT_MAX;

#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
    pub text: String,
}

impl Validate for Request {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("text", {
            let mut error = ValidateError::msg_builder();
            if self.text.trim().is_empty() {
                error.insert("Enter the comment text");
            } else if self.text.len() > TEXT_MAX {
                error.insert("Comment text is too long");
            }
            error.build()
        });

        fields.build().into_result()
    }
}
