use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::Serialize;
use std::borrow::Cow;

/// A tree of validation failures.
///
/// Leaves are plain messages; branches map field names to the
/// failures of that field. An empty tree means the data passed.
#[derive(PartialEq, Eq)]
pub enum ValidateError {
    Fields(IndexMap<Cow<'static, str>, ValidateError>),
    Messages(Vec<Cow<'static, str>>),
}

impl ValidateError {
    #[must_use]
    pub fn field_builder() -> FieldBuilder {
        FieldBuilder(IndexMap::default())
    }

    #[must_use]
    pub fn msg_builder() -> MessageBuilder {
        MessageBuilder(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            ValidateError::Fields(n) => n.is_empty(),
            ValidateError::Messages(n) => n.is_empty(),
        }
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub struct MessageBuilder(Vec<Cow<'static, str>>);

impl MessageBuilder {
    pub fn insert(&mut self, message: impl Into<Cow<'static, str>>) {
        self.0.push(message.into());
    }

    #[must_use]
    pub fn build(self) -> ValidateError {
        ValidateError::Messages(self.0)
    }
}

pub struct FieldBuilder(IndexMap<Cow<'static, str>, ValidateError>);

impl FieldBuilder {
    /// Empty values are discarded so that passing fields do not
    /// show up in the final error.
    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: ValidateError) {
        if !value.is_empty() {
            self.0.insert(key.into(), value);
        }
    }

    #[must_use]
    pub fn build(self) -> ValidateError {
        ValidateError::Fields(self.0)
    }
}

impl std::fmt::Display for ValidateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid data submitted")
    }
}

impl std::error::Error for ValidateError {}

impl std::fmt::Debug for ValidateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidateError::Fields(n) => n.fmt(f),
            ValidateError::Messages(n) => f.debug_map().entry(&"_errors", &n).finish(),
        }
    }
}

impl Serialize for ValidateError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ValidateError::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ValidateError::Messages(messages) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("_errors", messages)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_discarded() {
        let mut fields = ValidateError::field_builder();
        fields.insert("text", ValidateError::msg_builder().build());
        assert!(fields.build().into_result().is_ok());
    }

    #[test]
    fn non_empty_messages_fail() {
        let mut msg = ValidateError::msg_builder();
        msg.insert("Enter some text");

        let mut fields = ValidateError::field_builder();
        fields.insert("text", msg.build());

        let error = fields.build().into_result().unwrap_err();
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["text"]["_errors"][0], "Enter some text");
    }
}
