//! Request field checks shared by the task and suggestion handlers.
//!
//! Failures become `invalid_request` errors whose `details` name the field
//! and a machine-readable reason, e.g.
//! `{"field": "title", "code": "empty_field"}`.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::Error;

/// JSON field name as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

enum FieldProblem<'a> {
    Missing,
    Empty,
    NotAUuid(&'a str),
}

impl FieldProblem<'_> {
    const fn code(&self) -> &'static str {
        match self {
            Self::Missing => "missing_field",
            Self::Empty => "empty_field",
            Self::NotAUuid(_) => "invalid_uuid",
        }
    }

    fn into_error(self, FieldName(field): FieldName) -> Error {
        let message = match self {
            Self::Missing => format!("missing required field: {field}"),
            Self::Empty => format!("{field} must not be empty"),
            Self::NotAUuid(_) => format!("{field} must be a valid UUID"),
        };
        let mut details = Map::new();
        details.insert("field".to_owned(), Value::from(field));
        details.insert("code".to_owned(), Value::from(self.code()));
        if let Self::NotAUuid(raw) = self {
            details.insert("value".to_owned(), Value::from(raw));
        }
        Error::invalid_request(message).with_details(Value::Object(details))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    FieldProblem::Missing.into_error(field)
}

pub(crate) fn empty_field_error(field: FieldName) -> Error {
    FieldProblem::Empty.into_error(field)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| FieldProblem::NotAUuid(value).into_error(field))
}

/// Deserialiser for `Option<Option<T>>` fields that must tell `null` apart
/// from absence. Pair with `#[serde(default)]`: absent stays `None`, `null`
/// becomes `Some(None)`.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "present")]
        due_date: Option<Option<String>>,
    }

    #[rstest]
    #[case(json!({}), None)]
    #[case(json!({"due_date": null}), Some(None))]
    #[case(json!({"due_date": "2025-05-01T00:00:00Z"}), Some(Some("2025-05-01T00:00:00Z".to_owned())))]
    fn present_distinguishes_null_from_absent(
        #[case] body: Value,
        #[case] expected: Option<Option<String>>,
    ) {
        let patch: Patch = serde_json::from_value(body).expect("valid patch");
        assert_eq!(patch.due_date, expected);
    }

    #[rstest]
    #[case(missing_field_error(FieldName::new("title")), "missing required field: title", "missing_field")]
    #[case(empty_field_error(FieldName::new("description")), "description must not be empty", "empty_field")]
    fn field_errors_name_field_and_reason(
        #[case] err: Error,
        #[case] message: &str,
        #[case] code: &str,
    ) {
        assert_eq!(err.message(), message);
        let details = err.details().expect("details");
        assert_eq!(details["code"], code);
        assert!(details.get("value").is_none());
    }

    #[rstest]
    fn invalid_uuid_echoes_value() {
        let err = parse_uuid("nope", FieldName::new("user_id")).expect_err("invalid");
        assert_eq!(err.message(), "user_id must be a valid UUID");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "user_id");
        assert_eq!(details["value"], "nope");
    }
}
