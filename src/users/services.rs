use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

use super::dto::{CreateUserRequest, UpdateUserRequest, USER_FIELDS};

/// Checks that `candidate` is a hyphenated RFC 4122 UUID (any version 1-8,
/// plus the nil and max values) and returns it parsed.
pub fn parse_user_id(candidate: &str) -> Result<Uuid, ApiError> {
    lazy_static! {
        static ref UUID_RE: Regex = Regex::new(
            r"(?i)^(?:[0-9a-f]{8}-[0-9a-f]{4}-[1-8][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}|00000000-0000-0000-0000-000000000000|ffffffff-ffff-ffff-ffff-ffffffffffff)$"
        )
        .unwrap();
    }
    if !UUID_RE.is_match(candidate) {
        return Err(ApiError::InvalidIdentifier);
    }
    Uuid::parse_str(candidate).map_err(|_| ApiError::InvalidIdentifier)
}

/// JSON truthiness: `null`, `false`, `0` and `""` count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reports every entry of `required` that is absent or falsy in `record`,
/// in the order given.
pub fn check_required(record: &Map<String, Value>, required: &[&str]) -> Result<(), ApiError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|field| !record.get(**field).is_some_and(is_truthy))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::MissingFields(missing))
    }
}

fn field<T: DeserializeOwned>(record: &Map<String, Value>, name: &str) -> Result<Option<T>, ApiError> {
    match record.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ApiError::MalformedBody(format!("Field \"{name}\": {e}."))),
    }
}

/// Validates a create body: all user fields present, then each well typed.
pub fn decode_create(record: &Map<String, Value>) -> Result<CreateUserRequest, ApiError> {
    check_required(record, &USER_FIELDS)?;
    let missing = |name: &str| ApiError::MissingFields(vec![name.to_string()]);
    Ok(CreateUserRequest {
        username: field(record, "username")?.ok_or_else(|| missing("username"))?,
        age: field(record, "age")?.ok_or_else(|| missing("age"))?,
        hobbies: field(record, "hobbies")?.ok_or_else(|| missing("hobbies"))?,
    })
}

/// Picks the recognized user fields out of an update body. `id` and anything
/// else the client sends is dropped.
pub fn decode_update(record: &Map<String, Value>) -> Result<UpdateUserRequest, ApiError> {
    Ok(UpdateUserRequest {
        username: field(record, "username")?,
        age: field(record, "age")?,
        hobbies: field(record, "hobbies")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn accepts_generated_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn accepts_uppercase_and_nil() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string().to_uppercase()).unwrap(), id);
        assert_eq!(
            parse_user_id("00000000-0000-0000-0000-000000000000").unwrap(),
            Uuid::nil()
        );
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in [
            "",
            "123",
            "not-a-uuid",
            "6f9619ff8b86d011b42d00c04fc964ff",
            "{6f9619ff-8b86-4011-b42d-00c04fc964ff}",
            "6f9619ff-8b86-0011-b42d-00c04fc964ff",
            "6f9619ff-8b86-4011-c42d-00c04fc964ff",
            "6f9619ff-8b86-4011-b42d-00c04fc964ff0",
        ] {
            assert!(
                matches!(parse_user_id(bad), Err(ApiError::InvalidIdentifier)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn truthiness_matches_json_falsy_values() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-1)));
    }

    #[test]
    fn check_required_reports_all_missing_in_order() {
        let record = object(json!({ "username": "bob", "age": 0 }));
        match check_required(&record, &USER_FIELDS) {
            Err(ApiError::MissingFields(fields)) => assert_eq!(fields, vec!["age", "hobbies"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn check_required_passes_complete_record() {
        let record = object(json!({ "username": "bob", "age": 3, "hobbies": [] }));
        assert!(check_required(&record, &USER_FIELDS).is_ok());
    }

    #[test]
    fn decode_create_rejects_wrong_types() {
        let record = object(json!({ "username": "bob", "age": "old", "hobbies": ["x"] }));
        match decode_create(&record) {
            Err(ApiError::MalformedBody(msg)) => assert!(msg.contains("\"age\""), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_update_drops_id_and_unknown_keys() {
        let record = object(json!({ "id": "abc", "age": 27, "extra": true }));
        let patch = decode_update(&record).unwrap();
        assert_eq!(patch.age, Some(27));
        assert!(patch.username.is_none());
        assert!(patch.hobbies.is_none());
    }
}
