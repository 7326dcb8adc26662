//! UUID helpers.

use thiserror::Error;
use uuid::{Uuid, Version};

/// Generates identifiers; swapped out in tests.
pub type GenV4Fn = fn() -> Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to generate UUID V4 from invalid value={0}")]
pub struct InvalidUuid(pub String);

pub fn gen_v4() -> Uuid {
    Uuid::new_v4()
}

/// Whether `value` parses as a UUID of any version.
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Parses the canonical hyphenated form of a version 4 UUID.
pub fn uuid_from_str(value: &str) -> Result<Uuid, InvalidUuid> {
    match Uuid::try_parse(value) {
        Ok(id) if value.len() == 36 && id.get_version() == Some(Version::Random) => Ok(id),
        _ => Err(InvalidUuid(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_v4() {
        let generator: GenV4Fn = gen_v4;
        let id = generator();
        assert_eq!(id.get_version(), Some(Version::Random));
        assert_eq!(uuid_from_str(&id.to_string()), Ok(id));
    }

    #[test]
    fn validation() {
        assert!(is_valid_uuid("c232ab00-9414-11ec-b3c8-9f6bdeced846"));
        assert!(!is_valid_uuid("not-a-uuid"));
    }

    #[test]
    fn uuid_from_str_requires_canonical_v4() {
        let v4 = "3f2504e0-4f89-41d3-9a0c-0305e82c3301";
        assert!(uuid_from_str(v4).is_ok());
        assert!(uuid_from_str(&v4.replace('-', "")).is_err());
        assert!(uuid_from_str("c232ab00-9414-11ec-b3c8-9f6bdeced846").is_err());

        let err = uuid_from_str("nope").unwrap_err();
        assert_eq!(err.to_string(), "Unable to generate UUID V4 from invalid value=nope");
    }
}
