//! The claim set carried by a session token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_entity::user::RoleCode;

/// Claims embedded in a signed session token.
///
/// `school_id` and `period_id` are optional on the wire: an absent value
/// is encoded as the empty string so that every token carries the same
/// field set regardless of role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The authenticated user.
    pub user_id: Uuid,
    /// The role the session was resolved to.
    pub role_code: RoleCode,
    /// The school the role is scoped to, if any.
    #[serde(with = "uuid_or_empty")]
    pub school_id: Option<Uuid>,
    /// The academic period attached to the session, if any.
    #[serde(with = "uuid_or_empty")]
    pub period_id: Option<Uuid>,
    /// Expiry as a Unix timestamp in seconds.
    pub exp: i64,
}

/// Serializes `Option<Uuid>` as the UUID string or the empty string.
mod uuid_or_empty {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(value: &Option<Uuid>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => ser.serialize_str(&id.to_string()),
            None => ser.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Uuid>, D::Error> {
        let raw = String::deserialize(de)?;
        if raw.is_empty() {
            return Ok(None);
        }
        Uuid::parse_str(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_ids_serialize_as_empty_strings() {
        let claims = TokenClaims {
            user_id: Uuid::new_v4(),
            role_code: RoleCode::Student,
            school_id: None,
            period_id: None,
            exp: 1_900_000_000,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["school_id"], "");
        assert_eq!(json["period_id"], "");

        let back: TokenClaims = serde_json::from_value(json).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_set_ids_round_trip() {
        let claims = TokenClaims {
            user_id: Uuid::new_v4(),
            role_code: RoleCode::Admin,
            school_id: Some(Uuid::new_v4()),
            period_id: Some(Uuid::new_v4()),
            exp: 1_900_000_000,
        };
        let json = serde_json::to_string(&claims).unwrap();
        let back: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_garbage_uuid_rejected() {
        let raw = r#"{"user_id":"00000000-0000-0000-0000-000000000001",
            "role_code":"student","school_id":"not-a-uuid","period_id":"","exp":1900000000}"#;
        assert!(serde_json::from_str::<TokenClaims>(raw).is_err());
    }
}
