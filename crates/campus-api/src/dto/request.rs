//! Request DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use campus_entity::user::RoleCode;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name.
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    /// Plaintext password.
    #[validate(length(min = 1))]
    pub password: String,
    /// The role to activate.
    pub role: RoleCode,
    /// The school to activate the role at; omitted selects a default.
    pub school_id: Option<Uuid>,
    /// Academic period to attach to the session.
    pub period_id: Option<Uuid>,
    /// Opaque client device token (push registration etc.).
    pub device_token: Option<String>,
}

/// Role-switch request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwitchRequest {
    /// The role to switch to.
    pub role: RoleCode,
    /// The school to activate the role at; omitted selects a default.
    pub school_id: Option<Uuid>,
    /// Academic period to attach to the new session.
    pub period_id: Option<Uuid>,
    /// Opaque client device token.
    pub device_token: Option<String>,
}

/// Bulk session revocation body. Omitting the body (or sending an empty
/// id list) revokes every session of the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeSessionsRequest {
    /// Ids of the caller's sessions to close.
    #[serde(default)]
    pub session_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            username: "alice".into(),
            password: "open sesame".into(),
            role: RoleCode::Teacher,
            school_id: None,
            period_id: None,
            device_token: None,
        };
        assert!(ok.validate().is_ok());

        let empty = LoginRequest {
            username: String::new(),
            ..ok
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_role_deserializes_lowercase() {
        let req: LoginRequest = serde_json::from_str(
            r#"{"username":"a","password":"b","role":"organization"}"#,
        )
        .unwrap();
        assert_eq!(req.role, RoleCode::Organization);
        assert!(req.school_id.is_none());
    }
}
