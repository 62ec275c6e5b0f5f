//! Role code enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of role codes a user may hold.
///
/// Scoped roles (student, parent, teacher, principal) map one-to-one to
/// stored [`RoleAssignment`](super::RoleAssignment) rows. Elevated roles
/// (organization, operator, admin) have their school scope computed from
/// the organization tree at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role_code", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoleCode {
    /// A pupil enrolled at a single school.
    Student,
    /// A guardian linked to one or more student accounts.
    Parent,
    /// Teaching staff, optionally owning a home classroom.
    Teacher,
    /// Head of a single school.
    Principal,
    /// Regional/district education authority staff.
    Organization,
    /// Platform operator with cross-school reach.
    Operator,
    /// Full system administrator.
    Admin,
}

impl RoleCode {
    /// Whether the school scope for this role is computed from the
    /// organization tree rather than read from stored assignments.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Organization | Self::Operator | Self::Admin)
    }

    /// Whether this role counts as administrative-class for reporting
    /// aggregation boundaries.
    pub fn is_administrative(&self) -> bool {
        matches!(
            self,
            Self::Admin | Self::Operator | Self::Organization | Self::Principal
        )
    }

    /// Whether single-device enforcement applies to this role when
    /// multi-device login is disabled.
    pub fn is_single_device_enforced(&self) -> bool {
        matches!(self, Self::Admin | Self::Organization | Self::Principal)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Parent => "parent",
            Self::Teacher => "teacher",
            Self::Principal => "principal",
            Self::Organization => "organization",
            Self::Operator => "operator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RoleCode {
    type Err = campus_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "parent" => Ok(Self::Parent),
            "teacher" => Ok(Self::Teacher),
            "principal" => Ok(Self::Principal),
            "organization" => Ok(Self::Organization),
            "operator" => Ok(Self::Operator),
            "admin" => Ok(Self::Admin),
            _ => Err(campus_core::AppError::validation(format!(
                "Invalid role code: '{s}'. Expected one of: student, parent, teacher, \
                 principal, organization, operator, admin"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_roles() {
        assert!(RoleCode::Organization.is_elevated());
        assert!(RoleCode::Operator.is_elevated());
        assert!(RoleCode::Admin.is_elevated());
        assert!(!RoleCode::Teacher.is_elevated());
        assert!(!RoleCode::Principal.is_elevated());
    }

    #[test]
    fn test_administrative_includes_principal() {
        assert!(RoleCode::Principal.is_administrative());
        assert!(!RoleCode::Principal.is_elevated());
        assert!(!RoleCode::Teacher.is_administrative());
    }

    #[test]
    fn test_single_device_set() {
        assert!(RoleCode::Admin.is_single_device_enforced());
        assert!(RoleCode::Organization.is_single_device_enforced());
        assert!(RoleCode::Principal.is_single_device_enforced());
        assert!(!RoleCode::Operator.is_single_device_enforced());
        assert!(!RoleCode::Student.is_single_device_enforced());
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert_eq!("teacher".parse::<RoleCode>().unwrap(), RoleCode::Teacher);
        assert_eq!("ADMIN".parse::<RoleCode>().unwrap(), RoleCode::Admin);
        assert!("superuser".parse::<RoleCode>().is_err());
        assert!("".parse::<RoleCode>().is_err());
    }
}
