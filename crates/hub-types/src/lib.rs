//! Shared data model for the Skills Hub session core.
//!
//! These types cross crate boundaries (session manager, storage slot,
//! directory client) and serialization-sensitive surfaces: `UserProfile`
//! matches the persisted session-slot format, `UserRecord` matches the
//! hosted `users` table row.

use serde::{Deserialize, Serialize};

/// Portal role. Access checks are role-exact, never hierarchical.
///
/// `Hr` is part of the enumeration even though most protected views only
/// name the other three roles; the seed data and the login screen both
/// carry an hr account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    Director,
    Hr,
}

impl Role {
    /// The wire/storage spelling of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Director => "director",
            Role::Hr => "hr",
        }
    }
}

/// The authenticated identity, as persisted in the session slot and shown
/// to downstream consumers.
///
/// Serialized camelCase; this is the exact shape the web client stores, so
/// a slot written by either side parses on the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Opaque identifier assigned by the credential store at account creation.
    pub id: String,
    /// Display name, non-empty.
    pub name: String,
    /// Unique login identifier.
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// A row of the hosted `users` table (the credential store).
///
/// `password` holds an argon2 PHC string for rows written by this code;
/// legacy rows may still hold plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            role: record.role,
            department: record.department.unwrap_or_default(),
            position: record.position.unwrap_or_default(),
            avatar_url: record.avatar_url.unwrap_or_default(),
        }
    }
}

/// Consumer-facing view of the session.
///
/// Exactly one of three shapes is ever produced: loading
/// `(false, None, true)`, settled unauthenticated `(false, None, false)`,
/// or settled authenticated `(true, Some(profile), false)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    /// True once startup reconciliation, login, or logout has settled.
    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> UserRecord {
        UserRecord {
            id: "u-17".to_string(),
            name: "Anna Petrova".to_string(),
            email: "anna@anvik-soft.com".to_string(),
            password: "$argon2id$fake".to_string(),
            role: Role::Manager,
            department: Some("QA".to_string()),
            position: None,
            avatar_url: None,
        }
    }

    #[test]
    fn role_serde_is_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"employee\"");
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"hr\"");

        let role: Role = serde_json::from_str("\"director\"").unwrap();
        assert_eq!(role, Role::Director);
    }

    #[test]
    fn role_as_str_matches_serde() {
        for role in [Role::Employee, Role::Manager, Role::Director, Role::Hr] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn profile_from_record_drops_password_and_defaults_optionals() {
        let profile = UserProfile::from(sample_record());

        assert_eq!(profile.id, "u-17");
        assert_eq!(profile.role, Role::Manager);
        assert_eq!(profile.department, "QA");
        assert_eq!(profile.position, "");
        assert_eq!(profile.avatar_url, "");

        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"), "password must never reach the profile");
    }

    #[test]
    fn profile_serde_is_camel_case() {
        let profile = UserProfile::from(sample_record());
        let json = serde_json::to_string(&profile).unwrap();

        assert!(json.contains("\"avatarUrl\""));
        assert!(!json.contains("avatar_url"));

        let roundtrip: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, profile);
    }

    #[test]
    fn profile_parses_web_client_slot_format() {
        // Shape written by the web client into its local slot.
        let json = r#"{
            "id": "42",
            "name": "Ivan Orlov",
            "email": "ivan@anvik-soft.com",
            "role": "employee",
            "department": "",
            "position": "",
            "avatarUrl": ""
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.role, Role::Employee);
        assert_eq!(profile.name, "Ivan Orlov");
    }

    #[test]
    fn record_serde_is_snake_case() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"avatar_url\""));

        let parsed: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.email, record.email);
    }

    #[test]
    fn record_parses_row_without_optional_columns() {
        let json = r#"{
            "id": "7",
            "name": "HR",
            "email": "hr@anvik-soft.com",
            "password": "hr123",
            "role": "hr"
        }"#;

        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.role, Role::Hr);
        assert!(record.department.is_none());
    }

    #[test]
    fn snapshot_settled() {
        let loading = SessionSnapshot {
            is_authenticated: false,
            user: None,
            is_loading: true,
        };
        assert!(!loading.is_settled());

        let settled = SessionSnapshot {
            is_authenticated: false,
            user: None,
            is_loading: false,
        };
        assert!(settled.is_settled());
    }
}
