//! Demo account seeding for development and staging projects.

use crate::client::SupabaseDirectory;
use hub_session::{password, AuthError, AuthResult};
use hub_types::{Role, UserRecord};
use tracing::info;
use uuid::Uuid;

struct DemoAccount {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
    department: &'static str,
    position: &'static str,
}

const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        name: "Dana Director",
        email: "director@anvik-soft.com",
        password: "director123",
        role: Role::Director,
        department: "Executive",
        position: "Director of Operations",
    },
    DemoAccount {
        name: "Harper Reyes",
        email: "hr@anvik-soft.com",
        password: "hr123",
        role: Role::Hr,
        department: "Human Resources",
        position: "HR Specialist",
    },
    DemoAccount {
        name: "Morgan Lee",
        email: "manager@anvik-soft.com",
        password: "manager123",
        role: Role::Manager,
        department: "Development",
        position: "Team Lead",
    },
    DemoAccount {
        name: "Emery Quinn",
        email: "employee@anvik-soft.com",
        password: "employee123",
        role: Role::Employee,
        department: "Development",
        position: "Software Engineer",
    },
];

/// Build the demo account records with freshly hashed passwords.
pub fn demo_accounts() -> AuthResult<Vec<UserRecord>> {
    DEMO_ACCOUNTS
        .iter()
        .map(|account| {
            let hashed = password::hash(account.password)
                .map_err(|e| AuthError::Unexpected(e.to_string()))?;
            Ok(UserRecord {
                id: Uuid::new_v4().to_string(),
                name: account.name.to_string(),
                email: account.email.to_string(),
                password: hashed,
                role: account.role,
                department: Some(account.department.to_string()),
                position: Some(account.position.to_string()),
                avatar_url: None,
            })
        })
        .collect()
}

/// Create any demo account missing from the directory.
///
/// Existing accounts are left untouched, so repeated runs never rotate a
/// password out from under an active session.
pub async fn ensure_demo_accounts(directory: &SupabaseDirectory) -> AuthResult<()> {
    use hub_session::CredentialStore;

    for record in demo_accounts()? {
        if directory.find_by_email(&record.email).await?.is_some() {
            continue;
        }
        info!(email = %record.email, "Seeding demo account");
        directory.create_user(&record).await?;
    }
    Ok(())
}
