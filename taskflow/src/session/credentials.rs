//! Built-in credential and user-directory tables.
//!
//! These fixed tables are the only authentication backend. They are not
//! configurable.

use taskflow_proto::identity::{Identity, Role, UserId};

/// The single password accepted for every built-in account.
pub const SHARED_PASSWORD: &str = "password";

/// Display name used when a user ID is not in the directory.
pub const UNKNOWN_USER_NAME: &str = "Unknown";

/// Email-keyed table of known identities.
#[derive(Debug, Clone)]
pub struct CredentialTable {
    entries: Vec<Identity>,
    password: String,
}

impl CredentialTable {
    /// The three demo accounts: admin, manager and regular user.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = vec![
            Identity {
                id: UserId::new("1"),
                email: "admin@taskflow.com".to_string(),
                name: "Admin User".to_string(),
                role: Role::Admin,
                avatar: Some(
                    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face"
                        .to_string(),
                ),
            },
            Identity {
                id: UserId::new("2"),
                email: "manager@taskflow.com".to_string(),
                name: "Manager User".to_string(),
                role: Role::Manager,
                avatar: Some(
                    "https://images.unsplash.com/photo-1494790108755-2616b612b5bb?w=150&h=150&fit=crop&crop=face"
                        .to_string(),
                ),
            },
            Identity {
                id: UserId::new("3"),
                email: "user@taskflow.com".to_string(),
                name: "Regular User".to_string(),
                role: Role::RegularUser,
                avatar: Some(
                    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face"
                        .to_string(),
                ),
            },
        ];
        Self {
            entries,
            password: SHARED_PASSWORD.to_string(),
        }
    }

    /// Exact-match lookup by email.
    #[must_use]
    pub fn find(&self, email: &str) -> Option<&Identity> {
        self.entries.iter().find(|i| i.email == email)
    }

    /// Returns the identity for `email` if `password` is the shared secret.
    #[must_use]
    pub fn verify(&self, email: &str, password: &str) -> Option<&Identity> {
        self.find(email).filter(|_| password == self.password)
    }

    /// All known identities, in table order.
    #[must_use]
    pub fn entries(&self) -> &[Identity] {
        &self.entries
    }
}

/// ID → display-name lookup used to denormalize assignee names.
#[derive(Debug, Clone)]
pub struct Directory {
    users: Vec<(UserId, String)>,
}

impl Directory {
    /// Directory built from the built-in credential table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_identities(CredentialTable::builtin().entries())
    }

    /// Directory over an arbitrary identity list.
    #[must_use]
    pub fn from_identities(identities: &[Identity]) -> Self {
        Self {
            users: identities
                .iter()
                .map(|i| (i.id.clone(), i.name.clone()))
                .collect(),
        }
    }

    /// Display name for `id`, or `"Unknown"`.
    #[must_use]
    pub fn display_name(&self, id: &UserId) -> &str {
        self.users
            .iter()
            .find(|(uid, _)| uid == id)
            .map_or(UNKNOWN_USER_NAME, |(_, name)| name.as_str())
    }
}
