use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of capabilities a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Clipteam,
    Editor,
    Uploader,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::User,
        Role::Clipteam,
        Role::Editor,
        Role::Uploader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Clipteam => "clipteam",
            Role::Editor => "editor",
            Role::Uploader => "uploader",
        }
    }

    /// Serialize a role list for the `users.roles` column.
    pub fn join(roles: &[Role]) -> String {
        roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse the `users.roles` column. Unknown entries are dropped.
    pub fn split(column: &str) -> Vec<Role> {
        column
            .split(',')
            .filter_map(|r| r.trim().parse().ok())
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown role `{s}`"))
    }
}

/// True when `held` and `required` share at least one role.
pub fn intersects(held: &[Role], required: &[Role]) -> bool {
    held.iter().any(|r| required.contains(r))
}
