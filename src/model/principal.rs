use serde::{Deserialize, Serialize};

/// The acting user, as supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Lenient parse for header values; anything unknown is a plain user.
    pub fn from_header(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl Principal {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Ownership value written into documents this principal creates. Admin
    /// uploads are public, so they get the empty-string sentinel.
    pub fn owner_id(&self) -> String {
        match self.role {
            Role::Admin => String::new(),
            Role::User => self.id.clone(),
        }
    }
}

/// Ownership value for an optional principal; unauthenticated creation also
/// yields a public document.
pub fn owner_of(principal: Option<&Principal>) -> String {
    principal.map(Principal::owner_id).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_owns_nothing() {
        assert_eq!(Principal::admin("a1").owner_id(), "");
        assert_eq!(Principal::user("u1").owner_id(), "u1");
        assert_eq!(owner_of(None), "");
    }

    #[test]
    fn role_header_parse_is_lenient() {
        assert_eq!(Role::from_header("Admin"), Role::Admin);
        assert_eq!(Role::from_header("ADMIN"), Role::Admin);
        assert_eq!(Role::from_header("user"), Role::User);
        assert_eq!(Role::from_header("gibberish"), Role::User);
    }
}
