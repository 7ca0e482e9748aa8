//! Institutional identities and the closed role set

/// The fixed set of institutional roles. Assignment happens in the identity
/// provider; a role is immutable for the lifetime of a session.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    #[n(0)]
    Employee,
    #[n(1)]
    Hod,
    #[n(2)]
    Dean,
    #[n(3)]
    CampusAdmin,
    #[n(4)]
    FinancialManager,
    #[n(5)]
    Principal,
    #[n(6)]
    Vc,
    #[n(7)]
    Hr,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Employee,
        Role::Hod,
        Role::Dean,
        Role::CampusAdmin,
        Role::FinancialManager,
        Role::Principal,
        Role::Vc,
        Role::Hr,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Hod => "Head of Department",
            Role::Dean => "Dean",
            Role::CampusAdmin => "Campus Admin",
            Role::FinancialManager => "Financial Manager",
            Role::Principal => "Principal",
            Role::Vc => "Vice Chancellor",
            Role::Hr => "Human Resources",
        }
    }
}

/// An already-authenticated caller as supplied by the identity provider.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    #[n(0)]
    pub id: String, // uuid7, bech32 encoded
    #[n(1)]
    pub full_name: String,
    #[n(2)]
    pub email: String,
    #[n(3)]
    pub department: String,
    #[n(4)]
    pub role: Role,
}

impl Actor {
    pub fn new(
        id: String,
        full_name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: email.into(),
            department: department.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_encoding() {
        let original = Actor::new(
            "user_1abc".to_string(),
            "Asha Rahman",
            "asha@example.edu",
            "Physics",
            Role::Hod,
        );

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: Actor = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }
}
