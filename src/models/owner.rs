use serde::{Deserialize, Serialize};

/// Who owns a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// The real person operating this terminal
    User,
    /// Simulated worker seeded to populate the shop
    Ghost,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::User => "user",
            OwnerKind::Ghost => "ghost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(OwnerKind::User),
            "ghost" => Some(OwnerKind::Ghost),
            _ => None,
        }
    }
}

/// Stage owner model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub initials: String,
    pub name: String,
    pub kind: OwnerKind,
}

impl Owner {
    pub fn new(initials: &str, name: &str, kind: OwnerKind) -> Self {
        Self {
            initials: initials.to_string(),
            name: name.to_string(),
            kind,
        }
    }

    /// The single real user of this prototype
    pub fn current_user() -> Self {
        Self::new("CQ", "Chris Quayle", OwnerKind::User)
    }

    /// Fixed roster of simulated workers, cycled by the ghost seeder
    pub fn ghost_roster() -> Vec<Owner> {
        vec![
            Self::new("DJ", "Dave Jones", OwnerKind::Ghost),
            Self::new("JS", "John Smith", OwnerKind::Ghost),
        ]
    }

    pub fn is_ghost(&self) -> bool {
        self.kind == OwnerKind::Ghost
    }

    /// True if this owner is the given real user
    pub fn is_user(&self, user: &Owner) -> bool {
        self.kind == OwnerKind::User && self.initials == user.initials
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_kind_conversion() {
        assert_eq!(OwnerKind::User.as_str(), "user");
        assert_eq!(OwnerKind::from_str("ghost"), Some(OwnerKind::Ghost));
        assert_eq!(OwnerKind::from_str("robot"), None);
    }

    #[test]
    fn test_owner_serializes_lowercase_kind() {
        let json = serde_json::to_string(&Owner::current_user()).unwrap();
        assert_eq!(json, r#"{"initials":"CQ","name":"Chris Quayle","kind":"user"}"#);
    }

    #[test]
    fn test_ghost_roster_is_all_ghosts() {
        let roster = Owner::ghost_roster();
        assert_eq!(roster.len(), 2);
        assert!(roster.iter().all(|o| o.is_ghost()));
        assert!(!roster[0].is_user(&Owner::current_user()));
    }

    #[test]
    fn test_first_name() {
        assert_eq!(Owner::current_user().first_name(), "Chris");
    }
}
