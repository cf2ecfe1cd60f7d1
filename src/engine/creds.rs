// src/engine/creds.rs
use std::fmt;

use serde::Serialize;

/// One username/password combination. Immutable once enqueued; duplicates
/// are legal and are each attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialPair {
    pub username: String,
    pub password: String,
}

impl CredentialPair {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        CredentialPair {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Display for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.password)
    }
}

/// Produces the finite, one-shot stream of pairs for a run: either an
/// explicit ordered list, or the username-major cross product of a user
/// list and a password list (all passwords for user one, then user two, so
/// likelihood-sorted wordlists surface default accounts early).
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Pairs(Vec<CredentialPair>),
    Product {
        users: Vec<String>,
        passwords: Vec<String>,
    },
}

impl CredentialSource {
    /// Number of pairs the source will yield.
    pub fn len(&self) -> usize {
        match self {
            CredentialSource::Pairs(pairs) => pairs.len(),
            CredentialSource::Product { users, passwords } => users.len() * passwords.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy iteration in deterministic order. The source itself never
    /// retries a pair; retries must be pre-expanded into the input.
    pub fn iter(&self) -> Box<dyn Iterator<Item = CredentialPair> + '_> {
        match self {
            CredentialSource::Pairs(pairs) => Box::new(pairs.iter().cloned()),
            CredentialSource::Product { users, passwords } => Box::new(users.iter().flat_map(
                move |user| {
                    passwords
                        .iter()
                        .map(move |password| CredentialPair::new(user.clone(), password.clone()))
                },
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_is_username_major() {
        let source = CredentialSource::Product {
            users: vec!["a".into(), "b".into()],
            passwords: vec!["1".into(), "2".into(), "3".into()],
        };
        let order: Vec<String> = source.iter().map(|p| p.to_string()).collect();
        assert_eq!(order, vec!["a:1", "a:2", "a:3", "b:1", "b:2", "b:3"]);
        assert_eq!(source.len(), 6);
    }

    #[test]
    fn pairs_keep_given_order_and_duplicates() {
        let source = CredentialSource::Pairs(vec![
            CredentialPair::new("admin", "admin"),
            CredentialPair::new("admin", "admin"),
            CredentialPair::new("root", "toor"),
        ]);
        assert_eq!(source.len(), 3);
        let order: Vec<String> = source.iter().map(|p| p.to_string()).collect();
        assert_eq!(order, vec!["admin:admin", "admin:admin", "root:toor"]);
    }

    #[test]
    fn empty_lists_are_empty() {
        let source = CredentialSource::Product {
            users: vec!["a".into()],
            passwords: vec![],
        };
        assert!(source.is_empty());
    }
}
