use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub tags: String,
}

/// Known persona names. Read-only once loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactRoster {
    contacts: Vec<Contact>,
}

impl ContactRoster {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self {
            contacts: contacts
                .into_iter()
                .filter(|c| !c.name.trim().is_empty())
                .collect(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|n| Contact {
                    name: n.into(),
                    ..Default::default()
                })
                .collect(),
        )
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True when `username` equals a contact name, or contains one,
    /// ignoring case.
    pub fn is_contact(&self, username: &str) -> bool {
        let username = username.to_lowercase();
        self.contacts.iter().any(|c| {
            let name = c.name.trim().to_lowercase();
            !name.is_empty() && (username == name || username.contains(&name))
        })
    }
}
