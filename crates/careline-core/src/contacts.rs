//! Emergency contact directory.
//!
//! The directory is an ordered, read-only snapshot from the emergency
//! controller's point of view. Order matters: contacts are notified and
//! rendered in directory order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person to alert when an emergency escalates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub relationship: String,
}

impl EmergencyContact {
    /// Create a contact with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            relationship: relationship.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// First letter of each word of the name, e.g. "Sarah Johnson" -> "SJ".
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }
}

/// Ordered list of emergency contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactDirectory {
    contacts: Vec<EmergencyContact>,
}

impl ContactDirectory {
    pub fn new(contacts: Vec<EmergencyContact>) -> Self {
        Self { contacts }
    }

    /// Built-in sample directory used until the user configures their own.
    pub fn mock() -> Self {
        Self::new(vec![
            EmergencyContact {
                id: "1".into(),
                name: "Sarah Johnson".into(),
                phone: "+1 (555) 123-4567".into(),
                email: Some("sarah.johnson@email.com".into()),
                relationship: "Spouse".into(),
            },
            EmergencyContact {
                id: "2".into(),
                name: "Dr. Michael Chen".into(),
                phone: "+1 (555) 987-6543".into(),
                email: Some("dr.chen@healthclinic.com".into()),
                relationship: "Primary Physician".into(),
            },
            EmergencyContact {
                id: "3".into(),
                name: "Emily Davis".into(),
                phone: "+1 (555) 456-7890".into(),
                email: None,
                relationship: "Daughter".into(),
            },
        ])
    }

    pub fn contacts(&self) -> &[EmergencyContact] {
        &self.contacts
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmergencyContact> {
        self.contacts.iter()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&EmergencyContact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Append a contact at the end of the directory.
    pub fn push(&mut self, contact: EmergencyContact) {
        self.contacts.push(contact);
    }

    /// Remove a contact by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<EmergencyContact> {
        let idx = self.contacts.iter().position(|c| c.id == id)?;
        Some(self.contacts.remove(idx))
    }
}

impl From<Vec<EmergencyContact>> for ContactDirectory {
    fn from(contacts: Vec<EmergencyContact>) -> Self {
        Self::new(contacts)
    }
}

impl<'a> IntoIterator for &'a ContactDirectory {
    type Item = &'a EmergencyContact;
    type IntoIter = std::slice::Iter<'a, EmergencyContact>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_directory_is_ordered_and_non_empty() {
        let dir = ContactDirectory::mock();
        assert_eq!(dir.len(), 3);
        let names: Vec<_> = dir.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Sarah Johnson", "Dr. Michael Chen", "Emily Davis"]);
    }

    #[test]
    fn initials_take_first_letter_of_each_word() {
        let c = EmergencyContact::new("Sarah Johnson", "555", "Spouse");
        assert_eq!(c.initials(), "SJ");
        let c = EmergencyContact::new("Dr. Michael  Chen", "555", "Doctor");
        assert_eq!(c.initials(), "DMC");
    }

    #[test]
    fn new_contacts_get_distinct_ids() {
        let a = EmergencyContact::new("A", "1", "Friend");
        let b = EmergencyContact::new("A", "1", "Friend");
        assert_ne!(a.id, b.id);
        assert!(a.email.is_none());
        assert_eq!(a.with_email("a@example.com").email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn push_and_remove_preserve_order() {
        let mut dir = ContactDirectory::mock();
        let extra = EmergencyContact::new("Tom Baker", "555-0000", "Neighbor");
        let extra_id = extra.id.clone();
        dir.push(extra);
        assert_eq!(dir.len(), 4);
        assert_eq!(dir.contacts()[3].id, extra_id);

        let removed = dir.remove("2").unwrap();
        assert_eq!(removed.name, "Dr. Michael Chen");
        let ids: Vec<_> = dir.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "3", extra_id.as_str()]);
        assert!(dir.remove("2").is_none());
    }

    #[test]
    fn directory_serializes_as_plain_array() {
        let dir = ContactDirectory::new(vec![EmergencyContact {
            id: "x".into(),
            name: "X".into(),
            phone: "0".into(),
            email: None,
            relationship: "Friend".into(),
        }]);
        let json = serde_json::to_value(&dir).unwrap();
        assert!(json.is_array());
        assert!(json[0].get("email").is_none());
    }
}
