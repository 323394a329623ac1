use serde::{Deserialize, Serialize};

/// A stored user record.
///
/// The id is not part of the record itself; it is the key under which the
/// store holds it, and endpoints report it alongside when relevant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

/// Partial update to a user record. Fields absent from the payload leave
/// the stored value untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// True when applying the patch changes nothing.
    pub fn is_noop(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

impl User {
    /// Overwrite exactly the fields present in the patch.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
    }
}
