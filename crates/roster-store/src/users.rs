use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::instrument;

use roster_core::{User, UserId, UserPatch};

use crate::error::StoreError;

/// The in-memory user collection plus its id-issuing counter.
///
/// One mutex guards the mapping and the counter together, so every
/// operation is atomic and operations on the same id are totally ordered.
/// The handle is cheap to clone and shares the underlying state.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    users: BTreeMap<UserId, User>,
    next_id: UserId,
}

impl UserStore {
    /// Create an empty store. The first issued id is 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                users: BTreeMap::new(),
                next_id: UserId::FIRST,
            })),
        }
    }

    /// Snapshot of all records, keyed by id.
    #[instrument(skip(self))]
    pub fn list(&self) -> BTreeMap<UserId, User> {
        self.inner.lock().users.clone()
    }

    /// Look up a single record.
    #[instrument(skip(self), fields(user_id = %id))]
    pub fn get(&self, id: UserId) -> Result<User, StoreError> {
        self.inner
            .lock()
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Insert a new record under the next free id and advance the counter.
    /// Both happen under one lock acquisition.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str, email: &str) -> (UserId, User) {
        let user = User {
            name: name.to_string(),
            email: email.to_string(),
        };

        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.users.insert(id, user.clone());
        inner.next_id = id.next();
        drop(inner);

        tracing::debug!(user_id = %id, "user created");
        (id, user)
    }

    /// Overwrite the fields present in the patch; absent fields keep their
    /// stored value. Returns the full updated record.
    #[instrument(skip(self, patch), fields(user_id = %id))]
    pub fn update(&self, id: UserId, patch: &UserPatch) -> Result<User, StoreError> {
        let mut inner = self.inner.lock();
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.apply(patch);
        let updated = user.clone();
        drop(inner);

        tracing::debug!(user_id = %id, "user updated");
        Ok(updated)
    }

    /// Remove a record. The counter is untouched; deleted ids are never
    /// reissued.
    #[instrument(skip(self), fields(user_id = %id))]
    pub fn delete(&self, id: UserId) -> Result<UserId, StoreError> {
        let removed = self.inner.lock().users.remove(&id);
        match removed {
            Some(_) => {
                tracing::debug!(user_id = %id, "user deleted");
                Ok(id)
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(name: Option<&str>, email: Option<&str>) -> UserPatch {
        UserPatch {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn create_assigns_ids_from_one() {
        let store = UserStore::new();
        let (id, user) = store.create("Bob", "b@x.com");
        assert_eq!(id, UserId::from_raw(1));
        assert_eq!(user.name, "Bob");
        assert_eq!(user.email, "b@x.com");
    }

    #[test]
    fn ids_are_unique_and_strictly_increasing() {
        let store = UserStore::new();
        let ids: Vec<UserId> = (0..10)
            .map(|i| store.create(&format!("u{i}"), &format!("u{i}@x.com")).0)
            .collect();
        for w in ids.windows(2) {
            assert!(w[0] < w[1], "not increasing: {} >= {}", w[0], w[1]);
        }
    }

    #[test]
    fn deleted_ids_are_never_reused() {
        let store = UserStore::new();
        let (first, _) = store.create("Bob", "b@x.com");
        store.delete(first).unwrap();
        let (second, _) = store.create("Carl", "c@x.com");
        assert_ne!(first, second);
        assert_eq!(second, UserId::from_raw(2));
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = UserStore::new();
        let (id, _) = store.create("Alice", "a@x.com");
        let fetched = store.get(id).unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.email, "a@x.com");
    }

    #[test]
    fn get_unknown_id_fails() {
        let store = UserStore::new();
        let err = store.get(UserId::from_raw(99)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(err.to_string(), "User with ID 99 not found");
    }

    #[test]
    fn update_name_only_keeps_email() {
        let store = UserStore::new();
        let (id, _) = store.create("Bob", "b@x.com");
        let updated = store.update(id, &patch(Some("Robert"), None)).unwrap();
        assert_eq!(updated.name, "Robert");
        assert_eq!(updated.email, "b@x.com");
    }

    #[test]
    fn update_email_only_keeps_name() {
        let store = UserStore::new();
        let (id, _) = store.create("Bob", "b@x.com");
        let updated = store.update(id, &patch(None, Some("bob@new.com"))).unwrap();
        assert_eq!(updated.name, "Bob");
        assert_eq!(updated.email, "bob@new.com");
        assert_eq!(store.get(id).unwrap().email, "bob@new.com");
    }

    #[test]
    fn empty_patch_leaves_record_unchanged() {
        let store = UserStore::new();
        let (id, original) = store.create("Bob", "b@x.com");
        let updated = store.update(id, &UserPatch::default()).unwrap();
        assert_eq!(updated, original);
    }

    #[test]
    fn update_unknown_id_fails_without_mutation() {
        let store = UserStore::new();
        store.create("Bob", "b@x.com");
        let err = store
            .update(UserId::from_raw(99), &patch(Some("X"), None))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(UserId::from_raw(1)).unwrap().name, "Bob");
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let store = UserStore::new();
        let (a, _) = store.create("Bob", "b@x.com");
        let (b, _) = store.create("Carl", "c@x.com");
        let deleted = store.delete(a).unwrap();
        assert_eq!(deleted, a);
        assert!(store.get(a).is_err());
        assert!(store.get(b).is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_unknown_id_always_fails_without_mutation() {
        let store = UserStore::new();
        store.create("Bob", "b@x.com");
        for _ in 0..3 {
            let err = store.delete(UserId::from_raw(42)).unwrap_err();
            assert!(matches!(err, StoreError::NotFound(_)));
            assert_eq!(store.len(), 1);
        }
    }

    #[test]
    fn list_snapshots_the_collection() {
        let store = UserStore::new();
        assert!(store.list().is_empty());
        let (a, _) = store.create("Bob", "b@x.com");
        let (b, _) = store.create("Carl", "c@x.com");
        let all = store.list();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&a].name, "Bob");
        assert_eq!(all[&b].name, "Carl");
    }

    #[test]
    fn clones_share_state() {
        let store = UserStore::new();
        let handle = store.clone();
        let (id, _) = store.create("Bob", "b@x.com");
        assert_eq!(handle.get(id).unwrap().name, "Bob");
        handle.delete(id).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_creates_issue_distinct_ids() {
        let store = UserStore::new();
        let mut handles = Vec::new();
        for t in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                (0..25)
                    .map(|i| store.create(&format!("u{t}-{i}"), "u@x.com").0)
                    .collect::<Vec<_>>()
            }));
        }
        let mut ids: Vec<UserId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(store.len(), 200);
    }
}
