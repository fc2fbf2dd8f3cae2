//! Journal records and their store

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// A journal entry. Only `title` and `content` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    pub id: u64,
    pub title: String,
    pub content: String,
    /// Username of the creator
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to store a journal except its id
#[derive(Debug, Clone)]
pub struct NewJournal {
    pub title: String,
    pub content: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// Storage for journal records.
///
/// `insert` assigns ids and must never hand out the same id twice, even
/// after deletes. `update_owned` and `delete_owned` check ownership and
/// mutate as one step, failing with [`Error::NotFound`] or
/// [`Error::Forbidden`] without touching the record.
#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn insert(&self, journal: NewJournal) -> Result<Journal>;

    async fn find_by_id(&self, id: u64) -> Result<Option<Journal>>;

    /// All records owned by `owner`, in insertion order
    async fn filter_by_owner(&self, owner: &str) -> Result<Vec<Journal>>;

    async fn update_owned(
        &self,
        id: u64,
        owner: &str,
        title: String,
        content: String,
    ) -> Result<Journal>;

    /// Remove the record and return it
    async fn delete_owned(&self, id: u64, owner: &str) -> Result<Journal>;
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    // Ids only grow, so key order is insertion order
    journals: BTreeMap<u64, Journal>,
}

/// Volatile, process-local journal store
#[derive(Debug)]
pub struct InMemoryJournalStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryJournalStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                journals: BTreeMap::new(),
            }),
        }
    }
}

impl InMemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_owner<'a>(journal: Option<&'a mut Journal>, owner: &str) -> Result<&'a mut Journal> {
    let journal = journal.ok_or(Error::NotFound)?;
    if journal.owner != owner {
        return Err(Error::Forbidden);
    }
    Ok(journal)
}

#[async_trait]
impl JournalStore for InMemoryJournalStore {
    async fn insert(&self, journal: NewJournal) -> Result<Journal> {
        let mut inner = self.inner.write().await;

        let id = inner.next_id;
        inner.next_id = id
            .checked_add(1)
            .ok_or_else(|| Error::internal("Journal id space exhausted"))?;

        let journal = Journal {
            id,
            title: journal.title,
            content: journal.content,
            owner: journal.owner,
            created_at: journal.created_at,
        };
        inner.journals.insert(id, journal.clone());

        Ok(journal)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Journal>> {
        Ok(self.inner.read().await.journals.get(&id).cloned())
    }

    async fn filter_by_owner(&self, owner: &str) -> Result<Vec<Journal>> {
        Ok(self
            .inner
            .read()
            .await
            .journals
            .values()
            .filter(|j| j.owner == owner)
            .cloned()
            .collect())
    }

    async fn update_owned(
        &self,
        id: u64,
        owner: &str,
        title: String,
        content: String,
    ) -> Result<Journal> {
        let mut inner = self.inner.write().await;
        let journal = check_owner(inner.journals.get_mut(&id), owner)?;

        journal.title = title;
        journal.content = content;

        Ok(journal.clone())
    }

    async fn delete_owned(&self, id: u64, owner: &str) -> Result<Journal> {
        let mut inner = self.inner.write().await;
        check_owner(inner.journals.get_mut(&id), owner)?;

        inner.journals.remove(&id).ok_or(Error::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn new_journal(owner: &str, title: &str) -> NewJournal {
        NewJournal {
            title: title.to_string(),
            content: format!("{} content", title),
            owner: owner.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let store = InMemoryJournalStore::new();
        let a = store.insert(new_journal("alice", "a")).await.unwrap();
        let b = store.insert(new_journal("bob", "b")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let store = InMemoryJournalStore::new();
        store.insert(new_journal("alice", "a")).await.unwrap();
        let second = store.insert(new_journal("alice", "b")).await.unwrap();

        store.delete_owned(second.id, "alice").await.unwrap();
        let third = store.insert(new_journal("alice", "c")).await.unwrap();

        assert_eq!(third.id, 3);
        assert_eq!(store.find_by_id(second.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filter_by_owner_keeps_insertion_order() {
        let store = InMemoryJournalStore::new();
        store.insert(new_journal("alice", "first")).await.unwrap();
        store.insert(new_journal("bob", "theirs")).await.unwrap();
        store.insert(new_journal("alice", "second")).await.unwrap();

        let titles: Vec<String> = store
            .filter_by_owner("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_update_owned_changes_only_title_and_content() {
        let store = InMemoryJournalStore::new();
        let original = store.insert(new_journal("alice", "draft")).await.unwrap();

        let updated = store
            .update_owned(original.id, "alice", "final".into(), "done".into())
            .await
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.owner, original.owner);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.title, "final");
        assert_eq!(updated.content, "done");
    }

    #[tokio::test]
    async fn test_non_owner_cannot_update_or_delete() {
        let store = InMemoryJournalStore::new();
        let journal = store.insert(new_journal("alice", "private")).await.unwrap();

        let err = store
            .update_owned(journal.id, "bob", "x".into(), "y".into())
            .await
            .unwrap_err();
        assert_eq!(err, Error::Forbidden);

        let err = store.delete_owned(journal.id, "bob").await.unwrap_err();
        assert_eq!(err, Error::Forbidden);

        // Untouched
        assert_eq!(store.find_by_id(journal.id).await.unwrap(), Some(journal));
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let store = InMemoryJournalStore::new();
        assert_eq!(
            store
                .update_owned(42, "alice", "x".into(), "y".into())
                .await
                .unwrap_err(),
            Error::NotFound
        );
        assert_eq!(
            store.delete_owned(42, "alice").await.unwrap_err(),
            Error::NotFound
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(InMemoryJournalStore::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(new_journal("alice", &format!("entry {}", i)))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, (1..=50).collect::<Vec<u64>>());
    }
}
