//! In-memory task store.

use super::{TaskMutation, TaskStore};
use crate::error::{StoreError, UnknownTaskError};
use crate::models::{Task, TaskId};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Thread-safe in-memory task store.
///
/// Records are kept in insertion order so ranking can break ties by
/// submission time. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-applied record:
    // mutations run on a copy and are committed with a single assignment.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TaskStore for InMemoryTaskStore {
    fn create(&self, subject: &str) -> Task {
        let task = Task::new(subject);
        let mut state = self.write();
        let position = state.tasks.len();
        state.index.insert(task.id(), position);
        state.tasks.push(task.clone());
        debug!(task_id = %task.id(), subject, "task created");
        task
    }

    fn get(&self, id: &TaskId) -> Option<Task> {
        let state = self.read();
        state
            .index
            .get(id)
            .and_then(|&position| state.tasks.get(position))
            .cloned()
    }

    fn update(&self, id: &TaskId, mutate: TaskMutation<'_>) -> Result<Task, StoreError> {
        let mut state = self.write();
        let position = *state
            .index
            .get(id)
            .ok_or(UnknownTaskError(*id))?;
        let slot = state
            .tasks
            .get_mut(position)
            .ok_or(UnknownTaskError(*id))?;

        let mut next = slot.clone();
        mutate(&mut next)?;
        *slot = next.clone();
        Ok(next)
    }

    fn list(&self) -> Vec<Task> {
        self.read().tasks.clone()
    }

    fn find_by_subject(&self, subject: &str) -> Option<Task> {
        self.read()
            .tasks
            .iter()
            .rev()
            .find(|task| task.subject() == subject)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransitionError;
    use crate::models::TaskStatus;
    use std::sync::Arc;

    #[test]
    fn test_create_then_get() {
        let store = InMemoryTaskStore::new();
        let task = store.create("https://github.com/acme/widget");

        let fetched = store.get(&task.id()).unwrap();
        assert_eq!(fetched, task);
        assert_eq!(fetched.status(), TaskStatus::Pending);
    }

    #[test]
    fn test_get_unknown_id() {
        let store = InMemoryTaskStore::new();
        assert!(store.get(&TaskId::new()).is_none());
    }

    #[test]
    fn test_update_commits_all_fields_together() {
        let store = InMemoryTaskStore::new();
        let task = store.create("x");

        let updated = store
            .update(&task.id(), &mut |t| t.start("fetching documentation"))
            .unwrap();

        assert_eq!(updated.status(), TaskStatus::InProgress);
        assert_eq!(updated.message(), "fetching documentation");
        assert_eq!(store.get(&task.id()).unwrap(), updated);
    }

    #[test]
    fn test_failed_mutation_leaves_record_untouched() {
        let store = InMemoryTaskStore::new();
        let task = store.create("x");

        let err = store
            .update(&task.id(), &mut |t| {
                t.start("half way")?;
                Err(TransitionError {
                    from: TaskStatus::InProgress,
                    to: TaskStatus::Success,
                })
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::Transition(_)));
        assert_eq!(store.get(&task.id()).unwrap(), task);
    }

    #[test]
    fn test_update_unknown_id() {
        let store = InMemoryTaskStore::new();
        let id = TaskId::new();
        let err = store.update(&id, &mut |t| t.start("x")).unwrap_err();
        assert_eq!(err, StoreError::UnknownTask(UnknownTaskError(id)));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = InMemoryTaskStore::new();
        let first = store.create("a");
        let second = store.create("b");
        let third = store.create("c");

        let ids: Vec<_> = store.list().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![first.id(), second.id(), third.id()]);
    }

    #[test]
    fn test_find_by_subject_returns_latest() {
        let store = InMemoryTaskStore::new();
        store.create("a");
        let latest = store.create("a");
        store.create("b");

        assert_eq!(store.find_by_subject("a").unwrap().id(), latest.id());
        assert!(store.find_by_subject("missing").is_none());
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let store = InMemoryTaskStore::new();
        let task = store.create("x");
        assert_eq!(store.get(&task.id()), store.get(&task.id()));
    }

    #[test]
    fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(InMemoryTaskStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.create(&format!("repo-{}", i)).id())
            })
            .collect();

        let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.list().len(), 8);
    }
}
