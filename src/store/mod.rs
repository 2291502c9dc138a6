//! Task storage.
//!
//! The store exclusively owns every [`Task`] for the lifetime of the
//! process. Callers only ever hold snapshots; all mutation goes through
//! [`TaskStore::update`] by identifier.

pub mod memory;

pub use memory::InMemoryTaskStore;

use crate::error::{StoreError, TransitionError};
use crate::models::{Task, TaskId};

/// Mutation applied to a task under the store's lock.
pub type TaskMutation<'a> = &'a mut (dyn FnMut(&mut Task) -> Result<(), TransitionError> + Send);

/// Storage for task records.
pub trait TaskStore: Send + Sync {
    /// Insert a new PENDING task for `subject` and return its snapshot.
    fn create(&self, subject: &str) -> Task;

    /// Current snapshot of a task.
    fn get(&self, id: &TaskId) -> Option<Task>;

    /// Apply `mutate` atomically and return the committed snapshot.
    ///
    /// If `mutate` fails, the stored record is left untouched.
    fn update(&self, id: &TaskId, mutate: TaskMutation<'_>) -> Result<Task, StoreError>;

    /// Snapshots of every task, in insertion order.
    fn list(&self) -> Vec<Task>;

    /// Most recently submitted task for `subject`.
    fn find_by_subject(&self, subject: &str) -> Option<Task>;
}
