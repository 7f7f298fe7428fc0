use crate::domain::models::Task;

/// Insertion-ordered, unique-by-id mirror of the server's task list.
///
/// The collection has no authority: it only changes through the targeted
/// mutators below, each applied from a server-confirmed response.
/// `replace_task` and `remove_task` are idempotent; `add_task` appends
/// unconditionally and must be applied exactly once per successful
/// create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Replaces the task with the same id in place, preserving its
    /// position. A task that is not present is left alone.
    pub fn replace_task(&mut self, task: Task) -> bool {
        match self.tasks.iter().position(|existing| existing.id == task.id) {
            Some(index) => {
                self.tasks[index] = task;
                true
            }
            None => false,
        }
    }

    /// Removes the task with the given id, keeping the order of the
    /// remaining tasks.
    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        self.tasks.len() != before
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.get(task_id).is_some()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
