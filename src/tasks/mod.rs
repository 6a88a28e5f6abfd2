pub mod model;
pub mod service;

pub use model::{Priority, Task, TaskInput, TaskStatus};
pub use service::{TaskService, TASK_TABLE};
