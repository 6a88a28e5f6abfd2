pub mod model;
pub mod service;

pub use model::{Project, ProjectInput, ProjectStatus};
pub use service::{ProjectDeletePolicy, ProjectService, PROJECT_TABLE};
