pub mod model;
pub mod service;

pub use model::{TeamMember, TeamMemberInput};
pub use service::{TeamService, TEAM_TABLE};
