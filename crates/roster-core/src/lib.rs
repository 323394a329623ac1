pub mod ids;
pub mod users;

pub use ids::UserId;
pub use users::{User, UserPatch};
