pub mod error;
pub mod users;

pub use error::StoreError;
pub use users::UserStore;
