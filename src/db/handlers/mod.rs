pub mod repository;
pub mod submissions;
pub mod users;

pub use repository::Repository;
pub use submissions::Submissions;
pub use users::Users;
