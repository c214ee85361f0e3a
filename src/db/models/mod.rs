pub mod submissions;
pub mod users;
