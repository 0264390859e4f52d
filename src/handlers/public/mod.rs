pub mod auth;
pub mod github;
pub mod users;
pub mod utils;
