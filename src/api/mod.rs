pub mod admin;
pub mod auth;
pub mod divisions;
pub mod forms;
pub mod lookups;
pub mod notifications;
pub mod time_keeping;
pub mod users;
