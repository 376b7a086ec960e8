pub mod accounts;
pub mod directory;
pub mod notifications;
pub mod time_keeping;
pub mod workflow;
