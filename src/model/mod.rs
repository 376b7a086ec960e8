pub mod division;
pub mod form;
pub mod lookup;
pub mod notification;
pub mod page;
pub mod time_keeping;
pub mod user;
