pub mod auth;
pub mod error;
pub mod feedback;
pub mod notification;
pub mod patient;
pub mod therapy;
pub mod user;
