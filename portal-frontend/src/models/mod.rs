pub mod api;
pub mod auth;
pub mod category;
pub mod organization;
pub mod profile;
pub mod roster;
pub mod session;
pub mod student;
pub mod template;
