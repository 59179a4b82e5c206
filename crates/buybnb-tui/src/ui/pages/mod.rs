//! Page-specific content rendering.

pub mod home;
pub mod login;
pub mod profile;
pub mod search;
