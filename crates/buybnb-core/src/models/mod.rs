//! Data models for BuyBnB entities.
//!
//! - `UserRecord`, `Credentials`, `LoginResponse`: identity and sign-in payloads
//! - `Property`: a listing as returned by the API
//! - `PropertyListing`: the display form of a listing used by the search page

pub mod property;
pub mod user;

pub use property::{Property, PropertyListing};
pub use user::{Credentials, LoginResponse, UserRecord};
