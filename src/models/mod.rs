//! Domain models for data returned by the Atlasnap API.

pub mod user;

pub use user::User;
