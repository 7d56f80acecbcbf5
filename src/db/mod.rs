//! Storage layer (file-backed JSON record sets).

pub mod store;

pub use store::JsonStore;

/// Record set names as constants.
pub mod sets {
    pub const USERS: &str = "users";
    pub const CARS: &str = "cars";
    /// Append-only audit log
    pub const AUDIT: &str = "audit";
}
