pub mod diagnose;
pub mod pets;
pub mod profile;
