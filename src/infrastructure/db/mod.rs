pub mod cases;
pub mod pets;
pub mod profiles;
pub mod sqlite;
