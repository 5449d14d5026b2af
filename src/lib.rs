pub mod application;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

mod app;

pub use app::run;
