pub mod use_cases;

pub use use_cases::diagnose::DiagnoseUseCase;
pub use use_cases::pets::PetsUseCase;
pub use use_cases::profile::{CurrentUser, ProfileUseCase, ProfileView};
