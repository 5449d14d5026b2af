pub mod case;
pub mod error;
pub mod form;
pub mod llm_config;
pub mod normalize;
pub mod pet;
pub mod profile;
pub mod question;
