pub mod app_error;
pub mod normalizer;
pub mod ports;
pub mod signature;
pub mod state_machine;
pub mod use_cases;
