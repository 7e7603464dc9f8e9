pub mod factories;
pub mod processor_mocks;
pub mod store_mocks;
