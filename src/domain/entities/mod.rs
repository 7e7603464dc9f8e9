pub mod ledger;
pub mod subscription;
pub mod webhook;
