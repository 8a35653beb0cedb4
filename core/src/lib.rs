pub mod config;
pub mod export;
pub mod ledger;
pub mod run;
pub mod scan;
pub mod session;

pub mod error;
