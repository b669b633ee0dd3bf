pub mod cli;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod session;
pub mod vault;
