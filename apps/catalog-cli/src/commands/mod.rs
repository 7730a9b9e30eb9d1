pub mod config;
pub mod products;
pub mod remote;
pub mod vendor;
