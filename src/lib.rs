pub mod config;
pub mod credentials;
pub mod market;
pub mod models;
pub mod output;
pub mod portfolio;
pub mod sources;
