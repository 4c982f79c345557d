pub mod analytics;
pub mod api;
pub mod config;
pub mod generator;
pub mod models;
pub mod redirect;
pub mod storage;
pub mod sweeper;
