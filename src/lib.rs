pub mod config;
pub mod graph;
pub mod models;
pub mod notify;
pub mod storage;

pub mod api;
