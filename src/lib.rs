pub mod bulk;
pub mod client;
pub mod config;
pub mod hanoi;
pub mod optimizer;
pub mod output;
pub mod scoring;
pub mod server;
pub mod storage;
pub mod strategy;
