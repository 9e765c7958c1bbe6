pub mod api;
pub mod config;
pub mod delivery;
pub mod pipeline;
pub mod storage;
