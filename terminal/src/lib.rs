pub mod app;
pub mod presenter;
pub mod relay_client;
pub mod scores;
pub mod storage;
pub mod ui;
