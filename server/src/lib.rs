pub mod api;
pub mod http_server;
pub mod relay;
pub mod score_store;
