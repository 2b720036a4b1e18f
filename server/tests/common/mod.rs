pub mod test_client;
pub mod test_server;

pub use test_client::TestClient;
pub use test_server::TestServer;
