//! Spawns the gateway on an ephemeral port.

use std::net::SocketAddr;

use autocollect::catalog::CatalogConnector;
use autocollect::{HandlerState, MockCatalog, MockConnector, create_router_with_state};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_ORIGIN: &str = "http://localhost:3000";

pub struct TestServerConfig {
    pub catalog: MockCatalog,
    pub require_store: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            catalog: super::fixtures::apparel_store(),
            require_store: false,
        }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
    let mut connector = MockConnector::new(config.catalog);
    if config.require_store {
        connector = connector.requiring_store();
    }
    spawn_with_connector(connector).await
}

pub async fn spawn_with_connector<K: CatalogConnector>(connector: K) -> anyhow::Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let app = create_router_with_state(HandlerState::new(connector), &[TEST_ORIGIN.to_string()]);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server exited: {e}");
        }
    });

    Ok(TestServer { addr, handle })
}
