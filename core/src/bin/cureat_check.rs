use std::sync::Arc;

use cureat_core::{
    ApiError, AuthSession, BackendConfig, BackendLocator, FileStore, KeyValueStore, MemoryStore, ReqwestTransport,
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let probe_all = std::env::args().skip(1).any(|arg| arg == "--probe");

    let config = BackendConfig::from_env();
    let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
    let locator = BackendLocator::new(config, transport);

    if probe_all {
        for candidate in &locator.config().candidates {
            let reachable = locator.test_connection(candidate).await;
            println!("{candidate}\t{}", if reachable { "reachable" } else { "unreachable" });
        }
    }

    let endpoint = locator.resolve().await;
    println!("backend: {} ({:?})", endpoint.base_url, endpoint.source);

    let store: Arc<dyn KeyValueStore> = match FileStore::default_location() {
        Some(path) => Arc::new(FileStore::new(path)),
        None => {
            warn!("no data directory on this platform, session will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let session = AuthSession::new(locator.client().await, store);
    println!("session: {:?}", session.restore().await);
    Ok(())
}
