use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::{AppState, create_router};
use crate::catalog::CatalogClient;
use crate::database::LedgerStore;

pub struct ServerService<L, C> {
    port: u16,
    state: Arc<AppState<L, C>>,
}

impl<L, C> ServerService<L, C>
where
    L: LedgerStore + Send + Sync + 'static,
    C: CatalogClient + Send + Sync + 'static,
{
    pub fn new(port: u16, state: Arc<AppState<L, C>>) -> Self {
        Self { port, state }
    }

    pub async fn run(&self) -> Result<()> {
        let app = create_router(Arc::clone(&self.state)).layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
