use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::data::registry::{DataRegistry, RegistryError};
use crate::scoring::Tier;

pub mod api;
pub mod routes;

/// Load tables, then serve the API until the process is stopped.
pub fn run_server(bind_addr: &str) -> Result<(), ServeError> {
    let registry = DataRegistry::from_env()?;
    let provenance = registry.provenance();
    println!("scoring key: {}", provenance.scoring_key_source.describe());
    println!("allocations: {}", provenance.allocations_source.describe());
    if !registry.allocations().is_complete() {
        eprintln!(
            "warning: allocation table covers {} of {} tiers; assessments landing on a missing tier will fail",
            registry.allocations().configured_count(),
            Tier::COUNT
        );
    }

    let runtime = tokio::runtime::Runtime::new().map_err(ServeError::Io)?;
    runtime.block_on(serve(bind_addr, Arc::new(registry)))
}

async fn serve(bind_addr: &str, registry: Arc<DataRegistry>) -> Result<(), ServeError> {
    let listener = TcpListener::bind(bind_addr).await.map_err(ServeError::Io)?;
    println!("lytton server listening on http://{bind_addr}");
    axum::serve(listener, routes::app(registry))
        .await
        .map_err(ServeError::Io)
}

#[derive(Debug)]
pub enum ServeError {
    Registry(RegistryError),
    Io(io::Error),
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(err) => err.fmt(f),
            Self::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<RegistryError> for ServeError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}
