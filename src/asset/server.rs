//! Avatar gate server
//!
//! Hosts the token issuer, the asset gate and the project catalog on one
//! axum router.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::FromRef, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::error::AssetError;
use super::routes::{issue_token, no_cache_middleware, serve_avatar};
use crate::catalog::{featured_projects, list_projects, project_by_slug, CatalogStore};
use crate::core::config::GateConfig;
use crate::core::error::Result;
use crate::token::{Clock, SystemClock, TokenSigner};
use crate::transform::{AvatarPipeline, TransformConfig};

/// Route of the token issuer
pub const TOKEN_ROUTE: &str = "/api/avatar-url";

/// Route of the asset gate
pub const AVATAR_ROUTE: &str = "/api/avatar";

/// Shared, read-only state for all handlers
#[derive(Clone)]
pub struct AssetServerState {
    /// Keyed signer (the secret never leaves it)
    pub signer: Arc<TokenSigner>,
    /// Image pipeline for the one source avatar
    pub pipeline: AvatarPipeline,
    /// Time source for issuance and expiry
    pub clock: Arc<dyn Clock>,
    /// Project catalog
    pub catalog: CatalogStore,
}

impl AssetServerState {
    pub fn new(
        signer: TokenSigner,
        pipeline: AvatarPipeline,
        clock: Arc<dyn Clock>,
        catalog: CatalogStore,
    ) -> Self {
        Self {
            signer: Arc::new(signer),
            pipeline,
            clock,
            catalog,
        }
    }

    /// Build state from validated configuration, using the wall clock
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let signer = TokenSigner::new(&config.secret, config.token_ttl_secs)?;
        let pipeline = AvatarPipeline::init(TransformConfig::new(
            config.source_path.clone(),
            config.max_concurrent_transforms,
        ))?;
        let catalog = CatalogStore::new(config.catalog_path.clone());

        Ok(Self::new(signer, pipeline, Arc::new(SystemClock), catalog))
    }
}

impl FromRef<AssetServerState> for CatalogStore {
    fn from_ref(state: &AssetServerState) -> Self {
        state.catalog.clone()
    }
}

/// Avatar Gate Server
pub struct AvatarGateServer {
    state: AssetServerState,
    bind_addr: SocketAddr,
}

impl AvatarGateServer {
    /// Create a server from validated configuration
    pub fn new(config: &GateConfig) -> Result<Self> {
        Ok(Self {
            state: AssetServerState::from_config(config)?,
            bind_addr: config.bind_addr,
        })
    }

    /// Create a server around prepared state
    pub fn with_state(state: AssetServerState, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn state(&self) -> &AssetServerState {
        &self.state
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn start_with_shutdown<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| AssetError::BindFailed {
                reason: e.to_string(),
            })?;

        tracing::info!(addr = %self.bind_addr, "Avatar gate listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AssetError::Internal {
                reason: e.to_string(),
            })?;

        tracing::info!("Avatar gate stopped");
        Ok(())
    }
}

/// Router for the given state
///
/// Issuer and gate responses all pass through the no-cache layer, error
/// responses included.
pub fn build_router(state: AssetServerState) -> Router {
    let avatar_routes = Router::new()
        .route(TOKEN_ROUTE, get(issue_token))
        .route(AVATAR_ROUTE, get(serve_avatar))
        .layer(middleware::from_fn(no_cache_middleware));

    let catalog_routes = Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects/featured", get(featured_projects))
        .route("/api/projects/:slug", get(project_by_slug));

    Router::new()
        .merge(avatar_routes)
        .merge(catalog_routes)
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
