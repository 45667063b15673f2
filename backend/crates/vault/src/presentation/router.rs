//! Route definitions for the sensitive-data endpoints
//!
//! Intended to be nested under a path prefix by the application binary.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::application::store::SensitiveStore;
use crate::config::RateSettings;
use crate::domain::repository::SensitiveRepository;
use crate::infra::postgres::PgSensitiveRepository;
use crate::presentation::handlers::{self, EndpointLimits, VaultAppState};

/// Router over the PostgreSQL repository
pub fn vault_router(repo: PgSensitiveRepository, settings: RateSettings) -> Router {
    vault_router_with(repo, settings)
}

/// Router over any repository implementation
pub fn vault_router_with<R>(repo: R, settings: RateSettings) -> Router
where
    R: SensitiveRepository + Send + Sync + 'static,
{
    let state = VaultAppState {
        store: Arc::new(SensitiveStore::new(Arc::new(repo))),
        limits: Arc::new(EndpointLimits::new(&settings)),
    };

    Router::new()
        .route(
            "/",
            get(handlers::list_records::<R>).post(handlers::create_record::<R>),
        )
        .route("/fetch", post(handlers::match_records::<R>))
        .route(
            "/{id}",
            get(handlers::get_record::<R>)
                .put(handlers::update_record::<R>)
                .delete(handlers::delete_record::<R>),
        )
        .with_state(state)
}
