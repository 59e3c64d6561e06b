use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use luckymoney_core::{FileStorage, GameStore, RiggingConfig};
use luckymoney_shared::{
    AdjustRequest, AdminStateResponse, ApiError, ApiResult, InventoryView, LoginRequest,
    SpinRequest, SpinResponse,
};

mod config;

use config::ServerConfig;

type Store = GameStore<FileStorage, StdRng>;

struct AppState {
    store: Mutex<Store>,
}

impl AppState {
    fn lock(&self) -> ApiResult<MutexGuard<'_, Store>> {
        self.store.lock().map_err(|_| {
            error!("game store mutex poisoned");
            ApiError::Internal
        })
    }

    fn lock_admin(&self) -> ApiResult<MutexGuard<'_, Store>> {
        let store = self.lock()?;
        if !store.is_admin() {
            return Err(ApiError::Unauthorized);
        }
        Ok(store)
    }
}

#[derive(Clone, Copy)]
enum Access {
    Public,
    Admin,
}

/// Runs `f` against the store on the blocking pool; every mutation ends in a
/// synchronous file write.
async fn with_store<T, F>(state: Arc<AppState>, access: Access, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Store) -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut store = match access {
            Access::Public => state.lock()?,
            Access::Admin => state.lock_admin()?,
        };
        f(&mut store)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "store task failed");
        ApiError::Internal
    })?
}

fn status(e: ApiError) -> StatusCode {
    match e {
        ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
        ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn route_inventory(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InventoryView>, StatusCode> {
    let view = with_store(state, Access::Public, |store| {
        Ok(InventoryView::of(store.state()))
    })
    .await
    .map_err(status)?;
    Ok(Json(view))
}

async fn route_spin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, StatusCode> {
    let name = req.validated_name().map_err(status)?.to_string();
    let outcome = with_store(state, Access::Public, move |store| Ok(store.spin(&name)))
        .await
        .map_err(status)?;
    Ok(Json(outcome.into()))
}

async fn route_admin_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<StatusCode, StatusCode> {
    let accepted = with_store(state, Access::Public, move |store| Ok(store.login(&req.pin)))
        .await
        .map_err(status)?;
    if accepted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn route_admin_logout(State(state): State<Arc<AppState>>) -> Result<StatusCode, StatusCode> {
    with_store(state, Access::Public, |store| {
        store.logout();
        Ok(())
    })
    .await
    .map_err(status)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn route_admin_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminStateResponse>, StatusCode> {
    let resp = with_store(state, Access::Admin, |store| {
        Ok(AdminStateResponse::of(store.state()))
    })
    .await
    .map_err(status)?;
    Ok(Json(resp))
}

async fn route_admin_rigging(
    State(state): State<Arc<AppState>>,
    Json(rigging): Json<RiggingConfig>,
) -> Result<StatusCode, StatusCode> {
    with_store(state, Access::Admin, move |store| {
        store.set_rigging(rigging);
        Ok(())
    })
    .await
    .map_err(status)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn route_admin_adjust(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<InventoryView>, StatusCode> {
    let view = with_store(state, Access::Admin, move |store| {
        // Unknown values are a no-op; the caller sees the unchanged inventory.
        store.adjust_quantity(req.value, req.delta);
        Ok(InventoryView::of(store.state()))
    })
    .await
    .map_err(status)?;
    Ok(Json(view))
}

async fn route_admin_reset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InventoryView>, StatusCode> {
    let view = with_store(state, Access::Admin, |store| {
        store.reset_inventory();
        Ok(InventoryView::of(store.state()))
    })
    .await
    .map_err(status)?;
    Ok(Json(view))
}

fn app(state: Arc<AppState>, admin_path: &str) -> Router {
    let admin = Router::new()
        .route("/login", post(route_admin_login))
        .route("/logout", post(route_admin_logout))
        .route("/state", get(route_admin_state))
        .route("/rigging", post(route_admin_rigging))
        .route("/inventory/adjust", post(route_admin_adjust))
        .route("/inventory/reset", post(route_admin_reset));

    Router::new()
        .route("/inventory", get(route_inventory))
        .route("/spin", post(route_spin))
        .nest(admin_path, admin)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let config = ServerConfig::from_env()?;

    let storage = FileStorage::new(&config.state_dir);
    storage.path_for(&config.store.storage_key)?;
    let store = GameStore::open(storage, StdRng::from_entropy(), config.store.clone());
    info!(
        state_dir = %config.state_dir.display(),
        total_value = store.total_value(),
        spins = store.history().len(),
        "game state loaded"
    );

    let state = Arc::new(AppState {
        store: Mutex::new(store),
    });
    let app = app(state, &config.admin_path);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("listening on {}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
