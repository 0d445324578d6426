/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use levelboard_api::{app::{build_router, AppState}, config::Config};
/// use levelboard_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use levelboard_shared::{
    auth::{
        authorization::{require_admin, AuthzError},
        middleware::{authenticate_bearer, AuthContext},
    },
    ledger::PointsLedger,
    ranking::RankingEngine,
    store::Store,
    subscriptions::SubscriptionRegistry,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request by Axum's `State` extractor; every field is a cheap
/// handle over the one injected store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub ledger: PointsLedger,
    pub ranking: RankingEngine,
    pub subscriptions: SubscriptionRegistry,
}

impl AppState {
    /// Wires the core components over `store`
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            ledger: PointsLedger::new(store.clone()),
            ranking: RankingEngine::new(store.clone()),
            subscriptions: SubscriptionRegistry::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Requires an admin token whose user is still an admin in the store
    ///
    /// Access tokens outlive role changes, so admin-only routes re-read the
    /// caller's role.
    pub async fn require_current_admin(&self, auth: &AuthContext) -> Result<(), ApiError> {
        require_admin(auth)?;

        let still_admin = self
            .store
            .find_user(auth.user_id)
            .await?
            .is_some_and(|user| user.role.is_admin());

        if !still_admin {
            tracing::warn!(user_id = %auth.user_id, "Admin token used after role was revoked");
            return Err(AuthzError::AdminRequired.into());
        }

        Ok(())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health
/// ├── POST /signup, /login, /refresh
/// ├── GET  /stats
/// ├── GET  /users
/// ├── GET  /leaderboard/top3
/// ├── /users/:id
/// │   ├── GET    /actions, /classifications, /profile
/// │   ├── POST   /addPoints             (admin)
/// │   ├── POST   /role                  (admin)
/// │   ├── DELETE /                      (admin)
/// │   └── POST   /addAction, /stats, /subscribe   (self or admin)
/// └── /classifications
///     ├── POST /                        (admin)
///     ├── GET  /:id                     most subscribed
///     └── GET  /:id/details
/// ```
///
/// Write routes sit behind the JWT layer; the admin and self-or-admin checks
/// run in the handlers.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. Response compression (gzip, brotli)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/stats", get(routes::stats::list_stats))
        .route("/users", get(routes::users::list_users))
        .route("/leaderboard/top3", get(routes::leaderboard::top3))
        .route("/users/:id/actions", get(routes::users::recent_actions))
        .route("/users/:id/classifications", get(routes::users::user_classifications))
        .route("/users/:id/profile", get(routes::users::profile))
        .route("/classifications/:id", get(routes::classifications::most_subscribed))
        .route("/classifications/:id/details", get(routes::classifications::details));

    let authenticated_routes = Router::new()
        .route("/users/:id", axum::routing::delete(routes::users::delete_user))
        .route("/users/:id/addPoints", post(routes::users::add_points))
        .route("/users/:id/addAction", post(routes::users::add_action))
        .route("/users/:id/stats", post(routes::stats::submit_stat))
        .route("/users/:id/subscribe", post(routes::users::subscribe))
        .route("/users/:id/role", post(routes::users::change_role))
        .route("/classifications", post(routes::classifications::create_classification))
        .layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Resolves the bearer token into an `AuthContext` request extension
async fn jwt_auth_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = authenticate_bearer(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}
