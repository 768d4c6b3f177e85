use axum::{
    middleware::from_fn,
    routing::{get, patch, post},
    Router,
};
use jobboard_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, cors::cors_layer},
    routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let auth_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login));

    let employer_api = Router::new()
        .route(
            "/api/employer/profile",
            get(routes::profile::get_profile).put(routes::profile::save_profile),
        )
        .route("/api/employer/capacity", get(routes::profile::capacity_status))
        .route(
            "/api/employer/postings",
            get(routes::posting::list_my_postings).post(routes::posting::create_posting),
        )
        .route(
            "/api/employer/postings/:id",
            patch(routes::posting::update_posting).delete(routes::posting::delete_posting),
        )
        .route(
            "/api/employer/postings/:id/pin",
            post(routes::posting::pin_posting),
        )
        .route(
            "/api/employer/postings/:id/applications",
            get(routes::posting::list_posting_applications),
        )
        .route(
            "/api/employer/applications",
            get(routes::posting::list_all_applications),
        )
        .route_layer(from_fn(auth::require_employer));

    let public_api = Router::new()
        .route("/api/public/postings", get(routes::public::list_open_postings))
        .route("/api/public/postings/:id", get(routes::public::get_posting));

    let seeker_api = Router::new()
        .route("/api/public/postings/:id/apply", post(routes::public::apply))
        .route_layer(from_fn(auth::require_seeker));

    let app = base_routes
        .merge(auth_api)
        .merge(employer_api)
        .merge(public_api)
        .merge(seeker_api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(app_state);

    let listener = TcpListener::bind(&config.server_address).await?;
    info!("listening on {}", config.server_address);
    axum::serve(listener, app).await?;

    Ok(())
}
