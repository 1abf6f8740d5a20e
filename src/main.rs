use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smart_decks::config::AppConfig;
use smart_decks::content::{DeckCatalog, UnlockCodes};
use smart_decks::state::AppState;
use smart_decks::{db, handlers, profile_scope, profiling};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "smart_decks=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  // Initialize profiling (no-op if feature disabled)
  profiling::init();

  let config = AppConfig::load();
  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  let catalog = {
    let conn = pool.lock().expect("Database lock failed during startup");
    profile_scope!("load_catalog", {
      DeckCatalog::load(&config.decks_dir, &conn).expect("Failed to load decks")
    })
  };
  tracing::info!(
    "Loaded {} decks from {}",
    catalog.len(),
    config.decks_dir.display()
  );

  let unlock_codes = UnlockCodes::load(&config.unlock_codes_path);
  let bind_addr = config.bind_addr();
  let port = config.port;
  let state = AppState::new(pool, catalog, unlock_codes, config);

  let app = handlers::router(state).layer(TraceLayer::new_for_http());

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");

  profiling::shutdown();
}
