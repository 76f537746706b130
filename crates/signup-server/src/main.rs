//! Sign-up server - Entry point.

use member_store::{MemberStore, Store};
use signup_server::{
    api::{create_router, AppState, SignupThrottle},
    config::Config,
    telemetry::init_logging,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log);

    info!("Starting sign-up server");

    // Initialize storage
    let store = if config.store.persist {
        match Store::file(config.store.path.clone()).await {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to open member store at {:?}: {}", config.store.path, e);
                std::process::exit(1);
            }
        }
    } else {
        info!("Persistence disabled, using in-memory storage");
        Store::memory()
    };

    match store.count().await {
        Ok(n) => info!("Member store ready with {} members", n),
        Err(e) => error!("Member store not readable: {}", e),
    }

    let state = AppState::new(Arc::new(store));
    let throttle = SignupThrottle::per_minute(config.rate_limit.signups_per_minute);
    let app = create_router(state, throttle);

    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
