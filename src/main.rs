// ============================================================================
// JACKPOT — ROUND-BASED POOLED LOTTERY SERVER
// ============================================================================
//
// Every round: bets accumulate into the pool, the clock fires, one bettor
// wins the whole pot with probability proportional to their stake.
//
// Engine:  one timer task + atomic ReDB resolution (no lost pools)
// Storage: ReDB (ACID, MVCC) + DashMap balance cache
//
// Run:  cargo run
// Test: curl http://localhost:8080/health

use std::sync::Arc;

use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jackpot::routes::{self, AppState};
use jackpot::{config, LedgerStore, RoundScheduler, VERSION};

// ============================================================================
// GRACEFUL SHUTDOWN
// ============================================================================

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("🛑 Shutdown signal received");
}

// ============================================================================
// MAIN
// ============================================================================

#[tokio::main]
async fn main() {
    // 1. Logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .init();

    let cfg = config::load();

    info!("╔════════════════════════════════════════════╗");
    info!("║        JACKPOT — POOLED LOTTERY            ║");
    info!("╠════════════════════════════════════════════╣");
    info!("║  Version:  {}                           ║", VERSION);
    info!("║  Round:    every {}s                       ║", cfg.round_period_secs);
    info!("║  Stake:    {} on first sight             ║", cfg.starting_balance);
    info!("╚════════════════════════════════════════════╝");

    // 2. Ledger (ReDB) — the only unrecoverable startup failure
    let store = match LedgerStore::open(&cfg.data_path, cfg.starting_balance) {
        Ok(store) => store,
        Err(e) => {
            error!("❌ FATAL: cannot open ledger store: {}", e);
            std::process::exit(1);
        }
    };

    // 3. Round clock
    let scheduler = RoundScheduler::new(store.clone(), cfg.round_period());
    scheduler.start();

    // 4. HTTP gateway
    let state = AppState {
        store,
        scheduler: scheduler.clone(),
        config: Arc::new(cfg.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!("");
    info!("🚀 Listening on http://{}", cfg.listen_addr);
    info!("");
    info!("📡 ENDPOINTS:");
    info!("   GET  /bet/{{participant}}            Balance (registers new ids)");
    info!("   GET  /bet/{{participant}}/{{amount}}   Stake on the open round");
    info!("   GET  /bet                           All open wagers");
    info!("   GET  /prize                         Current pool");
    info!("   GET  /health                        Health check");
    info!("   GET  /round                         Round + clock status");
    info!("");

    let listener = match tokio::net::TcpListener::bind(cfg.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ FATAL: cannot bind {}: {}", cfg.listen_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    scheduler.stop();
    info!("✅ Server shutdown complete");
}
