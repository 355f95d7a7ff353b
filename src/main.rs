use std::sync::Arc;
use std::time::Duration;

use rust_prom_target::chance::{Chance, SeededChance};
use rust_prom_target::{server, AppState};

#[tokio::main]
async fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   📈  PROMETHEUS SCRAPE TARGET                   ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Randomness source ─────────────────────────────────────
    // RNG_SEED pins the synthetic endpoints for reproducible runs.
    let chance: Arc<dyn Chance> = match std::env::var("RNG_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        Some(seed) => {
            println!("🎲 RNG_SEED={seed} — deterministic traffic");
            Arc::new(SeededChance::seeded(seed))
        }
        None => Arc::new(SeededChance::from_entropy()),
    };

    // ── 2. Build shared state (registry + metrics) ───────────────
    // A duplicate metric name here is a configuration bug, not a
    // runtime condition — abort before binding the listener.
    let state = Arc::new(
        AppState::new(chance, Duration::from_secs(1))
            .expect("metric registration failed"),
    );

    // ── 3. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let addr = "0.0.0.0:8080";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to port 8080 — is it already in use?");

    println!("Server listening on http://localhost:8080");
    println!("Welcome page    → http://localhost:8080/");
    println!("Exposition      → http://localhost:8080/metrics");
    println!("Slow endpoint   → http://localhost:8080/slow");
    println!("Error endpoint  → http://localhost:8080/error");
    println!();

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
