use anyhow::{Context, Result};
use axum::{routing::get, Router};
use colored::Colorize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use stache::config::Config;
use stache::http::{layout_handler, shared_templates_handler, ViewEngine};

pub async fn execute(config: Config, port: u16, env: Option<String>) -> Result<()> {
    let config = match env {
        Some(env) => config.with_environment(env),
        None => config,
    };

    let engine = ViewEngine::from_config(config).context("Failed to load templates")?;
    let app = router(&engine);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("{} http://{addr}", "Serving templates on".bold());
    println!("  {}", format!("Bundle: http://{addr}/templates.js").dimmed());
    if engine.is_development() {
        println!("  {}", "Reloading templates on every request".dimmed());
    }
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn router(engine: &ViewEngine) -> Router {
    let app = Router::new()
        .route("/templates.js", get(shared_templates_handler))
        .route("/{layout}", get(layout_handler))
        .with_state(engine.clone());

    engine.attach(app).layer(TraceLayer::new_for_http())
}

/// Wait for Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}
