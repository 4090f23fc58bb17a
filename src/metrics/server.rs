use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};

/// Expose the worker's registry over HTTP for scraping.
///
/// Runs on its own runtime thread so the scrape endpoint stays responsive
/// while the consumer loop owns the main runtime.
pub async fn start_metrics_server(registry: Arc<Registry>, port: u16) -> std::io::Result<()> {
    tracing::info!(port = port, "📊 Metrics server listening on /metrics");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .route("/metrics", web::get().to(scrape))
            .route("/health", web::get().to(health))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn scrape(registry: web::Data<Arc<Registry>>) -> impl Responder {
    let mut buffer = Vec::new();

    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        return HttpResponse::InternalServerError().body(e.to_string());
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

// Liveness only; readiness is the consumer loop itself.
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "order-worker"
    }))
}
