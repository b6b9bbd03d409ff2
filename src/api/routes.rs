// API routes configuration
// Author: Gabriel Demetrios Lafis

use actix_web::{web, HttpResponse, Responder};

use super::handlers;

/// Configure API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))

            // Datasets
            .service(
                web::scope("/datasets")
                    .route("", web::get().to(handlers::list_datasets))
                    .route("", web::post().to(handlers::create_dataset))
                    .route("/import", web::post().to(handlers::import_dataset))
                    .route("/{id}", web::get().to(handlers::get_dataset))
                    .route("/{id}", web::patch().to(handlers::update_dataset))
                    .route("/{id}", web::delete().to(handlers::delete_dataset))

                    // Analysis
                    .route("/{id}/summary", web::get().to(handlers::summarize_dataset))
                    .route("/{id}/aggregate", web::post().to(handlers::aggregate_dataset))
                    .route("/{id}/view", web::post().to(handlers::view_dataset))
                    .route("/{id}/export.csv", web::get().to(handlers::export_dataset))

                    // Cleaning
                    .route("/{id}/clean/remove-null-rows", web::post().to(handlers::clean_null_rows))
                    .route("/{id}/clean/split-column", web::post().to(handlers::clean_split_column))
            )
    );
}

/// Health check handler
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
