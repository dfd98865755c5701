//! HTTP backend for a rental listing site: owners publish properties with
//! pricing, location, photos, amenities and house rules; administrators
//! review listings and curate classes; guests get quotes and book stays.

use axum::{
    routing::{get, patch},
    Router,
};
use log::info;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod services;
pub mod state;

use handlers::{admin, lookups, owners, properties, reservations};
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route(
            "/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/properties/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route("/properties/:id/quote", get(properties::quote))
        .route(
            "/properties/:id/availability",
            get(properties::list_availability).put(properties::replace_availability),
        )
        .route(
            "/properties/:id/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/reservations/:id", get(reservations::get_reservation))
        .route(
            "/reservations/:id/status",
            patch(reservations::set_reservation_status),
        )
        .route("/owners", get(owners::list_owners).post(owners::create_owner))
        .route(
            "/owners/:id",
            get(owners::get_owner)
                .put(owners::update_owner)
                .delete(owners::delete_owner),
        )
        .route("/owners/:id/properties", get(owners::owner_properties))
        .route("/amenities", get(lookups::active_amenities))
        .route("/classes", get(lookups::active_classes))
        .route("/classes/:id/properties", get(lookups::class_properties))
        .route("/featured", get(lookups::featured));

    let admin = Router::new()
        .route("/properties", get(admin::list_properties))
        .route("/properties/:id", get(admin::get_property))
        .route("/properties/:id/status", patch(admin::set_property_status))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/:id", axum::routing::delete(admin::delete_user))
        .route(
            "/amenities",
            get(lookups::list_amenities).post(lookups::create_amenity),
        )
        .route(
            "/amenities/:id",
            get(lookups::get_amenity)
                .put(lookups::update_amenity)
                .delete(lookups::deactivate_amenity),
        )
        .route("/classes", get(lookups::list_classes).post(lookups::create_class))
        .route(
            "/classes/:id",
            get(lookups::get_class)
                .put(lookups::update_class)
                .delete(lookups::deactivate_class),
        )
        .route("/debug/counts", get(admin::table_counts))
        .route("/debug/incomplete", get(admin::incomplete_properties));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api", public.nest("/admin", admin))
        .with_state(state)
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
