//! Soko JSON API Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use soko_app::{
    context::AppContext,
    database::{self, Db},
    notifications::{LogNotifier, Notifier, NotifyError, WebhookNotifier},
};

use crate::{
    config::{ServerConfig, notifications::NotificationsConfig},
    state::State,
};

mod auth;
mod config;
mod extensions;
mod flash_sales;
mod healthcheck;
mod observability;
mod orders;
mod payments;
mod products;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod vouchers;

fn build_notifier(config: &NotificationsConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    Ok(match &config.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), config.webhook_timeout())?),
        None => Arc::new(LogNotifier),
    })
}

/// Soko JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init_subscriber(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("Logging error: {init_error}");
        }

        process::exit(1);
    }

    let pricing = match config.pricing.to_pricing_config() {
        Ok(pricing) => pricing,
        Err(pricing_error) => {
            error!("invalid pricing configuration: {pricing_error}");

            process::exit(1);
        }
    };

    let notifier = match build_notifier(&config.notifications) {
        Ok(notifier) => notifier,
        Err(notify_error) => {
            error!("failed to build notifier: {notify_error}");

            process::exit(1);
        }
    };

    let pool = match database::connect(&config.database.database_url).await {
        Ok(pool) => pool,
        Err(db_error) => {
            error!("failed to connect to database: {db_error}");

            process::exit(1);
        }
    };

    if config.database.migrate {
        if let Err(migrate_error) = database::migrate(&pool).await {
            error!("failed to run migrations: {migrate_error}");

            process::exit(1);
        }

        info!("database migrations applied");
    }

    let app = AppContext::new(Db::new(pool), pricing, notifier);

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(observability::request_logging)
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(inject(State::from_app_context(app)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(router::app_router());

    let doc = OpenApi::new("Soko API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;
}
