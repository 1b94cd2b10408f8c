#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use axum::Router;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use secret_santa::app::*;
    use secret_santa::build_pool;
    use secret_santa::cache::open_cache;
    use secret_santa::config::Config;
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let pool = build_pool(&config).expect("Failed to create pool.");
    info!("Using database {}", config.database_url);
    if config.admin_password.is_none() {
        warn!("ADMIN_PASSWORD not set, the admin page is disabled");
    }

    let state = AppState {
        pool,
        cache: open_cache(config.redis_url.as_deref(), config.storage_timeout),
        config,
    };

    let conf = get_configuration(None).expect("Failed to read Leptos configuration.");
    let addr = conf.leptos_options.site_addr;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(App);

    let leptos_options_clone = leptos_options.clone();
    let app = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            // Provide shared state for server functions.
            move || provide_context(state.clone()),
            move || shell(leptos_options_clone.clone()),
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options.clone());

    info!("Listening on http://{}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address.");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error.");

    info!("Server shut down");
}

#[cfg(feature = "ssr")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}
