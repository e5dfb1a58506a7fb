use std::{env, fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    ApiClient, ApiConfig, AppState, DEFAULT_API_URL, PaginationConfig, RegistrationSchema,
    build_router, graceful_shutdown, logging_middleware,
};

/// The registration payload shapes the remote API may expect.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemaArg {
    /// `{name, email, password}`
    NameEmail,
    /// `{username, firstname, lastname, password}`
    Username,
}

impl From<SchemaArg> for RegistrationSchema {
    fn from(value: SchemaArg) -> Self {
        match value {
            SchemaArg::NameEmail => RegistrationSchema::NameEmail,
            SchemaArg::Username => RegistrationSchema::Username,
        }
    }
}

/// The web server for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the remote expense API.
    #[arg(long, env = "EXPENSE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// The canonical timezone used for default dates, e.g. "Asia/Kolkata".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The shape of the registration request the API expects.
    #[arg(long, value_enum, default_value_t = SchemaArg::NameEmail)]
    registration_schema: SchemaArg,

    /// How many seconds to wait for the API before giving up on a request.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let secret = match env::var("SECRET") {
        Ok(secret) => secret,
        Err(error) => {
            tracing::error!("The environment variable 'SECRET' must be set: {error}");
            exit(1);
        }
    };

    let api_config = ApiConfig::new(&args.api_url)
        .with_request_timeout(Duration::from_secs(args.request_timeout_secs));

    if let Err(error) = api_config.validate() {
        tracing::error!("{error}");
        exit(1);
    }

    let api = match ApiClient::new(&api_config) {
        Ok(api) => api,
        Err(error) => {
            tracing::error!("Could not create the API client: {error}");
            exit(1);
        }
    };

    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        tracing::warn!(
            "\"{}\" is not a canonical timezone, pages that need today's date will fail",
            args.timezone
        );
    }

    let state = AppState::new(
        &secret,
        &args.timezone,
        PaginationConfig::default(),
        api,
        args.registration_schema.into(),
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(
        "HTTP server listening on {addr}, using the expense API at {}",
        api_config.base_url
    );

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Could not create log file: {error}");
            exit(1);
        }
    };

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Handlers log their own errors.
        .on_failure(());

    router.layer(tracing_layer)
}
