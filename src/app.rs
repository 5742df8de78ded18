use crate::{
    config::ServerConfig,
    form::Field,
    relay::{send_email, Relay, SEND_EMAIL_PATH},
};
use askama::Template;
use askama_axum::IntoResponse;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, MethodRouter},
    Extension, Router,
};
use axum_prometheus::{metrics_exporter_prometheus::PrometheusHandle, PrometheusMetricLayer};
use axum_server::tls_rustls::RustlsConfig;
use axum_test::TestServer;
use rust_embed::RustEmbed;
use sentry_tower::{NewSentryLayer, SentryHttpLayer};
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tracing::info;
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::{
        self,
        format::{Format, JsonFields},
    },
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(RustEmbed)]
#[folder = "statics"]
struct Statics;

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactPage {
    endpoint: &'static str,
    fields: [Field; 3],
}

#[derive(Default)]
pub struct App {
    router: Router,
}

impl App {
    pub fn new() -> Self {
        dotenvy::dotenv().ok();
        logger();
        Self {
            router: Router::new().route("/status/liveness", get(|| async { "".into_response() })),
        }
    }

    /// Mounts the contact page, its script and the relay endpoint.
    pub fn contact(self, relay: Relay) -> Self {
        self.route(
            "/",
            get(|| async {
                ContactPage {
                    endpoint: SEND_EMAIL_PATH,
                    fields: Field::ALL,
                }
            }),
        )
        // Only the JSON parse decides on the body, no size cap.
        .route(
            SEND_EMAIL_PATH,
            post(send_email).layer(DefaultBodyLimit::disable()),
        )
        .statics::<Statics>()
        .inject(relay)
    }

    pub fn inject<T: Clone + Send + Sync + 'static>(self, t: T) -> Self {
        Self {
            router: self.router.layer(Extension(t)),
        }
    }

    pub fn statics<T: RustEmbed>(self) -> Self {
        let mut app = self;
        for file in T::iter() {
            let Some(content) = T::get(file.as_ref()) else {
                continue;
            };
            let bytes = content.data.to_vec();
            let mime = mime_guess::from_path(file.as_ref())
                .first_raw()
                .unwrap_or("application/octet-stream");
            app = app.route(
                &format!("/{file}"),
                get(move || async move { ([("Content-Type", mime)], bytes).into_response() }),
            );
        }
        app
    }

    pub fn route(self, path: &str, method_router: MethodRouter<()>) -> Self {
        Self {
            router: self.router.route(path, method_router),
        }
    }

    /// Final router with request metrics over every route.
    pub fn into_router(self) -> Router {
        prometheus(self.router)
    }

    pub fn as_test_server(self) -> anyhow::Result<TestServer> {
        TestServer::new(self.into_router())
    }

    pub async fn start(self, config: ServerConfig) -> anyhow::Result<()> {
        start(self.into_router(), config).await
    }
}

async fn start(app: Router, config: ServerConfig) -> anyhow::Result<()> {
    let _guard = sentry(&config);
    let compression_layer: CompressionLayer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true);
    let app = app
        .layer(NewSentryLayer::new_from_top())
        .layer(SentryHttpLayer::with_transaction())
        .layer(compression_layer);

    let addr = config.addr()?;
    if let Some((pem_cert, pem_key)) = config.tls {
        info!("Starting contact relay on {addr} with TLS ON");
        let tls_config = RustlsConfig::from_pem_file(pem_cert, pem_key).await?;
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?
    } else {
        info!("Starting contact relay on {addr}");
        axum::serve(TcpListener::bind(addr).await?, app).await?;
    }
    Ok(())
}

fn sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    config.sentry_url.as_ref().map(|url| {
        sentry::init((
            url.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                traces_sample_rate: 1.0,
                ..Default::default()
            },
        ))
    })
}

/// `STRUCTURED_LOGGING=true` switches to json lines, `RUST_LOG` filters.
pub(crate) fn logger() {
    let enabled: bool = std::env::var("STRUCTURED_LOGGING")
        .map(|s| s.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);
    if enabled {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .event_format(Format::default().json())
                    .fmt_fields(JsonFields::new()),
            )
            .with(EnvFilter::from_default_env())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .try_init()
            .ok();
    };
}

/// The recorder is process global and can only be installed once, apps built
/// after the first one share it.
fn prometheus(app: Router) -> Router {
    static PAIR: OnceLock<(PrometheusMetricLayer<'static>, PrometheusHandle)> = OnceLock::new();
    let (metric_gatherer, metric_printer) = PAIR.get_or_init(PrometheusMetricLayer::pair).clone();
    app.route(
        "/metrics/prometheus",
        get(|| async move { metric_printer.render() }),
    )
    .layer(metric_gatherer)
}
