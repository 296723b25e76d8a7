use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use hyper::{Request, body::Incoming, service::service_fn};
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto::Builder,
};
use promex_common::error::{PromexError, Result};
use promex_metrics::Registry;
use tokio::net::TcpListener;
use tower::Service;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::{
    cache::HeaderCache, config::ExporterConfig, pool::BufferPool, scrape::ScrapeAssembler,
};

pub struct ExporterState {
    pub registry: Arc<Registry>,
    pub assembler: ScrapeAssembler,
    pub pool: BufferPool,
    pub write_timeout: Duration,
}

impl ExporterState {
    pub fn new(registry: Arc<Registry>, config: &ExporterConfig) -> Self {
        let cache = Arc::new(HeaderCache::with_spelling(config.gauge_spelling));
        Self {
            registry,
            assembler: ScrapeAssembler::new(cache),
            pool: BufferPool::new(config.pool_capacity),
            write_timeout: config.write_timeout,
        }
    }
}

/// Every path and method is answered with the full exposition body.
pub fn router(state: Arc<ExporterState>) -> Router {
    let write_timeout = state.write_timeout;
    Router::new()
        .fallback(scrape)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            write_timeout,
        ))
        .with_state(state)
}

pub async fn scrape(State(state): State<Arc<ExporterState>>) -> Response {
    let mut buffer = state.pool.get();
    state.assembler.render(&state.registry, &mut buffer);
    let body = Bytes::copy_from_slice(buffer.as_bytes());
    drop(buffer);

    let content_length = HeaderValue::from(body.len());
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, content_length);

    response
}

/// Binds `config.addr` and serves `registry` until the process exits.
pub async fn run(registry: Arc<Registry>, config: ExporterConfig) -> Result<()> {
    info!(addr = %config.addr, "starting prometheus http server");

    let listener = match TcpListener::bind(&config.addr).await {
        Ok(listener) => listener,
        Err(source) => {
            warn!(
                addr = %config.addr,
                error = %source,
                "unable to start prometheus metrics server"
            );
            return Err(PromexError::Bind {
                addr: config.addr,
                source,
            });
        }
    };

    let state = Arc::new(ExporterState::new(registry, &config));
    serve(listener, router(state), config.read_timeout).await
}

pub async fn serve(listener: TcpListener, app: Router, read_timeout: Duration) -> Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                debug!(error = %err, "failed to accept metrics connection");
                continue;
            }
        };

        let app = app.clone();
        tokio::spawn(async move {
            let service = service_fn(move |request: Request<Incoming>| app.clone().call(request));

            let mut builder = Builder::new(TokioExecutor::new());
            builder
                .http1()
                .timer(TokioTimer::new())
                .header_read_timeout(read_timeout);

            if let Err(err) = builder.serve_connection(TokioIo::new(stream), service).await {
                debug!(%peer, error = %err, "metrics connection closed with error");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use promex_metrics::Registry;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };
    use tower::ServiceExt;

    use super::{ExporterState, router, run, serve};
    use crate::{config::ExporterConfig, key::GaugeSpelling};

    fn registry() -> Arc<Registry> {
        let registry = Registry::new();
        registry.register_counter("db/reads").unwrap().inc(42);
        Arc::new(registry)
    }

    const DB_READS: &str = "# HELP db_reads metric\n\
                            # TYPE db_reads gauage\n\
                            db_reads{mtype=\"gauage\",aggr=\"value\"} 42\n";

    #[tokio::test]
    async fn any_path_returns_exposition_body() {
        let state = Arc::new(ExporterState::new(registry(), &ExporterConfig::default()));

        let requests = [
            (Method::GET, "/"),
            (Method::GET, "/debug/metrics/prometheus"),
            (Method::POST, "/x"),
        ];
        for (method, uri) in requests {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = router(Arc::clone(&state))
                .oneshot(request)
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
            assert_eq!(
                response.headers()[header::CONTENT_LENGTH],
                DB_READS.len().to_string().as_str()
            );

            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(body, DB_READS.as_bytes());
        }

        assert_eq!(state.assembler.cache().constructions(), 1);
        assert_eq!(state.pool.idle(), 1);
    }

    #[tokio::test]
    async fn standard_spelling_is_configurable() {
        let config = ExporterConfig {
            gauge_spelling: GaugeSpelling::Standard,
            ..ExporterConfig::default()
        };
        let state = Arc::new(ExporterState::new(registry(), &config));

        let response = router(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        assert!(body.starts_with(b"# HELP db_reads metric\n# TYPE db_reads gauge\n"));
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        let config = ExporterConfig::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ExporterState::new(registry(), &config));
        let server = tokio::spawn(serve(listener, router(state), config.read_timeout));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let response = String::from_utf8(raw).unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("content-type: text/plain\r\n"));
        assert!(response.ends_with(DB_READS));

        server.abort();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ExporterConfig {
            addr: occupied.local_addr().unwrap().to_string(),
            ..ExporterConfig::default()
        };

        let err = run(registry(), config).await.unwrap_err();
        assert!(err.is_bind());
    }
}
