//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router dispatching every request to a context
//! - Wire up middleware (request ID, tracing, timeout)
//! - Run each exchange's filter chain on the blocking pool
//! - Interrupt a running exchange whose request was abandoned
//! - Own the feed archive queue and drain it on shutdown
//! - Observability (metrics, per-exchange spans)

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::archive::{ArchiveQueue, FeedArchiver};
use crate::config::AgentConfig;
use crate::http::diagnostic::DiagnosticHandler;
use crate::http::exchange::ExchangeError;
use crate::http::filter::{panic_message, FilterChain, LoggingFilter, TraceSettings};
use crate::http::interrupt::Interrupt;
use crate::http::request::{into_exchange, UuidRequestId};
use crate::http::response;
use crate::http::stream::ByteCounter;
use crate::lifecycle::Shutdown;
use crate::observability::logging::TracingLog;
use crate::observability::{metrics, tracing::exchange_span};
use crate::routing::{Context, ContextRouter};

const ARCHIVE_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub contexts: Arc<ContextRouter>,
    pub max_body_bytes: usize,
}

/// HTTP server hosting the filter chains.
pub struct HttpServer {
    router: Router,
    config: AgentConfig,
    archive: Option<(ArchiveQueue, JoinHandle<()>)>,
}

impl HttpServer {
    /// Create a server with the contexts enabled in `config`.
    pub fn new(config: AgentConfig) -> Self {
        let mut contexts = Vec::new();
        if config.diagnostic.enabled {
            let chain = FilterChain::builder(DiagnosticHandler::from_config(&config.diagnostic))
                .filter(LoggingFilter::new(TracingLog, trace_settings(&config)))
                .build();
            contexts.push(Context::new(config.diagnostic.mount_path.clone(), chain));
        }
        Self::with_contexts(config, contexts)
    }

    /// Create a server with caller-supplied contexts.
    pub fn with_contexts(config: AgentConfig, contexts: Vec<Context>) -> Self {
        for context in &contexts {
            tracing::info!(
                mount_path = %context.mount_path(),
                handler = %context.chain().handler_name(),
                filters = ?context.chain().descriptions(),
                "Context registered"
            );
        }

        let state = AppState {
            contexts: Arc::new(ContextRouter::new(contexts)),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let archive = Self::spawn_archive(&config);
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            archive,
        }
    }

    /// Start the archive worker when a directory is configured.
    fn spawn_archive(config: &AgentConfig) -> Option<(ArchiveQueue, JoinHandle<()>)> {
        let directory = config.archive.directory.as_ref()?;
        if Handle::try_current().is_err() {
            tracing::warn!("No tokio runtime; feed archival disabled");
            return None;
        }
        tracing::info!(
            directory = %directory.display(),
            capacity = config.archive.queue_capacity,
            "Feed archival enabled"
        );
        Some(ArchiveQueue::spawn(
            FeedArchiver::from_config(&config.archive),
            config.archive.queue_capacity,
        ))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AgentConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        if let Some((queue, worker)) = self.archive {
            drop(queue);
            if tokio::time::timeout(ARCHIVE_DRAIN_TIMEOUT, worker).await.is_err() {
                tracing::warn!("Archive queue still busy at shutdown; remaining copies dropped");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Queue for feed copies; `None` unless `[archive] directory` is set.
    pub fn archive_queue(&self) -> Option<&ArchiveQueue> {
        self.archive.as_ref().map(|(queue, _)| queue)
    }
}

fn trace_settings(config: &AgentConfig) -> TraceSettings {
    TraceSettings {
        requests: config.observability.trace_requests,
        responses: config.observability.trace_responses,
    }
}

/// Interrupts the exchange if the request future is dropped first.
struct InterruptOnDrop(Option<Interrupt>);

impl InterruptOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(interrupt) = self.0.take() {
            tracing::debug!("Request abandoned, interrupting exchange");
            interrupt.interrupt();
        }
    }
}

/// Resolve the context and run its chain on the blocking pool.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let Some(context) = state.contexts.resolve(&path) else {
        tracing::debug!(path = %path, "No context found for request");
        metrics::record_exchange(&method, 404, start);
        return (StatusCode::NOT_FOUND, "No context found for request").into_response();
    };
    let chain = Arc::clone(context.chain());

    let exchange = match into_exchange(request, state.max_body_bytes).await {
        Ok(exchange) => exchange.with_body_hook(ByteCounter::new()),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Unable to read request body");
            metrics::record_exchange(&method, 413, start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let span = exchange_span(exchange.request_id(), &method, &path);
    let guard = InterruptOnDrop(Some(exchange.interrupt().clone()));
    let outcome = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let mut exchange = exchange;
        let result = panic::catch_unwind(AssertUnwindSafe(|| chain.handle(&mut exchange)))
            .unwrap_or_else(|payload| {
                Err(ExchangeError::Runtime(format!(
                    "panic: {}",
                    panic_message(payload.as_ref())
                )))
            });
        (exchange, result)
    })
    .await;
    guard.disarm();

    let response = match outcome {
        Ok((exchange, Ok(()))) => response::into_response(exchange.into_response_parts()),
        Ok((exchange, Err(e))) if exchange.is_committed() => {
            tracing::warn!(
                path = %path,
                error = %e,
                "Filter chain failed after committing a response; keeping it"
            );
            response::into_response(exchange.into_response_parts())
        }
        Ok((_, Err(e))) => {
            tracing::error!(path = %path, error = %e, "Filter chain failed");
            response::engine_failure()
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Exchange task did not complete");
            response::engine_failure()
        }
    };

    metrics::record_exchange(&method, response.status().as_u16(), start);
    response
}
