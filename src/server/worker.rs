//! # Worker de conexión
//! src/server/worker.rs
//!
//! Atiende una conexión de principio a fin:
//!
//! ```text
//! Reading → Parsing → Dispatching → Responding → Closed
//!    │         │                        │
//!    │         └── 400 ─────────────────┘
//!    └── (nada leído) ──────────────────────────→ Closed
//! ```
//!
//! `Closed` se alcanza en todos los caminos: la conexión se cierra siempre
//! antes de que el worker termine. Ninguna falla sale de acá.

use crate::files::FileService;
use crate::http::{read_frame, FrameEnd, Method, Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::server::transport::{write_all_bytes, Connection};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Estados del worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Reading,
    Parsing,
    Dispatching,
    Responding,
    Closed,
}

/// Cómo terminó una conexión
#[derive(Debug)]
pub enum Outcome {
    /// Se envió la respuesta completa
    Responded { status: StatusCode, bytes: usize },

    /// No llegó nada que parsear; se cerró sin responder
    NothingRead,

    /// Falló la escritura de la respuesta
    WriteFailed { status: StatusCode, error: io::Error },
}

/// Estado inmutable compartido por todos los workers
#[derive(Clone)]
pub struct WorkerContext {
    pub files: Arc<dyn FileService>,
    pub metrics: MetricsCollector,
}

impl WorkerContext {
    pub fn new(files: impl FileService + 'static, metrics: MetricsCollector) -> Self {
        Self {
            files: Arc::new(files),
            metrics,
        }
    }
}

/// Worker de una conexión
pub struct ConnectionWorker {
    id: u64,
    context: Arc<WorkerContext>,
}

impl ConnectionWorker {
    pub fn new(id: u64, context: Arc<WorkerContext>) -> Self {
        Self { id, context }
    }

    /// Corre la máquina de estados y cierra la conexión
    pub fn run<C: Connection>(self, mut conn: C) -> Outcome {
        let span = tracing::info_span!("conn", id = self.id, peer = %conn.peer());
        let _enter = span.enter();
        let start = Instant::now();

        let outcome = self.serve(&mut conn);

        conn.close();
        self.enter(WorkerState::Closed);

        let metrics = &self.context.metrics;
        let latency = start.elapsed();
        match &outcome {
            Outcome::Responded { status, bytes } => {
                metrics.record_response(status.as_u16(), *bytes, latency);
                tracing::info!(
                    status = status.as_u16(),
                    bytes,
                    latency_ms = latency.as_secs_f64() * 1000.0,
                    "respuesta enviada"
                );
            }
            Outcome::NothingRead => {
                metrics.record_dropped();
                tracing::debug!("conexión cerrada sin request");
            }
            Outcome::WriteFailed { status, error } => {
                metrics.record_dropped();
                tracing::warn!(status = status.as_u16(), error = %error, "no se pudo enviar la respuesta");
            }
        }

        outcome
    }

    fn serve<C: Connection>(&self, conn: &mut C) -> Outcome {
        self.enter(WorkerState::Reading);
        let frame = read_frame(conn);

        match &frame.end {
            FrameEnd::TransportError(e) => {
                tracing::debug!(error = %e, bytes = frame.bytes.len(), "lectura cortada por error")
            }
            FrameEnd::SizeCapExceeded => {
                tracing::debug!(bytes = frame.bytes.len(), "request supera el tope de lectura")
            }
            FrameEnd::HeadersComplete | FrameEnd::PeerClosed => {}
        }

        if frame.is_empty() {
            return Outcome::NothingRead;
        }

        self.enter(WorkerState::Parsing);
        let response = match Request::parse(&frame.bytes) {
            Ok(request) => {
                self.enter(WorkerState::Dispatching);
                self.dispatch_guarded(&request)
            }
            Err(e) => {
                tracing::debug!(error = %e, "request inválido");
                Response::error(StatusCode::BadRequest, &e.to_string())
            }
        };

        self.enter(WorkerState::Responding);
        let status = response.status();
        match write_all_bytes(conn, &response.to_bytes()) {
            Ok(bytes) => Outcome::Responded { status, bytes },
            Err(error) => Outcome::WriteFailed { status, error },
        }
    }

    /// Un panic despachando se convierte en 500
    fn dispatch_guarded(&self, request: &Request) -> Response {
        panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(request))).unwrap_or_else(|_| {
            tracing::error!(path = request.path(), "panic despachando el request");
            Response::error(
                StatusCode::InternalServerError,
                StatusCode::InternalServerError.reason_phrase(),
            )
        })
    }

    fn dispatch(&self, request: &Request) -> Response {
        tracing::debug!(method = request.method().as_str(), path = request.path(), "request");

        match request.method() {
            Method::GET => self.context.files.serve(request.target_path()),
            _ => Response::error(StatusCode::MethodNotAllowed, "Method Not Allowed"),
        }
    }

    fn enter(&self, state: WorkerState) {
        tracing::trace!(?state, "estado");
    }
}
