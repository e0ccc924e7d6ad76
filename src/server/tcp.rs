//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Accept loop en el thread principal; cada conexión aceptada se procesa
//! en su propio thread con un [`ConnectionWorker`]. El accept loop no
//! espera a los workers, solo limita cuántos corren a la vez.

use super::limiter::{ConnectionLimiter, Permit};
use super::shutdown::ShutdownHandle;
use super::worker::{ConnectionWorker, WorkerContext};
use super::ServerError;
use crate::config::Config;
use crate::files::StaticFiles;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Pausa después de un `accept()` fallido (ej: EMFILE) para no girar en vacío
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Servidor HTTP de archivos estáticos
pub struct Server {
    config: Arc<Config>,
    context: Arc<WorkerContext>,
    limiter: Arc<ConnectionLimiter>,
    listener: TcpListener,
    shutdown: ShutdownHandle,
    next_id: u64,
}

/// Marca la conexión como activa mientras viva
struct ActiveConnection {
    metrics: MetricsCollector,
}

impl ActiveConnection {
    fn open(metrics: &MetricsCollector) -> Self {
        metrics.connection_opened();
        Self {
            metrics: metrics.clone(),
        }
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        self.metrics.connection_closed();
    }
}

impl Server {
    /// Abre el socket de escucha
    ///
    /// Falla con [`ServerError::Bind`] si no se puede crear el listener.
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
        let local_addr = listener.local_addr()?;

        let context = WorkerContext::new(
            StaticFiles::new(config.webroot.as_str()),
            MetricsCollector::new(),
        );

        let limiter = ConnectionLimiter::new(config.max_connections);

        Ok(Self {
            shutdown: ShutdownHandle::new(local_addr, Arc::clone(&limiter)),
            limiter,
            config: Arc::new(config),
            context: Arc::new(context),
            listener,
            next_id: 0,
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Corre el accept loop hasta que se pida el apagado
    ///
    /// Al salir espera a los workers en curso como mucho
    /// `shutdown_grace_ms` y retorna las métricas finales.
    pub fn run(mut self) -> Result<MetricsSnapshot, ServerError> {
        tracing::info!(
            address = %self.local_addr()?,
            webroot = %self.config.webroot,
            max_connections = self.config.max_connections,
            "servidor escuchando"
        );

        loop {
            let accepted = self.listener.accept();

            // Lo aceptado junto con el apagado (casi siempre la conexión de
            // despertar) se cierra sin respuesta
            if self.shutdown.is_triggered() {
                if let Ok((_, peer)) = &accepted {
                    tracing::debug!(%peer, "conexión descartada por apagado");
                }
                break;
            }

            match accepted {
                Ok((stream, peer)) => {
                    // Bloquea si ya hay `max_connections` workers corriendo;
                    // `None` significa que se pidió el apagado mientras tanto
                    let Some(permit) = self.limiter.acquire() else {
                        tracing::debug!(%peer, "conexión descartada por apagado");
                        break;
                    };
                    self.spawn_worker(stream, peer, permit);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "error al aceptar conexión");
                    thread::sleep(ACCEPT_RETRY_DELAY);
                }
            }
        }

        tracing::info!(active = self.limiter.active(), "accept loop detenido");
        if !self.limiter.wait_idle(self.config.shutdown_grace()) {
            tracing::warn!(
                active = self.limiter.active(),
                "quedan conexiones en curso al vencer la espera"
            );
        }

        let metrics = self.context.metrics.clone();
        tracing::info!(metrics = %metrics.to_json(), "servidor detenido");
        Ok(metrics.snapshot())
    }

    fn spawn_worker(&mut self, stream: TcpStream, peer: SocketAddr, permit: Permit) {
        if let Err(e) = stream.set_read_timeout(self.config.read_timeout()) {
            tracing::warn!(%peer, error = %e, "no se pudo configurar el timeout de lectura");
        }
        if let Err(e) = stream.set_write_timeout(self.config.write_timeout()) {
            tracing::warn!(%peer, error = %e, "no se pudo configurar el timeout de escritura");
        }

        self.next_id += 1;
        let id = self.next_id;
        let context = Arc::clone(&self.context);
        let active = ActiveConnection::open(&context.metrics);

        tracing::debug!(id, %peer, "nueva conexión");

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let _permit = permit;
                let _active = active;
                let metrics = context.metrics.clone();

                let worker = ConnectionWorker::new(id, context);
                if panic::catch_unwind(AssertUnwindSafe(|| worker.run(stream))).is_err() {
                    metrics.record_dropped();
                    tracing::error!(id, "el worker terminó con panic");
                }
            });

        if let Err(e) = spawned {
            self.context.metrics.record_dropped();
            tracing::error!(id, error = %e, "no se pudo crear el thread del worker");
        }
    }
}
