//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (con límite de concurrencia)
//! 3. Lanza un thread por conexión que lee, parsea, resuelve y responde
//! 4. Se detiene cuando se dispara el [`ShutdownHandle`]

pub mod limiter;
pub mod shutdown;
pub mod tcp;
pub mod transport;
pub mod worker;

use std::io;
use thiserror::Error;

// Re-exportar para facilitar el uso
pub use limiter::{ConnectionLimiter, Permit};
pub use shutdown::ShutdownHandle;
pub use tcp::Server;
pub use transport::Connection;
pub use worker::{ConnectionWorker, Outcome, WorkerContext, WorkerState};

/// Errores del servidor fuera de los workers
#[derive(Debug, Error)]
pub enum ServerError {
    /// No se pudo crear el socket de escucha
    #[error("cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O sobre el listener o la conexión
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}
