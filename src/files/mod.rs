//! # Archivos estáticos
//!
//! Todo lo que pasa entre el path del request y los bytes del archivo:
//!
//! - `resolver`: path del request → path del filesystem + contención
//! - `loader`: chequeo de archivo regular y lectura completa
//! - `mime`: tabla extensión → MIME
//!
//! ```text
//! "/css/a.css" → PathResolver → <webroot>/css/a.css → loader → Response 200
//!                     │                                  │
//!                     └── 403                            └── 404 / 500
//! ```

pub mod loader;
pub mod mime;
pub mod resolver;

pub use loader::{LoadedFile, ReadFile};
pub use resolver::PathResolver;

use crate::http::{Response, StatusCode};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fallas al servir un archivo. Cada una tiene su status code.
#[derive(Debug, Error)]
pub enum ServeError {
    /// El path no se pudo resolver o escapa del webroot
    #[error("Forbidden: access denied")]
    Forbidden,

    /// No hay un archivo regular en el path resuelto
    #[error("Not Found")]
    NotFound,

    /// Error de I/O sobre un path válido y existente
    #[error("Internal Server Error: {0}")]
    Storage(#[from] io::Error),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Forbidden => StatusCode::Forbidden,
            ServeError::NotFound => StatusCode::NotFound,
            ServeError::Storage(_) => StatusCode::InternalServerError,
        }
    }
}

/// Lo que un worker usa para responder un GET
pub trait FileService: Send + Sync {
    /// Respuesta completa para el path del request
    fn serve(&self, request_path: &str) -> Response;
}

/// Resolver + loader sobre un webroot fijo
///
/// Es inmutable: se crea una vez y se comparte entre todos los workers.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    resolver: PathResolver,
    read: ReadFile,
}

impl StaticFiles {
    pub fn new(webroot: impl Into<PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(webroot),
            read: loader::read_file,
        }
    }

    #[cfg(test)]
    fn with_reader(webroot: impl Into<PathBuf>, read: ReadFile) -> Self {
        Self {
            resolver: PathResolver::new(webroot),
            read,
        }
    }

    /// Resuelve y carga el archivo de un path de request
    pub fn lookup(&self, request_path: &str) -> Result<LoadedFile, ServeError> {
        let path = self.resolver.resolve(request_path)?;
        let requested = self.resolver.map(request_path);
        loader::load(&path, &requested, self.read)
    }
}

impl FileService for StaticFiles {
    /// 200 con el archivo, o 403/404/500
    fn serve(&self, request_path: &str) -> Response {
        match self.lookup(request_path) {
            Ok(file) => {
                tracing::debug!(
                    request_path,
                    bytes = file.contents.len(),
                    mime = file.mime_type,
                    "archivo servido"
                );
                Response::file(file.contents, file.mime_type)
            }
            Err(e) => {
                match &e {
                    ServeError::Storage(io_err) => {
                        tracing::error!(request_path, error = %io_err, "error leyendo archivo")
                    }
                    _ => tracing::debug!(request_path, error = %e, "archivo no servido"),
                }
                let status = e.status();
                Response::error(status, status.reason_phrase())
            }
        }
    }
}
