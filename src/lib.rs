//! # Static HTTP Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 de archivos estáticos implementado desde cero sobre
//! `std::net`: un thread por conexión, parser propio y resolución de paths
//! confinada al webroot.
//!
//! ## Arquitectura
//!
//! El flujo por conexión es siempre hacia adelante:
//!
//! ```text
//! TcpStream → frame → Request::parse → PathResolver/loader → Response → TcpStream
//! ```
//!
//! - `http`: lectura de frames, parsing de requests, responses y status codes
//! - `files`: resolución de paths, carga de archivos y tipos MIME
//! - `server`: accept loop, workers, límite de concurrencia y apagado
//! - `metrics`: contadores compartidos entre workers
//! - `config`: configuración CLI / entorno
//! - `logging`: subscriber de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use static_http_server::config::Config;
//! use static_http_server::server::Server;
//!
//! let server = Server::bind(Config::default()).expect("bind");
//! server.run().expect("run");
//! ```

pub mod config;
pub mod files;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod server;
