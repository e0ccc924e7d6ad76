//! # Módulo HTTP
//!
//! Implementa la parte de protocolo desde cero, sin librerías de HTTP:
//!
//! - Lectura de frames desde el socket (`frame`)
//! - Parsing de requests HTTP/1.0 y HTTP/1.1 (`request`)
//! - Construcción y serialización de responses (`response`)
//! - Tabla de status codes (`status`)
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 404 Not Found\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 15\r\n
//! Connection: close\r\n
//! \r\n
//! 404 Not Found\r\n
//! ```

pub mod frame; // Acumulación de bytes hasta \r\n\r\n
pub mod request; // Parsing de HTTP requests
pub mod response; // Construcción de HTTP responses
pub mod status; // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use frame::{read_frame, Frame, FrameEnd, MAX_REQUEST_BYTES};
pub use request::{Method, ParseError, Request, Version};
pub use response::Response;
pub use status::StatusCode;
