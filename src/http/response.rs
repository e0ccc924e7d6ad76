//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas y convertirlas a bytes para el socket.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! Connection: keep-alive\r\n
//! Server: static_http_server/0.1\r\n
//! \r\n
//! <html></html>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use static_http_server::http::{Response, StatusCode};
//!
//! let response = Response::error(StatusCode::NotFound, "Not Found");
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
//! ```

use super::request::{find_header_end, HEADER_TERMINATOR};
use super::StatusCode;

/// Token que se envía en el header `Server`
pub const SERVER_TOKEN: &str = concat!("static_http_server/", env!("CARGO_PKG_VERSION"));

/// Versión que se escribe en la status line
const WIRE_VERSION: &str = "HTTP/1.1";

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header al final (no reemplaza duplicados)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de [`Response::with_header`]
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Establece el body y agrega `Content-Length`
    ///
    /// Si ya había un `Content-Length` se reemplaza, así el header siempre
    /// coincide con el largo del body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let length = self.body.len().to_string();

        match self
            .headers
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        {
            Some((_, value)) => *value = length,
            None => self.headers.push(("Content-Length".to_string(), length)),
        }
        self
    }

    /// Respuesta 200 con el contenido de un archivo
    ///
    /// Headers en orden: `Content-Type`, `Content-Length`, `Connection`,
    /// `Server`.
    ///
    /// # Ejemplo
    /// ```
    /// use static_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::file(b"<h1>hi</h1>".to_vec(), "text/html");
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// assert_eq!(response.header("Content-Length"), Some("11"));
    /// ```
    pub fn file(contents: Vec<u8>, mime_type: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", mime_type)
            .with_body(contents)
            .with_header("Connection", "keep-alive")
            .with_header("Server", SERVER_TOKEN)
    }

    /// Respuesta de error en texto plano
    ///
    /// El body es `"<code> <reason>\r\n"`. Si `message` aporta algo distinto
    /// de la reason phrase se agrega como segunda línea.
    ///
    /// # Ejemplo
    /// ```
    /// use static_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::MethodNotAllowed, "Method Not Allowed");
    /// assert_eq!(response.body(), b"405 Method Not Allowed\r\n");
    ///
    /// let response = Response::error(StatusCode::BadRequest, "Request is empty");
    /// assert_eq!(response.body(), b"400 Bad Request\r\nRequest is empty\r\n");
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let mut body = format!("{}\r\n", status);
        if !message.is_empty() && message != status.reason_phrase() {
            body.push_str(message);
            body.push_str("\r\n");
        }

        Self::new(status)
            .with_header("Content-Type", "text/plain")
            .with_body(body.into_bytes())
            .with_header("Connection", "close")
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Name: Value\r\n` en orden de inserción
    /// - Línea vacía: `\r\n`
    /// - Body: bytes sin transformar
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("{} {}\r\n", WIRE_VERSION, self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Parsea una respuesta serializada (lado cliente)
    ///
    /// Devuelve `None` si falta el terminador o la status line no trae un
    /// código de la tabla. El body es todo lo posterior al terminador.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let blank_line = find_header_end(bytes)?;
        let head = std::str::from_utf8(&bytes[..blank_line]).ok()?;
        let mut lines = head.split("\r\n");

        let status_line = lines.next()?;
        let mut parts = status_line.splitn(3, ' ');
        let _version = parts.next()?;
        let code: u16 = parts.next()?.parse().ok()?;
        let status = StatusCode::from_u16(code)?;

        let headers = lines
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        Some(Self {
            status,
            headers,
            body: bytes[blank_line + HEADER_TERMINATOR.len()..].to_vec(),
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Primer header con ese nombre (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
