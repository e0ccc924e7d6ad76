//! # Parsing de Requests HTTP/1.x
//! src/http/request.rs
//!
//! Parser de requests HTTP/1.0 y HTTP/1.1 escrito desde cero.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/8.5.0\r\n
//! \r\n
//! <body opcional, bytes crudos>
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD PATH VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea), en orden de llegada
//! 3. **Empty Line**: `\r\n\r\n` termina el bloque de headers
//! 4. **Body**: todo lo que viene después del terminador, sin tocar
//!
//! El parser nunca hace panic: cualquier falla se devuelve como
//! [`ParseError`], cuyo `Display` es el mensaje que viaja en el 400.

use thiserror::Error;

/// Terminador del bloque de headers
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Posición del primer `\r\n\r\n` en el buffer, si existe
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Métodos HTTP aceptados por el parser
///
/// Solo GET se despacha; el resto responde 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
}

impl Method {
    /// Parsea un método ya normalizado a mayúsculas
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

/// Versiones HTTP aceptadas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            _ => Err(ParseError::UnsupportedVersion(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Buffer vacío
    #[error("Request is empty")]
    EmptyRequest,

    /// No llegó el `\r\n\r\n`
    #[error("Request incomplete: no blank line found")]
    IncompleteRequest,

    /// La request line no tiene exactamente 3 tokens
    #[error("Request line must have 3 tokens (METHOD PATH VERSION)")]
    InvalidRequestLine,

    #[error("Unsupported HTTP version: {0}")]
    UnsupportedVersion(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Request path must start with /")]
    InvalidPath,

    #[error("Invalid request: missing method or path")]
    MissingMethodOrPath,
}

/// Representa un request HTTP ya validado
///
/// Un `Request` construido por [`Request::parse`] siempre tiene método,
/// versión y path dentro de sus conjuntos válidos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path tal como vino en la request line (ej: "/img/logo.png?v=2")
    path: String,

    /// Versión HTTP
    version: Version,

    /// Headers en orden de llegada; nombres en minúsculas, duplicados incluidos
    headers: Vec<(String, String)>,

    /// Bytes posteriores al terminador, sin transformar
    body: Vec<u8>,
}

impl Request {
    /// Construye un request a mano (clientes de prueba, round-trips)
    pub fn new(method: Method, path: &str, version: Version) -> Self {
        Self {
            method,
            path: path.to_string(),
            version,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header; el nombre se guarda en minúsculas como en el parser
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.body = body.to_vec();
        self
    }

    /// Parsea un request HTTP/1.x desde bytes
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request válido
    /// * `Err(ParseError)` - Motivo del rechazo (se responde con 400)
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use static_http_server::http::{Method, Request};
    ///
    /// let raw = b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.path(), "/index.html");
    /// assert_eq!(request.header("HOST"), Some("x"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let blank_line = find_header_end(buffer).ok_or(ParseError::IncompleteRequest)?;

        // Headers como texto, body como bytes crudos
        let head = String::from_utf8_lossy(&buffer[..blank_line]);
        let body = buffer[blank_line + HEADER_TERMINATOR.len()..].to_vec();

        let mut lines = head.split("\r\n");

        // 1. Request line
        let request_line = lines.next().unwrap_or_default();
        let (method, path, version) = Self::parse_request_line(request_line)?;

        // 2. Headers
        let headers = Self::parse_headers(lines);

        // 3. Chequeo final (ya garantizado por la request line)
        if path.is_empty() {
            return Err(ParseError::MissingMethodOrPath);
        }

        Ok(Request {
            method,
            path,
            version,
            headers,
            body,
        })
    }

    /// Parsea la request line: `METHOD PATH VERSION`
    ///
    /// Los espacios repetidos no generan tokens vacíos.
    fn parse_request_line(line: &str) -> Result<(Method, String, Version), ParseError> {
        let parts: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let version = Version::from_str(parts[2])?;
        let method = Method::from_str(&parts[0].to_ascii_uppercase())?;

        let path = parts[1];
        if !path.starts_with('/') {
            return Err(ParseError::InvalidPath);
        }

        Ok((method, path.to_string(), version))
    }

    /// Parsea los headers. Las líneas sin `:` se ignoran.
    fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        for line in lines {
            let Some(colon_pos) = line.find(':') else {
                continue;
            };

            let name = line[..colon_pos].trim().to_ascii_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            headers.push((name, value));
        }

        headers
    }

    /// Serializa el request al formato de wire
    ///
    /// Es el inverso de [`Request::parse`], salvo por el case de los nombres
    /// de header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();

        let request_line = format!(
            "{} {} {}\r\n",
            self.method.as_str(),
            self.path,
            self.version.as_str()
        );
        result.extend_from_slice(request_line.as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);
        result
    }

    // === Accessors ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path sin `?query` ni `#fragment`
    ///
    /// ```
    /// use static_http_server::http::Request;
    ///
    /// let request = Request::parse(b"GET /a/b.css?v=3 HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(request.target_path(), "/a/b.css");
    /// ```
    pub fn target_path(&self) -> &str {
        let end = self.path.find(['?', '#']).unwrap_or(self.path.len());
        &self.path[..end]
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Todos los headers, en orden de llegada
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

    /// Todos los valores de un header repetido, en orden
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = Request::parse(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), Version::Http11);
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_parse_http10() {
        let request = Request::parse(b"GET /index.html HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(request.version(), Version::Http10);
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_all_methods_accepted() {
        for method in ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS"] {
            let raw = format!("{} /x HTTP/1.1\r\n\r\n", method);
            let request = Request::parse(raw.as_bytes()).unwrap();
            assert_eq!(request.method().as_str(), method);
        }
    }

    #[test]
    fn test_method_is_uppercased() {
        let request = Request::parse(b"get /x HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.method(), Method::GET);
    }

    #[test]
    fn test_headers_lowercased_ordered_with_duplicates() {
        let raw = b"GET / HTTP/1.1\r\nHost: a\r\nX-Tag:  one \r\nACCEPT: */*\r\nx-tag: two\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        let names: Vec<&str> = request.headers().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["host", "x-tag", "accept", "x-tag"]);
        assert_eq!(request.header("X-TAG"), Some("one"));
        assert_eq!(request.header_values("x-tag"), vec!["one", "two"]);
    }

    #[test]
    fn test_header_value_keeps_later_colons() {
        let request = Request::parse(b"GET / HTTP/1.1\r\nHost: localhost:8080\r\n\r\n").unwrap();
        assert_eq!(request.header("host"), Some("localhost:8080"));
    }

    #[test]
    fn test_header_without_colon_is_skipped() {
        let raw = b"GET / HTTP/1.1\r\nnot a header\r\nHost: x\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("host"), Some("x"));
    }

    #[test]
    fn test_body_is_verbatim() {
        let raw = b"POST /upload HTTP/1.1\r\nContent-Length: 6\r\n\r\n\x00\r\n\r\nz";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.body(), b"\x00\r\n\r\nz");
    }

    #[test]
    fn test_repeated_spaces_in_request_line() {
        let request = Request::parse(b"GET  /a   HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/a");
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b""), Err(ParseError::EmptyRequest));
    }

    #[test]
    fn test_incomplete_request() {
        let result = Request::parse(b"GET / HTTP/1.1\r\nHost: x\r\n");
        assert_eq!(result, Err(ParseError::IncompleteRequest));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Request incomplete: no blank line found"
        );
    }

    #[test]
    fn test_invalid_request_line() {
        assert_eq!(Request::parse(b"GET\r\n\r\n"), Err(ParseError::InvalidRequestLine));
        assert_eq!(
            Request::parse(b"GET / HTTP/1.1 extra\r\n\r\n"),
            Err(ParseError::InvalidRequestLine)
        );
        assert_eq!(Request::parse(b"\r\n\r\n"), Err(ParseError::InvalidRequestLine));
    }

    #[test]
    fn test_invalid_version() {
        let result = Request::parse(b"GET /x HTTP/9.9\r\n\r\n");
        assert_eq!(result, Err(ParseError::UnsupportedVersion("HTTP/9.9".into())));
        assert_eq!(result.unwrap_err().to_string(), "Unsupported HTTP version: HTTP/9.9");
    }

    #[test]
    fn test_version_checked_before_method() {
        let result = Request::parse(b"BREW /x HTTP/2.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_invalid_method() {
        let result = Request::parse(b"patch /x HTTP/1.1\r\n\r\n");
        assert_eq!(result, Err(ParseError::UnsupportedMethod("PATCH".into())));
        assert_eq!(result.unwrap_err().to_string(), "Unsupported HTTP method: PATCH");
    }

    #[test]
    fn test_path_must_start_with_slash() {
        let result = Request::parse(b"GET index.html HTTP/1.1\r\n\r\n");
        assert_eq!(result, Err(ParseError::InvalidPath));
        assert_eq!(result.unwrap_err().to_string(), "Request path must start with /");
    }

    #[test]
    fn test_target_path_strips_query_and_fragment() {
        let request = Request::parse(b"GET /docs/a.html#top HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.target_path(), "/docs/a.html");
        assert_eq!(request.path(), "/docs/a.html#top");
    }

    #[test]
    fn test_non_utf8_header_bytes_do_not_fail() {
        let raw = b"GET /x HTTP/1.1\r\nX-Bin: \xff\xfe\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert!(request.header("x-bin").is_some());
    }

    #[test]
    fn test_round_trip() {
        let samples = vec![
            Request::new(Method::GET, "/", Version::Http11).with_header("Host", "x"),
            Request::new(Method::POST, "/form?a=1", Version::Http10)
                .with_header("Content-Type", "text/plain")
                .with_header("X-Dup", "1")
                .with_header("X-Dup", "2")
                .with_body(b"hello\r\nworld"),
            Request::new(Method::OPTIONS, "/deep/path/file.bin", Version::Http11)
                .with_body(&[0, 159, 146, 150]),
        ];

        for original in samples {
            let parsed = Request::parse(&original.to_bytes()).unwrap();
            assert_eq!(parsed, original);
        }
    }
}
