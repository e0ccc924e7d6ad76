//! # Tipos MIME
//! src/files/mime.rs
//!
//! Tabla fija extensión → MIME. Es constante del proceso: no se construye
//! en runtime y no necesita locks.

use std::path::Path;

/// MIME para extensiones desconocidas o archivos sin extensión
pub const DEFAULT_MIME: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("txt", "text/plain"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
];

/// Busca el MIME de una extensión (sin el punto, cualquier case)
pub fn from_extension(extension: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

/// MIME de un archivo según lo que sigue al último `.` de su nombre
///
/// # Ejemplo
/// ```
/// use std::path::Path;
/// use static_http_server::files::mime;
///
/// assert_eq!(mime::for_path(Path::new("www/index.html")), "text/html");
/// assert_eq!(mime::for_path(Path::new("www/LOGO.PNG")), "image/png");
/// assert_eq!(mime::for_path(Path::new("www/README")), mime::DEFAULT_MIME);
/// ```
pub fn for_path(path: &Path) -> &'static str {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return DEFAULT_MIME;
    };

    match name.rsplit_once('.') {
        Some((_, extension)) => from_extension(extension),
        None => DEFAULT_MIME,
    }
}
