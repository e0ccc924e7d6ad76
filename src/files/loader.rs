//! # Carga de archivos
//! src/files/loader.rs
//!
//! Verifica que el path sea un archivo regular y lo lee completo a memoria.

use super::{mime, ServeError};
use std::fs;
use std::io;
use std::path::Path;

/// Función que lee un archivo completo
pub type ReadFile = fn(&Path) -> io::Result<Vec<u8>>;

/// Lectura real del filesystem
pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Archivo leído, listo para armar la respuesta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub contents: Vec<u8>,
    pub mime_type: &'static str,
}

/// Carga un archivo ya verificado por el resolver
///
/// `path` es el path canónico; el MIME sale de `requested`, el nombre que
/// pidió el cliente (un symlink `a.html` se sirve como `text/html`).
///
/// - No existe, es directorio o archivo especial → [`ServeError::NotFound`]
/// - Falla al abrir o leer → [`ServeError::Storage`]
pub fn load(path: &Path, requested: &Path, read: ReadFile) -> Result<LoadedFile, ServeError> {
    let is_regular_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_regular_file {
        return Err(ServeError::NotFound);
    }

    let contents = read(path)?;

    Ok(LoadedFile {
        contents,
        mime_type: mime::for_path(requested),
    })
}
