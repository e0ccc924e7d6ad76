//! # Resolución de paths
//! src/files/resolver.rs
//!
//! Traduce el path del request a un path del filesystem y verifica que
//! quede dentro del webroot.
//!
//! ```text
//! "/"            → <webroot>/index.html
//! "/css/a.css"   → <webroot>/css/a.css
//! "/../secret"   → Forbidden
//! ```
//!
//! La verificación compara componentes de los paths canónicos, no
//! prefijos de texto: `/srv/www-evil/x` no está dentro de `/srv/www`.

use super::ServeError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Archivo que se sirve cuando el path es `/`
pub const INDEX_FILE: &str = "index.html";

/// Resolver de paths atado a un webroot
#[derive(Debug, Clone)]
pub struct PathResolver {
    webroot: PathBuf,
}

impl PathResolver {
    pub fn new(webroot: impl Into<PathBuf>) -> Self {
        Self {
            webroot: webroot.into(),
        }
    }

    pub fn webroot(&self) -> &Path {
        &self.webroot
    }

    /// Path candidato, sin verificar
    ///
    /// Los `\` cuentan como separadores, se quita un solo `/` inicial y un
    /// path vacío se reemplaza por `index.html`.
    ///
    /// # Ejemplo
    /// ```
    /// use std::path::Path;
    /// use static_http_server::files::PathResolver;
    ///
    /// let resolver = PathResolver::new("webroot");
    /// assert_eq!(resolver.map("/"), Path::new("webroot/index.html"));
    /// assert_eq!(resolver.map("/img/a.png"), Path::new("webroot/img/a.png"));
    /// ```
    pub fn map(&self, request_path: &str) -> PathBuf {
        let normalized = request_path.replace('\\', "/");
        let relative = normalized.strip_prefix('/').unwrap_or(&normalized);

        if relative.is_empty() {
            self.webroot.join(INDEX_FILE)
        } else {
            self.webroot.join(relative)
        }
    }

    /// Mapea y verifica contención
    ///
    /// Retorna el path canónico del candidato. Cualquier error al
    /// canonicalizar (webroot inexistente, directorio intermedio que no
    /// existe) se trata como [`ServeError::Forbidden`].
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, ServeError> {
        let candidate = self.map(request_path);

        let root = fs::canonicalize(&self.webroot).map_err(|e| {
            tracing::error!(webroot = %self.webroot.display(), error = %e, "webroot no se puede canonicalizar");
            ServeError::Forbidden
        })?;

        let resolved = canonicalize_candidate(&candidate).map_err(|e| {
            tracing::warn!(candidate = %candidate.display(), error = %e, "path no resoluble");
            ServeError::Forbidden
        })?;

        if !resolved.starts_with(&root) {
            tracing::warn!(
                request_path,
                resolved = %resolved.display(),
                "path fuera del webroot"
            );
            return Err(ServeError::Forbidden);
        }

        Ok(resolved)
    }
}

/// Canonicaliza el candidato aunque el archivo final no exista
///
/// Si falta el archivo se canonicaliza su directorio padre y se le vuelve
/// a pegar el nombre. Si falta el padre, error.
fn canonicalize_candidate(candidate: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(candidate) {
        Ok(path) => Ok(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let (Some(parent), Some(name)) = (candidate.parent(), candidate.file_name()) else {
                return Err(e);
            };
            Ok(fs::canonicalize(parent)?.join(name))
        }
        Err(e) => Err(e),
    }
}
