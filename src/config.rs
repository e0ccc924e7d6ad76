//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración inmutable del proceso, desde argumentos CLI y variables
//! de entorno. Se crea una vez al arrancar y todos los workers la leen
//! sin locks.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./static_http_server 8080 ./webroot --max-connections 128
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=9000 WEBROOT=/srv/www ./static_http_server
//! ```

use clap::Parser;
use std::time::Duration;

/// Configuración del servidor de archivos estáticos
#[derive(Debug, Clone, Parser)]
#[command(name = "static_http_server")]
#[command(about = "Servidor HTTP/1.1 de archivos estáticos, un thread por conexión")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Directorio raíz que se sirve
    #[arg(default_value = "webroot", env = "WEBROOT")]
    pub webroot: String,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Máximo de conexiones atendidas a la vez (0 = sin límite)
    #[arg(long = "max-connections", default_value = "256", env = "MAX_CONNECTIONS")]
    pub max_connections: usize,

    /// Timeout de lectura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos (0 = sin timeout)
    #[arg(long = "write-timeout-ms", default_value = "30000", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    /// Espera máxima por conexiones en curso al apagar, en milisegundos
    #[arg(long = "shutdown-grace-ms", default_value = "5000", env = "SHUTDOWN_GRACE_MS")]
    pub shutdown_grace_ms: u64,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use static_http_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.webroot.trim().is_empty() {
            return Err("Webroot must not be empty".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        Ok(())
    }
}

/// 0 significa "sin timeout"
fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            webroot: "webroot".to_string(),
            host: "0.0.0.0".to_string(),
            max_connections: 256,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
            shutdown_grace_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.webroot, "webroot");
        assert_eq!(config.max_connections, 256);
    }

    #[test]
    fn test_parse_matches_default() {
        let parsed = Config::try_parse_from(["static_http_server"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.webroot, default.webroot);
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.read_timeout_ms, default.read_timeout_ms);
    }

    #[test]
    fn test_positional_port_and_webroot() {
        let config = Config::try_parse_from(["static_http_server", "3000", "/srv/www"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.webroot, "/srv/www");
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "static_http_server",
            "--host",
            "127.0.0.1",
            "--max-connections",
            "0",
            "--read-timeout-ms",
            "0",
        ])
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Config::try_parse_from(["static_http_server", "99999"]).is_err());
        assert!(Config::try_parse_from(["static_http_server", "abc"]).is_err());
    }

    #[test]
    fn test_timeouts() {
        let config = Config::default();
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.write_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.webroot = "  ".to_string();
        assert!(config.validate().unwrap_err().contains("Webroot"));

        let mut config = Config::default();
        config.host = String::new();
        assert!(config.validate().unwrap_err().contains("Host"));
    }
}
