//! # Logging
//! src/logging.rs
//!
//! Logging estructurado con `tracing`. El nivel se controla con `RUST_LOG`
//! (por ejemplo `RUST_LOG=static_http_server=trace` muestra los estados de
//! cada worker).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filtro cuando `RUST_LOG` no está definido
pub const DEFAULT_FILTER: &str = "static_http_server=info";

/// Instala el subscriber global. Una segunda llamada no hace nada.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init();

    if installed.is_err() {
        tracing::debug!("subscriber de tracing ya instalado");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
        tracing::info!("logging listo");
    }
}
