//! # Static HTTP Server - Entry Point
//! src/main.rs
//!
//! `static_http_server [port] [webroot]`
//!
//! Sale con código 1 si no se puede abrir el socket y con 0 después de un
//! apagado ordenado (SIGINT / SIGTERM).

use static_http_server::config::Config;
use static_http_server::logging;
use static_http_server::server::{Server, ShutdownHandle};

fn main() {
    logging::init();

    let config = Config::new();
    tracing::info!(
        port = config.port,
        host = %config.host,
        webroot = %config.webroot,
        "configuración cargada"
    );

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "no se pudo iniciar el servidor");
            std::process::exit(1);
        }
    };

    if let Err(e) = install_signal_handlers(server.shutdown_handle()) {
        tracing::warn!(error = %e, "sin manejo de señales; el apagado ordenado no está disponible");
    }

    if let Err(e) = server.run() {
        tracing::error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}

/// SIGINT / SIGTERM disparan el apagado desde un thread dedicado
#[cfg(unix)]
fn install_signal_handlers(shutdown: ShutdownHandle) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::info!(signal, "señal recibida");
                shutdown.trigger();
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handlers(_shutdown: ShutdownHandle) -> std::io::Result<()> {
    Ok(())
}
