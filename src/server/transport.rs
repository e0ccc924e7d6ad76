//! # Transporte
//! src/server/transport.rs
//!
//! La conexión que maneja un worker. En producción es un `TcpStream`; en
//! tests cualquier tipo `Read + Write` sirve.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};

/// Conexión aceptada, propiedad exclusiva de un worker
pub trait Connection: Read + Write {
    /// Dirección del peer para logs
    fn peer(&self) -> String {
        "unknown".to_string()
    }

    /// Cierra la conexión. Se llama una sola vez, al final del worker.
    fn close(&mut self) {}
}

impl Connection for TcpStream {
    fn peer(&self) -> String {
        self.peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    fn close(&mut self) {
        // El peer pudo haber cerrado antes; no hay nada más que hacer
        if let Err(e) = self.shutdown(Shutdown::Both) {
            tracing::trace!(error = %e, "shutdown del socket falló");
        }
    }
}

/// Escribe todos los bytes, reintentando escrituras parciales
///
/// Retorna la cantidad de bytes escritos (siempre `bytes.len()` si es `Ok`).
pub fn write_all_bytes<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> io::Result<usize> {
    let mut written = 0;

    while written < bytes.len() {
        match writer.write(&bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "connection stopped accepting bytes",
                ))
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    writer.flush()?;
    Ok(written)
}
