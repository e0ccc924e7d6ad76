//! # Apagado
//! src/server/shutdown.rs
//!
//! Flag atómico que el accept loop consulta entre `accept()`s. Los workers
//! en curso no se interrumpen.

use super::limiter::ConnectionLimiter;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Handle clonable para pedir el apagado del servidor
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
    limiter: Arc<ConnectionLimiter>,
}

impl ShutdownHandle {
    /// `listen_addr` es la dirección real del listener; `limiter` es el
    /// que usa el accept loop para esperar lugar
    pub fn new(listen_addr: SocketAddr, limiter: Arc<ConnectionLimiter>) -> Self {
        // 0.0.0.0 / :: no sirven como destino de connect en todas las plataformas
        let ip = match listen_addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };

        Self {
            flag: Arc::new(AtomicBool::new(false)),
            wake_addr: SocketAddr::new(ip, listen_addr.port()),
            limiter,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Marca el apagado y despierta al accept loop, esté bloqueado en
    /// `accept()` o esperando lugar en el limiter
    ///
    /// Llamarlo más de una vez no hace nada extra.
    pub fn trigger(&self) {
        if self.flag.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!("apagado solicitado");
        self.limiter.close();
        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, Duration::from_secs(1)) {
            tracing::debug!(error = %e, "no se pudo despertar al accept loop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_trigger_sets_flag_and_wakes_accept() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let handle = ShutdownHandle::new(listener.local_addr().unwrap(), ConnectionLimiter::new(1));
        assert!(!handle.is_triggered());

        let clone = handle.clone();
        clone.trigger();

        assert!(handle.is_triggered());
        // La conexión de despertar quedó en el backlog
        assert!(listener.accept().is_ok());
    }

    #[test]
    fn test_unspecified_address_wakes_loopback() {
        let handle = ShutdownHandle::new("0.0.0.0:4242".parse().unwrap(), ConnectionLimiter::new(0));
        assert_eq!(handle.wake_addr, "127.0.0.1:4242".parse().unwrap());
    }

    #[test]
    fn test_trigger_twice() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let handle = ShutdownHandle::new(listener.local_addr().unwrap(), ConnectionLimiter::new(0));
        handle.trigger();
        handle.trigger();
        assert!(handle.is_triggered());
    }

    #[test]
    fn test_trigger_closes_limiter() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let limiter = ConnectionLimiter::new(0);
        let handle = ShutdownHandle::new(listener.local_addr().unwrap(), Arc::clone(&limiter));

        assert!(limiter.acquire().is_some());
        handle.trigger();
        assert!(limiter.acquire().is_none());
    }
}
