//! # Control de admisión
//! src/server/limiter.rs
//!
//! Semáforo contado (Mutex + Condvar) que limita cuántos workers corren a
//! la vez. El accept loop pide un [`Permit`] antes de lanzar cada thread;
//! el permit se libera cuando el worker lo suelta (incluso con panic).
//!
//! Al apagar, [`ConnectionLimiter::close`] despierta a quien esté esperando
//! un lugar y desde ahí no se entregan más permits.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Límite de conexiones simultáneas. `max == 0` no limita, solo cuenta.
#[derive(Debug)]
pub struct ConnectionLimiter {
    max: usize,
    state: Mutex<LimiterState>,
    changed: Condvar,
}

#[derive(Debug, Default)]
struct LimiterState {
    active: usize,
    closed: bool,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Arc<Self> {
        Arc::new(Self {
            max,
            state: Mutex::new(LimiterState::default()),
            changed: Condvar::new(),
        })
    }

    fn state(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bloquea mientras se esté en el máximo y toma un lugar
    ///
    /// Retorna `None` si el limiter se cerró antes de conseguir lugar.
    pub fn acquire(self: &Arc<Self>) -> Option<Permit> {
        let state = self.state();
        let mut state = self
            .changed
            .wait_while(state, |s| !s.closed && self.max > 0 && s.active >= self.max)
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if state.closed {
            return None;
        }
        state.active += 1;

        Some(Permit {
            limiter: Arc::clone(self),
        })
    }

    /// Deja de entregar permits y despierta a los que esperan
    ///
    /// Los permits ya entregados siguen válidos hasta su `Drop`.
    pub fn close(&self) {
        self.state().closed = true;
        self.changed.notify_all();
    }

    pub fn active(&self) -> usize {
        self.state().active
    }

    /// Espera a que no queden permits tomados. `false` si venció el timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let state = self.state();
        let (state, _) = self
            .changed
            .wait_timeout_while(state, timeout, |s| s.active > 0)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.active == 0
    }

    fn release(&self) {
        let mut state = self.state();
        state.active = state.active.saturating_sub(1);
        self.changed.notify_all();
    }
}

/// Lugar tomado en el limiter; se libera en `Drop`
#[derive(Debug)]
pub struct Permit {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
