//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Contadores del servidor compartidos por todos los workers.
//! Es el único estado mutable entre conexiones y nunca afecta respuestas.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Máximo de latencias guardadas para percentiles
const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Conexiones aceptadas por el accept loop
    connections_accepted: u64,

    /// Workers corriendo ahora mismo
    active_connections: u64,

    /// Respuestas enviadas por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Conexiones cerradas sin respuesta (read vacío o error de transporte)
    closed_without_response: u64,

    /// Bytes escritos al socket
    bytes_written: u64,

    /// Últimas latencias en microsegundos
    latencies: VecDeque<u64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData::default())),
            start_time: Instant::now(),
        }
    }

    // Un worker que hizo panic no debe dejar las métricas inutilizables
    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registra una conexión recién aceptada y la marca activa
    pub fn connection_opened(&self) {
        let mut data = self.data();
        data.connections_accepted += 1;
        data.active_connections += 1;
    }

    /// Marca el fin de un worker
    pub fn connection_closed(&self) {
        let mut data = self.data();
        data.active_connections = data.active_connections.saturating_sub(1);
    }

    /// Registra una respuesta enviada
    pub fn record_response(&self, status_code: u16, bytes: usize, latency: Duration) {
        let mut data = self.data();

        *data.status_codes.entry(status_code).or_insert(0) += 1;
        data.bytes_written += bytes as u64;

        if data.latencies.len() >= MAX_LATENCY_SAMPLES {
            data.latencies.pop_front();
        }
        data.latencies.push_back(latency.as_micros() as u64);
    }

    /// Registra una conexión que terminó sin respuesta
    pub fn record_dropped(&self) {
        self.data().closed_without_response += 1;
    }

    pub fn active_connections(&self) -> u64 {
        self.data().active_connections
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();
        let (p50, p95, p99, avg) = calculate_percentiles(&data.latencies);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            connections_accepted: data.connections_accepted,
            active_connections: data.active_connections,
            responses: data.status_codes.values().sum(),
            status_codes: data.status_codes.clone(),
            closed_without_response: data.closed_without_response,
            bytes_written: data.bytes_written,
            latency_p50_us: p50,
            latency_p95_us: p95,
            latency_p99_us: p99,
            latency_avg_us: avg,
        }
    }

    /// Snapshot en JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Calcula percentiles de latencia: (p50, p95, p99, avg)
fn calculate_percentiles(latencies: &VecDeque<u64>) -> (u64, u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0, 0);
    }

    let mut sorted: Vec<u64> = latencies.iter().copied().collect();
    sorted.sort_unstable();

    let len = sorted.len();
    let p50 = sorted[len * 50 / 100];
    let p95 = sorted[len * 95 / 100];
    let p99 = sorted[len * 99 / 100];
    let avg = sorted.iter().sum::<u64>() / len as u64;

    (p50, p95, p99, avg)
}

/// Snapshot de métricas (para logs y uso externo)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub connections_accepted: u64,
    pub active_connections: u64,
    pub responses: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub closed_without_response: u64,
    pub bytes_written: u64,
    pub latency_p50_us: u64,
    pub latency_p95_us: u64,
    pub latency_p99_us: u64,
    pub latency_avg_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_responses() {
        let collector = MetricsCollector::new();

        collector.record_response(200, 100, Duration::from_millis(10));
        collector.record_response(200, 50, Duration::from_millis(20));
        collector.record_response(404, 20, Duration::from_millis(5));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.responses, 3);
        assert_eq!(snapshot.status_codes.get(&200), Some(&2));
        assert_eq!(snapshot.status_codes.get(&404), Some(&1));
        assert_eq!(snapshot.bytes_written, 170);
    }

    #[test]
    fn test_percentiles() {
        let collector = MetricsCollector::new();

        for i in 1..=100 {
            collector.record_response(200, 0, Duration::from_micros(i));
        }

        let snapshot = collector.snapshot();
        assert!(snapshot.latency_p50_us > 0);
        assert!(snapshot.latency_p95_us > snapshot.latency_p50_us);
        assert!(snapshot.latency_p99_us > snapshot.latency_p95_us);
    }

    #[test]
    fn test_active_connections_tracking() {
        let collector = MetricsCollector::new();

        assert_eq!(collector.active_connections(), 0);
        collector.connection_opened();
        collector.connection_opened();
        assert_eq!(collector.active_connections(), 2);

        collector.connection_closed();
        assert_eq!(collector.active_connections(), 1);
        assert_eq!(collector.snapshot().connections_accepted, 2);
    }

    #[test]
    fn test_active_connections_no_negative() {
        let collector = MetricsCollector::new();
        collector.connection_closed();
        collector.connection_closed();
        assert_eq!(collector.active_connections(), 0);
    }

    #[test]
    fn test_dropped_connections() {
        let collector = MetricsCollector::new();
        collector.record_dropped();
        assert_eq!(collector.snapshot().closed_without_response, 1);
        assert_eq!(collector.snapshot().responses, 0);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let collector = MetricsCollector::new();

        for i in 0..15_000 {
            collector.record_response(200, 1, Duration::from_micros(i));
        }

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.responses, 15_000);
        assert_eq!(collector.data().latencies.len(), MAX_LATENCY_SAMPLES);
        // Las 5000 más viejas ya salieron
        assert!(snapshot.latency_p50_us >= 5_000);
    }

    #[test]
    fn test_json_format() {
        let collector = MetricsCollector::new();
        collector.record_response(403, 10, Duration::from_millis(1));

        let value: serde_json::Value = serde_json::from_str(&collector.to_json()).unwrap();
        assert_eq!(value["responses"], 1);
        assert_eq!(value["status_codes"]["403"], 1);
    }

    #[test]
    fn test_clones_share_state() {
        let collector = MetricsCollector::new();
        let clone = collector.clone();
        clone.record_response(200, 1, Duration::from_millis(1));
        assert_eq!(collector.snapshot().responses, 1);
    }
}
