//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección de contadores del servidor:
//! - Conexiones aceptadas y activas
//! - Respuestas por código de estado
//! - Conexiones cerradas sin respuesta
//! - Latencias (p50, p95, p99)

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
