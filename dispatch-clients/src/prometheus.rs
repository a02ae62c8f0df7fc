//! Telemetry Gateway: concurrent PromQL queries against a DCGM-exporting
//! Prometheus server (spec §4.1).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::Instrument;

use crate::{Error, Result};

/// The five DCGM metrics the Telemetry Gateway pulls on every snapshot, in
/// the order spec §4.1 lists them.
pub const METRICS: [&str; 5] = [
    "DCGM_FI_DEV_FB_FREE",
    "DCGM_FI_DEV_FB_USED",
    "DCGM_FI_DEV_GPU_TEMP",
    "DCGM_FI_DEV_GPU_UTIL",
    "DCGM_FI_DEV_POWER_USAGE",
];

/// One Prometheus sample, tagged with the labels the inventory builder
/// joins on.
#[derive(Debug, Clone)]
pub struct Sample {
    /// `kubernetes_node` label.
    pub node: String,
    /// `gpu` label (cuda index, as reported).
    pub gpu_index: u32,
    /// `UUID` label.
    pub uuid: String,
    /// `modelName` label.
    pub model_name: String,
    /// The scalar value, not yet truncated to an integer.
    pub value: f64,
}

/// Raw per-metric result sets from one snapshot, keyed by PromQL metric
/// name, in query order.
#[derive(Debug, Clone, Default)]
pub struct TelemetryBundle {
    /// `(metric_name, samples)` pairs, one per entry in [`METRICS`].
    pub results: Vec<(&'static str, Vec<Sample>)>,
}

/// A source of GPU telemetry. Implemented by [`PrometheusClient`] for
/// production use and by test fakes for unit tests (§8's "explicit,
/// testable construction" requirement).
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Pull a fresh batch of telemetry across all five metrics.
    async fn snapshot(&self) -> Result<TelemetryBundle>;
}

/// Configuration for [`PrometheusClient`].
#[derive(Debug, Clone)]
pub struct PrometheusConfig {
    /// Base URL of the Prometheus server, e.g. `http://prometheus:9090`.
    pub url: String,
    /// Deadline for the whole batch of five queries. Default 60s (spec §4.1).
    pub timeout: Duration,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9090".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Prometheus HTTP client issuing the five DCGM queries concurrently.
pub struct PrometheusClient {
    http: reqwest::Client,
    config: PrometheusConfig,
}

impl PrometheusClient {
    /// Build a client from configuration, reusing the given `reqwest::Client`
    /// (shared across tasks, per §5).
    pub fn new(http: reqwest::Client, config: PrometheusConfig) -> Self {
        Self { http, config }
    }

    async fn query_one(&self, metric: &'static str) -> Result<Vec<Sample>> {
        let url = format!("{}/api/v1/query", self.config.url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .query(&[("query", metric)])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string(), e.status().map(|s| s.as_u16())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TelemetryQuery {
                query: metric.to_string(),
                reason: format!("Prometheus returned {status}"),
            });
        }

        let parsed: PromResponse = response
            .json()
            .await
            .map_err(|e| Error::TelemetryQuery {
                query: metric.to_string(),
                reason: e.to_string(),
            })?;

        parsed
            .data
            .result
            .into_iter()
            .map(|r| {
                let gpu_index: u32 = r.metric.gpu.parse().map_err(|_| Error::TelemetryQuery {
                    query: metric.to_string(),
                    reason: format!("non-numeric gpu label {:?}", r.metric.gpu),
                })?;
                let value: f64 = r.value.1.parse().map_err(|_| Error::TelemetryQuery {
                    query: metric.to_string(),
                    reason: format!("non-numeric value {:?}", r.value.1),
                })?;
                Ok(Sample {
                    node: r.metric.kubernetes_node,
                    gpu_index,
                    uuid: r.metric.uuid,
                    model_name: r.metric.model_name,
                    value,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TelemetrySource for PrometheusClient {
    async fn snapshot(&self) -> Result<TelemetryBundle> {
        let queries = METRICS
            .iter()
            .map(|&metric| self.query_one(metric).instrument(tracing::debug_span!("prometheus_query", metric)));

        let fut = futures::future::try_join_all(queries);
        let results = tokio::time::timeout(self.config.timeout, fut)
            .await
            .map_err(|_| Error::TelemetryQuery {
                query: "batch".to_string(),
                reason: format!("exceeded {:?} deadline", self.config.timeout),
            })??;

        Ok(TelemetryBundle {
            results: METRICS.into_iter().zip(results).collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PromResponse {
    data: PromData,
}

#[derive(Debug, Deserialize)]
struct PromData {
    result: Vec<PromResult>,
}

#[derive(Debug, Deserialize)]
struct PromResult {
    metric: PromMetric,
    value: (f64, String),
}

#[derive(Debug, Deserialize)]
struct PromMetric {
    kubernetes_node: String,
    gpu: String,
    #[serde(rename = "UUID")]
    uuid: String,
    #[serde(rename = "modelName")]
    model_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A fixed-response fake, standing in for the trait-based mock the
    /// orchestrator's tests use (spec §8's Telemetry Gateway is exercised
    /// here only through its label-parsing, which does not need a live
    /// server).
    #[test]
    fn metric_order_matches_spec() {
        assert_eq!(
            METRICS,
            [
                "DCGM_FI_DEV_FB_FREE",
                "DCGM_FI_DEV_FB_USED",
                "DCGM_FI_DEV_GPU_TEMP",
                "DCGM_FI_DEV_GPU_UTIL",
                "DCGM_FI_DEV_POWER_USAGE",
            ]
        );
    }
}
