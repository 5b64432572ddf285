//! Prometheus metrics for the explorer API.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

use dagview_explorer::ConfirmationDelays;

pub struct RpcMetrics {
    pub registry: Registry,

    /// Requests received, by route.
    pub requests: IntCounterVec,
    /// Requests that ended in an error response, by route.
    pub request_failures: IntCounterVec,
    /// Confirmation-delay computations that completed.
    pub confirmations: IntCounter,
    /// Completed computations whose unit had no stabilization point yet.
    pub not_yet_stable: IntCounter,
    /// Completed computations that ran out of main chain before a majority.
    pub quorum_not_reached: IntCounter,

    pub full_node_delay_seconds: Histogram,
    pub light_node_delay_seconds: Histogram,
}

impl RpcMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests = register_int_counter_vec_with_registry!(
            Opts::new("dagview_rpc_requests_total", "Total API requests"),
            &["route"],
            registry
        )
        .expect("failed to register requests counter");

        let request_failures = register_int_counter_vec_with_registry!(
            Opts::new(
                "dagview_rpc_request_failures_total",
                "Total API requests answered with an error"
            ),
            &["route"],
            registry
        )
        .expect("failed to register request_failures counter");

        let confirmations = register_int_counter_with_registry!(
            Opts::new(
                "dagview_confirmations_total",
                "Total confirmation-delay computations"
            ),
            registry
        )
        .expect("failed to register confirmations counter");

        let not_yet_stable = register_int_counter_with_registry!(
            Opts::new(
                "dagview_confirmations_not_yet_stable_total",
                "Computations for units without a stabilization point"
            ),
            registry
        )
        .expect("failed to register not_yet_stable counter");

        let quorum_not_reached = register_int_counter_with_registry!(
            Opts::new(
                "dagview_confirmations_quorum_not_reached_total",
                "Computations that exhausted the main chain before a witness majority"
            ),
            registry
        )
        .expect("failed to register quorum_not_reached counter");

        // 1 s to ~9 h.
        let full_node_delay_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "dagview_full_node_confirmation_delay_seconds",
                "Full-node confirmation delay in seconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 16).expect("valid buckets")),
            registry
        )
        .expect("failed to register full_node_delay_seconds histogram");

        let light_node_delay_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "dagview_light_node_confirmation_delay_seconds",
                "Light-node confirmation delay in seconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 16).expect("valid buckets")),
            registry
        )
        .expect("failed to register light_node_delay_seconds histogram");

        Self {
            registry,
            requests,
            request_failures,
            confirmations,
            not_yet_stable,
            quorum_not_reached,
            full_node_delay_seconds,
            light_node_delay_seconds,
        }
    }

    pub fn record_request(&self, route: &str) {
        self.requests.with_label_values(&[route]).inc();
    }

    pub fn record_failure(&self, route: &str) {
        self.request_failures.with_label_values(&[route]).inc();
    }

    /// Record the outcome of one confirmation-delay computation.
    pub fn observe_delays(&self, delays: &ConfirmationDelays) {
        self.confirmations.inc();
        match (
            delays.full_node_confirmation_delay,
            delays.light_node_confirmation_delay,
        ) {
            (None, _) => self.not_yet_stable.inc(),
            (Some(full), light) => {
                self.full_node_delay_seconds.observe(full as f64);
                match light {
                    Some(light) => self.light_node_delay_seconds.observe(light as f64),
                    None => self.quorum_not_reached.inc(),
                }
            }
        }
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for RpcMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_are_classified() {
        let metrics = RpcMetrics::new();
        metrics.observe_delays(&ConfirmationDelays::default());
        metrics.observe_delays(&ConfirmationDelays {
            full_node_confirmation_delay: Some(40),
            light_node_confirmation_delay: None,
        });
        metrics.observe_delays(&ConfirmationDelays {
            full_node_confirmation_delay: Some(40),
            light_node_confirmation_delay: Some(90),
        });
        assert_eq!(metrics.confirmations.get(), 3);
        assert_eq!(metrics.not_yet_stable.get(), 1);
        assert_eq!(metrics.quorum_not_reached.get(), 1);
        assert_eq!(metrics.full_node_delay_seconds.get_sample_count(), 2);
        assert_eq!(metrics.light_node_delay_seconds.get_sample_count(), 1);
    }

    #[test]
    fn encodes_text_format() {
        let metrics = RpcMetrics::new();
        metrics.record_request("unit_info");
        let text = metrics.encode().unwrap();
        assert!(text.contains("dagview_rpc_requests_total{route=\"unit_info\"} 1"));
    }
}
