//! Prometheus-style text exposition of the operation counters.
//!
//! https://prometheus.io/docs/instrumenting/exposition_formats/#text-based-format

use crate::services::CounterService;

/// Counter names exported at `/metrics`. Names the transport never
/// incremented are rendered as 0 so dashboards always see the full set.
pub const EXPOSED_METRICS: &[&str] = &[
    "ping_http",
    "healthcheck_http_called",
    "healthcheck_http_failed",
    "healthcheck_http_ok",
    "http_get_secret_called",
    "http_get_secret_not_found",
    "http_get_secret_error",
    "http_get_secret_success",
    "http_delete_secret_called",
    "http_delete_secret_not_found",
    "http_delete_secret_error",
    "http_delete_secret_success",
    "http_create_secret_called",
    "http_create_secret_malformed",
    "http_create_secret_error",
    "http_create_secret_success",
];

/// Render one `name{hostname="..."} value` line per known metric.
pub fn render_metrics(counters: &CounterService, hostname: &str) -> String {
    let mut out = String::new();
    for name in EXPOSED_METRICS {
        let value = counters.get(name).unwrap_or(0);
        out.push_str(&format!("{}{{hostname=\"{}\"}} {}\n", name, hostname, value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_counters_default_to_zero() {
        let counters = CounterService::new();
        let rendered = render_metrics(&counters, "test-host");
        assert!(rendered.contains("ping_http{hostname=\"test-host\"} 0\n"));
        assert_eq!(rendered.lines().count(), EXPOSED_METRICS.len());
    }

    #[test]
    fn test_incremented_counter_rendered() {
        let counters = CounterService::new();
        counters.increment("http_get_secret_success", 7);
        let rendered = render_metrics(&counters, "host-a");
        assert!(rendered.contains("http_get_secret_success{hostname=\"host-a\"} 7\n"));
    }
}
