use std::sync::{Once, OnceLock};
use tracing::warn;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder for the `metrics` facade. Idempotent.
///
/// No standalone exporter listener is started; the serve path renders the
/// handle in-process for `GET /metrics`.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Current metrics in Prometheus exposition format, if the recorder is up.
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}
