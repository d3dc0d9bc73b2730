use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use creator_match::config::ModelConfig;
use creator_match::marketplace::{CannedModel, OpenAiClient, StructuredModel};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Provider-backed client when a key is configured, otherwise the canned offline model.
pub(crate) fn structured_model(config: &ModelConfig) -> Arc<dyn StructuredModel> {
    if config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; serving canned model output");
        return Arc::new(CannedModel::offline());
    }

    match OpenAiClient::new(config) {
        Ok(client) => {
            info!(model = client.model(), base_url = %config.base_url, "model provider configured");
            Arc::new(client)
        }
        Err(err) => {
            warn!(error = %err, "model client unavailable; serving canned model output");
            Arc::new(CannedModel::offline())
        }
    }
}

