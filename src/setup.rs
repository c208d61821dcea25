use log::debug;
use crate::config::Config;
use crate::error::Error;
use crate::llm::openai::HttpTransport;

/// Build the HTTP transport for the resolved config.
pub fn build_transport(cfg: &Config) -> Result<HttpTransport, Error> {
    debug!(
        "Using preset {} with model {} (timeout {}s, budget {} chars)",
        cfg.preset.as_str(),
        cfg.request.model,
        cfg.timeout.as_secs(),
        cfg.max_chars
    );

    HttpTransport::new(cfg.api_key.clone(), &cfg.api_base_url, cfg.timeout)
}
