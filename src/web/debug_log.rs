use crate::config::MarketplaceConfig;

use super::{MarketRequest, MarketResponse, Middleware};

/// Longest body excerpt written to the log, in characters.
const MAX_EXCERPT: usize = 2048;

/// Logs server errors at error level while debug mode is on.
///
/// Debug error pages are shown in the browser, so they are easy to miss on
/// a shared QA box. This layer records every `5xx` response with an excerpt
/// of its body, whether or not the request came from the marketplace.
#[derive(Debug, Clone, Default)]
pub struct DebugModeLogging;

impl DebugModeLogging {
    /// Creates the middleware.
    pub fn new() -> Self {
        Self
    }

    /// Builds the middleware when `debug` is set and `debug_mode_logging`
    /// was not switched off. Either way the decision is logged at info.
    pub fn from_config(config: &MarketplaceConfig) -> Option<Self> {
        if !config.debug {
            tracing::info!("debug mode logging is off: not in debug mode");
            return None;
        }
        if !config.debug_mode_logging {
            tracing::info!("debug mode logging was explicitly turned off");
            return None;
        }
        tracing::info!("debug mode logging activated");
        Some(Self::new())
    }
}

impl Middleware for DebugModeLogging {
    fn name(&self) -> &'static str {
        "debug_mode_logging"
    }

    fn process_response(
        &self,
        request: &MarketRequest,
        response: MarketResponse,
    ) -> MarketResponse {
        if response.status() >= 500 {
            let excerpt: String = response
                .text()
                .unwrap_or("<binary body>")
                .chars()
                .take(MAX_EXCERPT)
                .collect();
            request.log().error(format_args!(
                "{} {} answered {}: {}",
                request.method(),
                request.path(),
                response.status(),
                excerpt
            ));
        }
        response
    }
}
