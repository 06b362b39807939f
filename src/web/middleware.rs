//! Middleware chaining.
//!
//! ```text
//! inbound request
//!   ↓  process_request, in order      (mock rewrites path, gate attaches context)
//! handler (optionally guarded)
//!   ↓  process_response, in reverse   (canvas wrapper, 5xx logging, goggles, anchor fix)
//! outbound response
//! ```
//!
//! A request hook may short-circuit by returning a response. The handler and
//! the remaining request hooks are then skipped, but the response hooks of
//! every middleware already entered still run.

use crate::config::MarketplaceConfig;
use crate::error::Error;

use super::{
    AnchorFix, AuthGate, DebugModeLogging, ErrorGogglesLayer, Handler, MarketRequest,
    MarketResponse, MockCanvas,
};

/// One stage of request/response processing.
///
/// Implementations hold only immutable state built at startup, so a single
/// pipeline can serve concurrent requests.
pub trait Middleware: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Inspects or mutates the request. Returning a response ends the request phase.
    fn process_request(&self, _request: &mut MarketRequest) -> Option<MarketResponse> {
        None
    }

    /// Inspects or replaces the response.
    fn process_response(
        &self,
        _request: &MarketRequest,
        response: MarketResponse,
    ) -> MarketResponse {
        response
    }
}

/// An ordered middleware stack.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::web::{guard, MarketRequest, MarketResponse, Pipeline};
/// use marketplace_canvas::{signature, MarketplaceConfig};
///
/// let pipeline = Pipeline::from_config(&MarketplaceConfig::with_secret("shh")).unwrap();
///
/// let token = signature::sign(b"shh", b"payload");
/// let mut request = MarketRequest::get("req-1", "/home")
///     .with_query(&format!(
///         "hubspot.marketplace.signature={}&hubspot.marketplace.portal_id=7",
///         token
///     ));
///
/// let handler = guard(|request: &MarketRequest| {
///     let ctx = request.marketplace().unwrap();
///     MarketResponse::html(format!("hub {}", ctx.hub_id().unwrap()))
/// });
///
/// let response = pipeline.handle(&mut request, &handler);
/// assert_eq!(response.text(), Some("hub 7"));
/// ```
#[derive(Default)]
pub struct Pipeline {
    layers: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. Earlier layers see the request first and the response last.
    pub fn layer(mut self, middleware: impl Middleware + 'static) -> Self {
        self.layers.push(Box::new(middleware));
        self
    }

    /// Assembles the standard stack from configuration.
    ///
    /// Order: anchor fix, error goggles (debug only), debug mode logging
    /// (debug only, unless switched off), mock canvas (when configured and
    /// allowed), authentication gate. Responses pass through them in reverse,
    /// so the logger sees a server error before the goggles restyle it.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::MissingConfiguration`] from the gate or the mock,
    /// and template or pattern failures from the rewriters.
    pub fn from_config(config: &MarketplaceConfig) -> Result<Self, Error> {
        let mut pipeline = Self::new().layer(AnchorFix::new()?);
        if config.debug {
            pipeline = pipeline.layer(ErrorGogglesLayer::new()?);
        }
        if let Some(logging) = DebugModeLogging::from_config(config) {
            pipeline = pipeline.layer(logging);
        }
        if let Some(mock) = MockCanvas::from_config(config)? {
            pipeline = pipeline.layer(mock);
        }
        Ok(pipeline.layer(AuthGate::from_config(config)?))
    }

    /// Names of the installed layers, in request order.
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Runs `request` through every layer and `handler`.
    pub fn handle<H: Handler + ?Sized>(
        &self,
        request: &mut MarketRequest,
        handler: &H,
    ) -> MarketResponse {
        let mut entered = 0;
        let mut short_circuit = None;
        for layer in &self.layers {
            entered += 1;
            if let Some(response) = layer.process_request(request) {
                request.log().debug(format_args!(
                    "{} answered the request before the handler",
                    layer.name()
                ));
                short_circuit = Some(response);
                break;
            }
        }

        let mut response = match short_circuit {
            Some(response) => response,
            None => handler.handle(request),
        };
        for layer in self.layers[..entered].iter().rev() {
            response = layer.process_response(request, response);
        }
        response
    }
}
