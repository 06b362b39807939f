//! Web framework integration surface.
//!
//! This module contains no framework-specific code. An integration converts
//! its native request into a [`MarketRequest`], runs it through a
//! [`Pipeline`] together with the routed [`Handler`], and converts the
//! resulting [`MarketResponse`] back.
//!
//! # Integration Model
//!
//! 1. Build the pipeline once at startup with [`Pipeline::from_config`].
//!    This fails when authentication is active but no secret is configured.
//! 2. Per request, build a `MarketRequest` from the method, host, path and
//!    merged query/form parameters.
//! 3. Route on [`MarketRequest::path`] *after* the request hooks have run,
//!    since the mock canvas rewrites it. In practice: route inside the
//!    handler passed to [`Pipeline::handle`].
//! 4. Wrap handlers that must only serve marketplace traffic with [`guard`].
//!
//! # Example Flow
//!
//! ```
//! use marketplace_canvas::web::{guard, Handler, MarketRequest, MarketResponse, Pipeline};
//! use marketplace_canvas::{MarketplaceConfig, MockSimulationConfig};
//!
//! let config = MarketplaceConfig::with_secret("shh").mock(MockSimulationConfig::new("demo"));
//! let pipeline = Pipeline::from_config(&config).unwrap();
//!
//! let home = guard(|request: &MarketRequest| {
//!     let hub = request.marketplace().and_then(|ctx| ctx.hub_id()).unwrap_or_default();
//!     MarketResponse::html(format!("<body>hub {}</body>", hub))
//! });
//! let router = |request: &MarketRequest| match request.path() {
//!     "/" => home.handle(request),
//!     _ => MarketResponse::new(404),
//! };
//!
//! let mut request = MarketRequest::get("req-1", "/market/42/canvas/demo/");
//! let response = pipeline.handle(&mut request, &router);
//!
//! assert_eq!(request.path(), "/");
//! assert!(response.text().unwrap().contains("hub 42"));
//! ```

mod anchor_fix;
mod debug_log;
mod gate;
mod goggles;
mod handler;
mod middleware;
mod mock;
mod request;
mod response;

pub use anchor_fix::AnchorFix;
pub use debug_log::DebugModeLogging;
pub use gate::{AuthGate, AuthOutcome};
pub use goggles::ErrorGogglesLayer;
pub use handler::{guard, named, Guarded, Handler, HandlerExt, Named};
pub use middleware::{Middleware, Pipeline};
pub use mock::MockCanvas;
pub use request::{AuthState, MarketRequest};
pub use response::MarketResponse;
