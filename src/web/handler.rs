//! Request handlers and the marketplace guard.
//!
//! The gate only *detects* marketplace traffic. Endpoints that must only
//! serve marketplace traffic wrap their handler with [`guard`]:
//!
//! ```
//! use marketplace_canvas::web::{guard, Handler, MarketRequest, MarketResponse};
//!
//! fn dashboard(request: &MarketRequest) -> MarketResponse {
//!     let portal = request.marketplace().and_then(|ctx| ctx.portal_id());
//!     MarketResponse::html(format!("<body>portal {:?}</body>", portal))
//! }
//!
//! let guarded = guard(dashboard);
//!
//! // Never passed through the gate, so the guard answers 401 itself.
//! let response = guarded.handle(&MarketRequest::get("req-1", "/dashboard"));
//! assert_eq!(response.status(), 401);
//! ```

use crate::error::{Rejection, RejectionKind};

use super::{AuthState, MarketRequest, MarketResponse};

/// Something that turns a request into a response.
///
/// Implemented for every `Fn(&MarketRequest) -> MarketResponse`.
pub trait Handler {
    /// Handles one request.
    fn handle(&self, request: &MarketRequest) -> MarketResponse;

    /// Name used in diagnostics and by routing introspection.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Handler for F
where
    F: Fn(&MarketRequest) -> MarketResponse,
{
    fn handle(&self, request: &MarketRequest) -> MarketResponse {
        self(request)
    }
}

/// A handler with an explicit name.
#[derive(Debug, Clone)]
pub struct Named<H> {
    name: String,
    inner: H,
}

/// Gives `handler` a stable name instead of its type name.
pub fn named<H: Handler>(name: impl Into<String>, handler: H) -> Named<H> {
    Named {
        name: name.into(),
        inner: handler,
    }
}

impl<H: Handler> Handler for Named<H> {
    fn handle(&self, request: &MarketRequest) -> MarketResponse {
        self.inner.handle(request)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A handler that only runs for authenticated marketplace requests.
///
/// Created by [`guard`] or [`HandlerExt::guarded`].
#[derive(Debug, Clone)]
pub struct Guarded<H> {
    inner: H,
}

/// Wraps `handler` so it answers `401` unless a marketplace context is attached.
///
/// Requests whose gate was deliberately deactivated are let through with a
/// warning. The wrapper reports the inner handler's name.
pub fn guard<H: Handler>(handler: H) -> Guarded<H> {
    Guarded { inner: handler }
}

impl<H> Guarded<H> {
    /// The wrapped handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: Handler> Handler for Guarded<H> {
    fn handle(&self, request: &MarketRequest) -> MarketResponse {
        let log = request.log();
        match request.auth_state() {
            AuthState::Authenticated if request.marketplace().is_some() => {
                self.inner.handle(request)
            }
            AuthState::Disabled => {
                log.warn(format_args!(
                    "marketplace authentication is deactivated; '{}' served without a context",
                    self.inner.name()
                ));
                self.inner.handle(request)
            }
            state => {
                let rejection = state.rejection().unwrap_or_else(|| {
                    Rejection::new(
                        RejectionKind::GateNotConfigured,
                        "no marketplace context attached",
                    )
                });
                log.error(format_args!(
                    "rejecting request to '{}' with 401: {}",
                    self.inner.name(),
                    rejection
                ));
                MarketResponse::unauthorized()
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Combinators available on every handler.
pub trait HandlerExt: Handler + Sized {
    /// Same as [`guard`].
    fn guarded(self) -> Guarded<Self> {
        guard(self)
    }
}

impl<H: Handler> HandlerExt for H {}
