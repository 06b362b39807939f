//! Request adapter and the per-request marketplace slot.

use crate::context::MarketplaceContext;
use crate::error::{Rejection, RejectionKind};
use crate::logging::RequestLog;
use crate::params::Params;
use crate::signature::InvalidSignature;

/// Where a request stands with respect to marketplace authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No gate has looked at the request
    Unchecked,
    /// Authentication was switched off by the operator
    Disabled,
    /// The request carried no signature
    MissingSignature,
    /// The signature did not verify
    InvalidSignature(InvalidSignature),
    /// The signature verified but a typed parameter was malformed
    MalformedContext,
    /// A context is attached
    Authenticated,
}

impl AuthState {
    /// Explains why no context is attached, or `None` if there is nothing to reject.
    ///
    /// `Authenticated` and `Disabled` produce no rejection.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            AuthState::Authenticated | AuthState::Disabled => None,
            AuthState::Unchecked => Some(Rejection::new(
                RejectionKind::GateNotConfigured,
                "This handler requires a HubSpot Marketplace context, but the request never \
                 passed through the authentication gate. Add the gate to the middleware \
                 pipeline ahead of guarded handlers.",
            )),
            AuthState::MissingSignature => Some(Rejection::new(
                RejectionKind::MissingSignature,
                "This request did not carry a HubSpot Marketplace signature. Perhaps this \
                 handler was guarded by mistake, or the request did not come from HubSpot. \
                 When running locally, enable the mock canvas to simulate the marketplace.",
            )),
            AuthState::InvalidSignature(reason) => Some(Rejection::new(
                RejectionKind::InvalidSignature,
                format!(
                    "The HubSpot Marketplace signature on this request was rejected ({}). \
                     Check that the configured secret key matches the one HubSpot issued.",
                    reason
                ),
            )),
            AuthState::MalformedContext => Some(Rejection::new(
                RejectionKind::MalformedContext,
                "The HubSpot Marketplace signature verified but the marketplace parameters \
                 could not be parsed.",
            )),
        }
    }
}

/// Framework-agnostic view of an inbound request.
///
/// Framework integrations build a `MarketRequest` from their own request
/// type, run it through the [`Pipeline`](super::Pipeline), and read the
/// (possibly rewritten) path and the attached context back out.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::web::{AuthState, MarketRequest};
///
/// let request = MarketRequest::get("req-1", "/reports")
///     .with_host("app.example.com")
///     .with_query("hubspot.marketplace.portal_id=62515");
///
/// assert_eq!(request.params().get("hubspot.marketplace.portal_id"), Some("62515"));
/// assert_eq!(request.auth_state(), AuthState::Unchecked);
/// assert!(request.marketplace().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MarketRequest {
    request_id: String,
    method: String,
    host: String,
    path: String,
    params: Params,
    auth_state: AuthState,
    marketplace: Option<MarketplaceContext>,
}

impl MarketRequest {
    /// Creates a request with no parameters.
    pub fn new(
        request_id: impl Into<String>,
        method: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            host: host.into(),
            path: path.into(),
            params: Params::new(),
            auth_state: AuthState::Unchecked,
            marketplace: None,
        }
    }

    /// Shorthand for a `GET` against `localhost:8000`.
    pub fn get(request_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(request_id, "GET", "localhost:8000", path)
    }

    /// Replaces the host (`Host` header value, including any port).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Appends parameters parsed from a query string.
    pub fn with_query(mut self, query: &str) -> Self {
        self.params.extend(&Params::from_query(query));
        self
    }

    /// Appends parameters.
    pub fn with_params(mut self, params: &Params) -> Self {
        self.params.extend(params);
        self
    }

    /// Request identifier used in log events.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Host the request was addressed to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Current path. The mock simulator may have rewritten it.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Replaces the path seen by downstream routing.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Query and form parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Mutable access for middleware that injects parameters.
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Authentication state written by the gate.
    pub fn auth_state(&self) -> AuthState {
        self.auth_state
    }

    /// The marketplace context, present only for authenticated requests.
    pub fn marketplace(&self) -> Option<&MarketplaceContext> {
        self.marketplace.as_ref()
    }

    /// Logger stamped with this request's id and path.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(&self.request_id, &self.path)
    }

    /// Records the gate's verdict. Only the gate writes this slot.
    pub(crate) fn attach(&mut self, state: AuthState, context: Option<MarketplaceContext>) {
        self.auth_state = state;
        self.marketplace = context;
    }
}
