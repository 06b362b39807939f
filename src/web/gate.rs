//! The authentication gate.
//!
//! Per request:
//!
//! ```text
//! UNCHECKED ─ signature present? ─ no ──────────────► MissingSignature
//!                    │ yes
//!                 verify ─ invalid ─────────────────► InvalidSignature
//!                    │ valid
//!                 extract ─ malformed ──────────────► MalformedContext
//!                    │ ok
//!                    └──────────────────────────────► Authenticated (context attached)
//! ```
//!
//! The gate records its verdict on the request and, by default, lets every
//! request continue: health checks and public pages must stay reachable
//! without marketplace context. Enforcement belongs to
//! [`guard`](super::guard), unless the gate is configured to enforce.

use crate::config::MarketplaceConfig;
use crate::context::{self, MarketplaceContext, SIGNATURE_PARAM};
use crate::error::Error;
use crate::secret::SecretKey;
use crate::signature::SignatureVerifier;

use super::{AuthState, MarketRequest, MarketResponse, Middleware};

/// Result of running the gate on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The request is genuine; the context is also attached to the request
    Authenticated(MarketplaceContext),
    /// No context was attached
    Unauthenticated,
}

impl AuthOutcome {
    /// Returns `true` for [`AuthOutcome::Authenticated`].
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }
}

#[derive(Debug)]
enum GateMode {
    Disabled,
    Active {
        verifier: SignatureVerifier,
        enforce: bool,
    },
}

/// Verifies marketplace signatures and attaches the context.
#[derive(Debug)]
pub struct AuthGate {
    mode: GateMode,
}

impl AuthGate {
    /// Creates an active, non-enforcing gate.
    pub fn new(secret: SecretKey) -> Self {
        Self {
            mode: GateMode::Active {
                verifier: SignatureVerifier::new(secret),
                enforce: false,
            },
        }
    }

    /// Creates a gate that authenticates nothing and marks requests `Disabled`.
    pub fn disabled() -> Self {
        Self {
            mode: GateMode::Disabled,
        }
    }

    /// Answer `401` for unauthenticated requests instead of passing them on.
    pub fn enforcing(mut self, enforce: bool) -> Self {
        if let GateMode::Active { enforce: e, .. } = &mut self.mode {
            *e = enforce;
        }
        self
    }

    /// Builds the gate from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfiguration`] when authentication is active
    /// but no secret key is configured. Turning authentication off requires
    /// `auth.activate = false`.
    pub fn from_config(config: &MarketplaceConfig) -> Result<Self, Error> {
        if !config.auth.activate {
            tracing::error!(
                "HubSpot Marketplace request authentication is DEACTIVATED for all requests \
                 (auth.activate = false); guarded handlers will serve unauthenticated traffic"
            );
            return Ok(Self::disabled());
        }

        let secret = config.secret_key().ok_or(Error::MissingConfiguration {
            what: "auth.secret_key",
        })?;
        tracing::info!(
            enforce = config.auth.enforce,
            "HubSpot Marketplace request authentication activated"
        );
        Ok(Self::new(secret.duplicate()).enforcing(config.auth.enforce))
    }

    /// Returns `true` unless authentication was switched off.
    pub fn is_active(&self) -> bool {
        matches!(self.mode, GateMode::Active { .. })
    }

    /// Authenticates `request` and records the verdict on it.
    pub fn authenticate(&self, request: &mut MarketRequest) -> AuthOutcome {
        let verifier = match &self.mode {
            GateMode::Disabled => {
                request.attach(AuthState::Disabled, None);
                return AuthOutcome::Unauthenticated;
            }
            GateMode::Active { verifier, .. } => verifier,
        };

        let signature = request
            .params()
            .get(SIGNATURE_PARAM)
            .map(str::trim)
            .unwrap_or_default();
        if signature.is_empty() {
            request
                .log()
                .debug(format_args!("no marketplace signature on request"));
            request.attach(AuthState::MissingSignature, None);
            return AuthOutcome::Unauthenticated;
        }

        if let Err(reason) = verifier.verify(signature) {
            request
                .log()
                .warn(format_args!("marketplace signature rejected: {}", reason));
            request.attach(AuthState::InvalidSignature(reason), None);
            return AuthOutcome::Unauthenticated;
        }

        match context::extract(request.params()) {
            Ok(ctx) => {
                request.log().debug(format_args!(
                    "marketplace request authenticated for portal {:?}",
                    ctx.portal_id()
                ));
                request.attach(AuthState::Authenticated, Some(ctx.clone()));
                AuthOutcome::Authenticated(ctx)
            }
            Err(err) => {
                request
                    .log()
                    .warn(format_args!("signed marketplace parameters are malformed: {}", err));
                request.attach(AuthState::MalformedContext, None);
                AuthOutcome::Unauthenticated
            }
        }
    }
}

impl Middleware for AuthGate {
    fn name(&self) -> &'static str {
        "auth_gate"
    }

    fn process_request(&self, request: &mut MarketRequest) -> Option<MarketResponse> {
        let outcome = self.authenticate(request);
        let enforce = matches!(self.mode, GateMode::Active { enforce: true, .. });
        if enforce && !outcome.is_authenticated() {
            if let Some(rejection) = request.auth_state().rejection() {
                request
                    .log()
                    .error(format_args!("returning 401: {}", rejection));
            }
            return Some(MarketResponse::unauthorized());
        }
        None
    }
}
