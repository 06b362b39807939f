//! HubSpot Marketplace canvas integration for web applications.
//!
//! The marketplace serves partner apps inside a "canvas": it forwards each
//! request with a signed set of `hubspot.marketplace.*` parameters and wraps
//! the returned HTML in the HubSpot shell. This crate provides:
//! - **Signature verification**: HMAC-SHA1 tokens checked in constant time
//! - **Context extraction**: typed access to the forwarded portal, app and user
//! - **Web pipeline**: an authentication gate, a guard for protected handlers
//!   and response rewriters
//! - **Local simulation**: a mock canvas that signs requests and wraps
//!   responses the way the real host does
//!
//! # Core Types
//!
//! - [`SignatureVerifier`]: Verifies `<digest>.<payload>` tokens
//! - [`MarketplaceContext`]: Normalized view of the marketplace parameters
//! - [`MarketplaceConfig`]: Startup configuration, usually loaded from TOML
//! - [`web::Pipeline`]: Ordered middleware stack around a [`web::Handler`]
//! - [`SecretKey`]: Wrapper that redacts the shared secret in logs/output
//!
//! # Examples
//!
//! ```
//! use marketplace_canvas::{context, signature, Params, SecretKey, SignatureVerifier};
//!
//! let verifier = SignatureVerifier::new(SecretKey::new("shh"));
//! let token = signature::sign(b"shh", b"payload");
//! assert!(verifier.verify(&token).is_ok());
//!
//! let params = Params::from_query(
//!     "hubspot.marketplace.portal_id=62515&hubspot.marketplace.is_mock=TRUE",
//! );
//! let ctx = context::extract(&params).unwrap();
//! assert_eq!(ctx.hub_id(), Some(62515));
//! assert!(ctx.is_mock());
//! assert_eq!(context::normalize_key("hubspot.marketplace.app.name").as_deref(), Some("app_name"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod context;
mod error;
pub mod html;
mod logging;
mod params;
mod secret;
pub mod signature;
pub mod web;

pub use config::{AuthConfig, MarketplaceConfig, MockApp, MockSimulationConfig, MockUser};
pub use context::{AppInfo, MarketplaceContext, ParamValue, UserInfo};
pub use error::{Error, Rejection, RejectionKind};
pub use logging::RequestLog;
pub use params::Params;
pub use secret::SecretKey;
pub use signature::{InvalidSignature, SignatureVerifier, VerifiedSignature};
