//! Best-effort HTML rewriting for canvas responses.
//!
//! These rewriters are regex based and mirror what the marketplace host does
//! to partner markup. They are not HTML parsers: multiple `<body>` tags,
//! nested custom tags and malformed markup are unsupported. Callers only see
//! the [`BodyRewriter`] trait, so a parser-backed implementation can replace
//! any of them later.
//!
//! A rewriter that finds nothing to do returns the input borrowed, which the
//! web layer treats as "leave the response byte-identical".

use std::borrow::Cow;

use crate::context::MarketplaceContext;

mod anchor;
mod canvas;
mod goggles;

pub use anchor::AnchorRewriter;
pub use canvas::{CanvasRewriter, DEFAULT_WRAPPER};
pub use goggles::ErrorGoggles;

/// Rewrites an HTML response body for one marketplace request.
pub trait BodyRewriter {
    /// Returns the rewritten body, or `html` unchanged when nothing applies.
    fn rewrite<'a>(&self, html: &'a str, ctx: &MarketplaceContext) -> Cow<'a, str>;
}
