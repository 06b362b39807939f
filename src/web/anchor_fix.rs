use crate::error::Error;
use crate::html::AnchorRewriter;

use super::{MarketRequest, MarketResponse, Middleware};

/// Rewrites absolute-path anchors in successful marketplace responses.
///
/// Responses to requests without a marketplace context are left alone, as
/// are non-`200` responses.
#[derive(Debug, Clone)]
pub struct AnchorFix {
    rewriter: AnchorRewriter,
}

impl AnchorFix {
    /// Creates the middleware.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            rewriter: AnchorRewriter::new()?,
        })
    }
}

impl Middleware for AnchorFix {
    fn name(&self) -> &'static str {
        "anchor_fix"
    }

    fn process_response(
        &self,
        request: &MarketRequest,
        response: MarketResponse,
    ) -> MarketResponse {
        match request.marketplace() {
            Some(ctx) if response.status() == 200 => response.rewrite_body(&self.rewriter, ctx),
            _ => response,
        }
    }
}
