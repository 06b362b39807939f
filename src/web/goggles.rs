use crate::error::Error;
use crate::html::ErrorGoggles;

use super::{MarketRequest, MarketResponse, Middleware};

/// Makes error pages readable inside the canvas. Installed only in debug mode.
#[derive(Debug, Clone)]
pub struct ErrorGogglesLayer {
    goggles: ErrorGoggles,
}

impl ErrorGogglesLayer {
    /// Creates the middleware with the bundled reset stylesheet.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            goggles: ErrorGoggles::new()?,
        })
    }
}

impl Middleware for ErrorGogglesLayer {
    fn name(&self) -> &'static str {
        "error_goggles"
    }

    fn process_response(
        &self,
        request: &MarketRequest,
        response: MarketResponse,
    ) -> MarketResponse {
        match request.marketplace() {
            Some(ctx) if response.status() >= 400 => {
                request.log().debug(format_args!(
                    "reformatting {} error page for the canvas",
                    response.status()
                ));
                response.rewrite_body(&self.goggles, ctx)
            }
            _ => response,
        }
    }
}
