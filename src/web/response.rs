use std::borrow::Cow;

use crate::context::MarketplaceContext;
use crate::html::BodyRewriter;

/// Framework-agnostic outbound response.
///
/// Rewriters only touch bodies that are valid UTF-8; anything else passes
/// through byte-identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl MarketResponse {
    /// Creates an empty response with `status`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// A `200` response with an HTML body.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into().into_bytes())
    }

    /// An empty `401`.
    pub fn unauthorized() -> Self {
        Self::new(401)
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, if it is UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Runs `rewriter` over the body, replacing it only if something changed.
    pub(crate) fn rewrite_body(
        mut self,
        rewriter: &dyn BodyRewriter,
        ctx: &MarketplaceContext,
    ) -> Self {
        let rewritten = match self.text() {
            Some(text) => match rewriter.rewrite(text, ctx) {
                Cow::Owned(text) => Some(text),
                Cow::Borrowed(_) => None,
            },
            None => None,
        };
        if let Some(text) = rewritten {
            self.body = text.into_bytes();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_sets_status_and_content_type() {
        let response = MarketResponse::html("<p>hi</p>");
        assert_eq!(response.status(), 200);
        assert_eq!(response.text(), Some("<p>hi</p>"));
        assert_eq!(response.headers()[0].0, "Content-Type");
    }

    #[test]
    fn unauthorized_is_empty_401() {
        let response = MarketResponse::unauthorized();
        assert_eq!(response.status(), 401);
        assert!(response.body().is_empty());
    }

    #[test]
    fn binary_body_has_no_text() {
        let response = MarketResponse::new(200).with_body(vec![0xff, 0xfe]);
        assert!(response.text().is_none());
    }
}
