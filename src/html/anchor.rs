use std::borrow::Cow;

use regex::{Captures, Regex};
use url::Url;

use crate::context::MarketplaceContext;
use crate::error::Error;

use super::BodyRewriter;

/// Points absolute-path anchors at the public canvas URL.
///
/// The marketplace host rewrites form targets but leaves `<a href="/...">`
/// alone, so a click would escape the canvas. Each such href is prefixed with
/// the context's `base_url` (minus its trailing slash).
///
/// # Examples
///
/// ```
/// use marketplace_canvas::html::AnchorRewriter;
///
/// let rewriter = AnchorRewriter::new().unwrap();
/// let out = rewriter.rewrite_with_base(
///     r#"<a class="nav" href="/reports">Reports</a>"#,
///     "https://app.hubspot.com/market/42/canvas/demo/",
/// );
/// assert_eq!(
///     out,
///     r#"<a class="nav" href="https://app.hubspot.com/market/42/canvas/demo/reports">Reports</a>"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AnchorRewriter {
    anchor_re: Regex,
}

impl AnchorRewriter {
    /// Compiles the anchor pattern.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            anchor_re: Regex::new(r#"(<a\s.*?)href="(/.*?)""#)?,
        })
    }

    /// Prefixes every absolute-path href in `html` with `base_url`.
    ///
    /// Hrefs already under the canvas path of `base_url` (for example ones
    /// the mock canvas re-wrapped) are left as they are.
    pub fn rewrite_with_base<'a>(&self, html: &'a str, base_url: &str) -> Cow<'a, str> {
        let base = base_url.strip_suffix('/').unwrap_or(base_url);
        let canvas_path = canvas_path(base);
        self.anchor_re.replace_all(html, |c: &Captures| {
            let href = &c[2];
            if canvas_path.is_some_and(|path| is_under(href, path)) {
                return c[0].to_string();
            }
            format!("{}href=\"{}{}\"", &c[1], base, href)
        })
    }
}

/// Path component of `base`, or `None` when it has none.
fn canvas_path(base: &str) -> Option<&str> {
    let url = Url::parse(base).ok()?;
    let start = base.find(url.path()).filter(|_| url.path() != "/")?;
    Some(&base[start..start + url.path().len()])
}

fn is_under(href: &str, path: &str) -> bool {
    href.strip_prefix(path)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

impl BodyRewriter for AnchorRewriter {
    fn rewrite<'a>(&self, html: &'a str, ctx: &MarketplaceContext) -> Cow<'a, str> {
        match ctx.base_url() {
            Some(base_url) => self.rewrite_with_base(html, base_url),
            None => Cow::Borrowed(html),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8000/market/1/canvas/demo/";

    #[test]
    fn absolute_hrefs_are_prefixed() {
        let out = AnchorRewriter::new()
            .unwrap()
            .rewrite_with_base(r#"<a href="/a">a</a> <a id="x" href="/b?c=d">b</a>"#, BASE);
        assert_eq!(
            out,
            concat!(
                r#"<a href="http://localhost:8000/market/1/canvas/demo/a">a</a> "#,
                r#"<a id="x" href="http://localhost:8000/market/1/canvas/demo/b?c=d">b</a>"#,
            )
        );
    }

    #[test]
    fn relative_and_external_hrefs_are_kept() {
        let html = r#"<a href="next">n</a><a href="https://example.com/">e</a>"#;
        let out = AnchorRewriter::new().unwrap().rewrite_with_base(html, BASE);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn link_tags_are_not_anchors() {
        let html = r#"<link href="/style.css" />"#;
        let out = AnchorRewriter::new().unwrap().rewrite_with_base(html, BASE);
        assert_eq!(out, html);
    }

    #[test]
    fn hrefs_already_inside_the_canvas_are_kept() {
        let html = concat!(
            r#"<a href="/market/1/canvas/demo/next">n</a>"#,
            r#"<a href="/market/1/canvas/demo">h</a>"#,
        );
        let out = AnchorRewriter::new().unwrap().rewrite_with_base(html, BASE);
        assert_eq!(out, html);
    }

    #[test]
    fn sibling_paths_are_still_prefixed() {
        let out = AnchorRewriter::new()
            .unwrap()
            .rewrite_with_base(r#"<a href="/market/1/canvas/demox">x</a>"#, BASE);
        assert_eq!(
            out,
            r#"<a href="http://localhost:8000/market/1/canvas/demo/market/1/canvas/demox">x</a>"#
        );
    }

    #[test]
    fn base_without_trailing_slash_is_used_as_is() {
        let out = AnchorRewriter::new()
            .unwrap()
            .rewrite_with_base(r#"<a href="/x">x</a>"#, "http://h/c");
        assert_eq!(out, r#"<a href="http://h/c/x">x</a>"#);
    }
}
