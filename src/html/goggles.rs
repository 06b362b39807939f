use std::borrow::Cow;

use regex::{NoExpand, Regex};

use crate::context::MarketplaceContext;
use crate::error::Error;

use super::BodyRewriter;

const RESET_CSS: &str = include_str!("../../assets/error_goggles_reset.css");

/// Makes framework error pages readable inside the canvas.
///
/// Debug error pages keep their styling and scripts in `<head>`, which the
/// canvas throws away. This rewriter hoists the head's
/// `<style type="text/css">` and `<script type="text/javascript">` blocks
/// into the body, wraps the original body in `<div class="hsmpdjerr">`, and
/// prepends a reset stylesheet so host styles do not bleed in.
///
/// Pages lacking either `<head>` or `<body>` are returned untouched.
#[derive(Debug, Clone)]
pub struct ErrorGoggles {
    head_re: Regex,
    body_re: Regex,
    style_re: Regex,
    script_re: Regex,
    reset_css: String,
}

impl ErrorGoggles {
    /// Compiles the patterns with the bundled reset stylesheet.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            head_re: Regex::new(r"(?s)<head>(.*?)</head>")?,
            body_re: Regex::new(r"(?s)<body>(.*?)</body>")?,
            style_re: Regex::new(r#"(?s)<style type="text/css">(.*?)</style>"#)?,
            script_re: Regex::new(r#"(?s)<script type="text/javascript">(.*?)</script>"#)?,
            reset_css: RESET_CSS.to_string(),
        })
    }

    /// Reformats a full error page.
    pub fn reformat<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let head = self.head_re.captures(html).and_then(|c| c.get(1));
        let body = self.body_re.captures(html).and_then(|c| c.get(1));
        let (Some(head), Some(body)) = (head, body) else {
            return Cow::Borrowed(html);
        };
        let head = head.as_str();

        let mut body = format!("<div class=\"hsmpdjerr\">{}</div>", body.as_str());
        for style in self.style_re.captures_iter(head) {
            body = format!("<style type=\"text/css\">{}</style>{}", &style[1], body);
        }
        body = format!("<style type=\"text/css\">{}</style>{}", self.reset_css, body);
        for script in self.script_re.captures_iter(head) {
            body = format!(
                "<script type=\"text/javascript\">{}</script>{}",
                &script[1], body
            );
        }

        let replacement = format!("<body>{}</body>", body);
        Cow::Owned(
            self.body_re
                .replace_all(html, NoExpand(&replacement))
                .into_owned(),
        )
    }
}

impl BodyRewriter for ErrorGoggles {
    fn rewrite<'a>(&self, html: &'a str, _ctx: &MarketplaceContext) -> Cow<'a, str> {
        self.reformat(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_wrapped_with_reset_styles() {
        let goggles = ErrorGoggles::new().unwrap();
        let out = goggles.reformat("<html><head></head><body>Traceback</body></html>");

        assert!(out.contains("<div class=\"hsmpdjerr\">Traceback</div>"));
        assert!(out.contains(".hsmpdjerr"));
        assert!(out.starts_with("<html><head></head><body><style type=\"text/css\">"));
    }

    #[test]
    fn head_styles_and_scripts_are_hoisted() {
        let goggles = ErrorGoggles::new().unwrap();
        let html = concat!(
            "<head><style type=\"text/css\">h1{color:red}</style>",
            "<script type=\"text/javascript\">toggle()</script></head>",
            "<body>E</body>"
        );
        let out = goggles.reformat(html);
        let body = &out[out.find("<body>").unwrap()..];

        let script = body.find("toggle()").unwrap();
        let reset = body.find(".hsmpdjerr {").unwrap();
        let style = body.find("h1{color:red}").unwrap();
        let div = body.find("<div class=\"hsmpdjerr\">").unwrap();
        assert!(script < reset && reset < style && style < div);
    }

    #[test]
    fn page_without_head_is_untouched() {
        let goggles = ErrorGoggles::new().unwrap();
        let html = "<body>oops</body>";
        assert!(matches!(goggles.reformat(html), Cow::Borrowed(_)));
    }

    #[test]
    fn dollar_signs_survive_replacement() {
        let goggles = ErrorGoggles::new().unwrap();
        let out = goggles.reformat("<head></head><body>cost $1</body>");
        assert!(out.contains("cost $1"));
    }
}
