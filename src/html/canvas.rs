use std::borrow::Cow;
use std::path::Path;

use regex::{Captures, Regex};

use crate::context::MarketplaceContext;
use crate::error::Error;

use super::BodyRewriter;

/// The embedded host shell used when no template path is configured.
pub const DEFAULT_WRAPPER: &str = include_str!("../../assets/canvas_wrapper.html");

const HEAD_PLACEHOLDER: &str = "[[HEAD_CONTENTS]]";
const BODY_PLACEHOLDER: &str = "[[BODY_CONTENTS]]";
const BOTTOM_PLACEHOLDER: &str = "[[BOTTOM_BODY_CONTENTS]]";

/// Re-creates the marketplace canvas shell around an app's page.
///
/// Given a full HTML page rendered by the app:
///
/// 1. the first `<body>...</body>` fragment is cut out;
/// 2. `<hs:link ...>` tags become `<link ... />` in the shell's head and
///    `<hs:script ...></hs:script>` tags become `<script ...></script>` at
///    the bottom of the shell's body;
/// 3. all `hs:link`, `hs:script` and `hs:title` tags are removed from the
///    fragment;
/// 4. `<form action="/...">` (and optionally `<a href="/...">`) targets are
///    re-wrapped as `/market/<hub_id>/canvas/<slug>/...`;
/// 5. the pieces are substituted into the wrapper template.
///
/// A page without a `<body>` fragment is returned untouched.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::html::CanvasRewriter;
///
/// let rewriter = CanvasRewriter::new("demo", "<main>[[BODY_CONTENTS]]</main>").unwrap();
/// let out = rewriter.rewrite_for_hub(r#"<body><form action="/save"></form></body>"#, 42);
/// assert_eq!(out, r#"<main><form action="/market/42/canvas/demo/save"></form></main>"#);
/// ```
#[derive(Debug, Clone)]
pub struct CanvasRewriter {
    slug: String,
    wrapper: String,
    rewrite_anchors: bool,
    body_re: Regex,
    link_re: Regex,
    script_re: Regex,
    title_re: Regex,
    form_re: Regex,
    anchor_re: Regex,
}

impl CanvasRewriter {
    /// Creates a rewriter for `slug` using `wrapper` as the shell template.
    pub fn new(slug: impl Into<String>, wrapper: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            slug: slug.into(),
            wrapper: wrapper.into(),
            rewrite_anchors: false,
            body_re: Regex::new(r"(?s)<body>(.*?)</body>")?,
            link_re: Regex::new(r"<hs:link (.*?)/?>")?,
            script_re: Regex::new(r"<hs:script (.*?)></hs:script>")?,
            title_re: Regex::new(r"<hs:title(.*?)>(.*?)</hs:title>")?,
            form_re: Regex::new(r#"(<form\s.*?)action="(/.*?)""#)?,
            anchor_re: Regex::new(r#"(<a\s.*?)href="(/.*?)""#)?,
        })
    }

    /// Also re-wrap absolute anchors, not just form actions.
    pub fn rewrite_anchors(mut self, enabled: bool) -> Self {
        self.rewrite_anchors = enabled;
        self
    }

    /// Reads the shell template from `path`, or falls back to [`DEFAULT_WRAPPER`].
    pub fn load_wrapper(path: Option<&Path>) -> Result<String, Error> {
        match path {
            Some(path) => std::fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            }),
            None => Ok(DEFAULT_WRAPPER.to_string()),
        }
    }

    /// The canvas path prefix for `hub_id`, without a trailing slash.
    pub fn canvas_prefix(&self, hub_id: i64) -> String {
        format!("/market/{}/canvas/{}", hub_id, self.slug)
    }

    /// Wraps `html` for the canvas of portal `hub_id`.
    pub fn rewrite_for_hub<'a>(&self, html: &'a str, hub_id: i64) -> Cow<'a, str> {
        let Some(innards) = self.body_re.captures(html).and_then(|c| c.get(1)) else {
            return Cow::Borrowed(html);
        };
        let innards = innards.as_str();

        let head: String = self
            .link_re
            .captures_iter(innards)
            .map(|c| format!("\n<link {} />", &c[1]))
            .collect();
        let bottom: String = self
            .script_re
            .captures_iter(innards)
            .map(|c| format!("\n<script {}></script>", &c[1]))
            .collect();

        let body = self.link_re.replace_all(innards, "");
        let body = self.title_re.replace_all(&body, "");
        let body = self.script_re.replace_all(&body, "");

        let prefix = self.canvas_prefix(hub_id);
        let body = self.form_re.replace_all(&body, |c: &Captures| {
            format!("{}action=\"{}{}\"", &c[1], prefix, &c[2])
        });
        let body = if self.rewrite_anchors {
            self.anchor_re
                .replace_all(&body, |c: &Captures| {
                    format!("{}href=\"{}{}\"", &c[1], prefix, &c[2])
                })
                .into_owned()
        } else {
            body.into_owned()
        };

        Cow::Owned(
            self.wrapper
                .replace(HEAD_PLACEHOLDER, &head)
                .replace(BODY_PLACEHOLDER, &body)
                .replace(BOTTOM_PLACEHOLDER, &bottom),
        )
    }
}

impl BodyRewriter for CanvasRewriter {
    fn rewrite<'a>(&self, html: &'a str, ctx: &MarketplaceContext) -> Cow<'a, str> {
        match ctx.hub_id() {
            Some(hub_id) => self.rewrite_for_hub(html, hub_id),
            None => Cow::Borrowed(html),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHELL: &str =
        "<head>[[HEAD_CONTENTS]]</head><body>[[BODY_CONTENTS]][[BOTTOM_BODY_CONTENTS]]</body>";

    fn rewriter() -> CanvasRewriter {
        CanvasRewriter::new("demo", SHELL).unwrap()
    }

    #[test]
    fn body_is_inserted_into_shell() {
        let out = rewriter().rewrite_for_hub("<html><body>X</body></html>", 42);
        assert_eq!(out, "<head></head><body>X</body>");
    }

    #[test]
    fn missing_body_is_untouched() {
        let html = "<html><p>partial</p></html>";
        let out = rewriter().rewrite_for_hub(html, 42);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, html);
    }

    #[test]
    fn body_match_spans_newlines() {
        let out = rewriter().rewrite_for_hub("<body>\nline one\nline two\n</body>", 1);
        assert!(out.contains("line one\nline two"));
    }

    #[test]
    fn custom_link_tags_move_to_head() {
        let out = rewriter().rewrite_for_hub(
            r#"<body><hs:link rel="stylesheet" href="/s.css"/>X</body>"#,
            1,
        );
        assert_eq!(
            out,
            "<head>\n<link rel=\"stylesheet\" href=\"/s.css\" /></head><body>X</body>"
        );
    }

    #[test]
    fn custom_script_tags_move_to_bottom() {
        let out = rewriter().rewrite_for_hub(
            r#"<body><hs:script src="/a.js"></hs:script>X</body>"#,
            1,
        );
        assert_eq!(out, "<head></head><body>X\n<script src=\"/a.js\"></script></body>");
    }

    #[test]
    fn custom_title_is_stripped() {
        let out = rewriter().rewrite_for_hub("<body><hs:title>Page</hs:title>X</body>", 1);
        assert_eq!(out, "<head></head><body>X</body>");
    }

    #[test]
    fn form_actions_are_rewrapped() {
        let out = rewriter().rewrite_for_hub(
            r#"<body><form method="post" action="/save"></form></body>"#,
            7,
        );
        assert!(out.contains(r#"<form method="post" action="/market/7/canvas/demo/save">"#));
    }

    #[test]
    fn relative_form_actions_are_left_alone() {
        let out = rewriter().rewrite_for_hub(r#"<body><form action="save"></form></body>"#, 7);
        assert!(out.contains(r#"action="save""#));
    }

    #[test]
    fn anchors_only_rewrapped_when_enabled() {
        let html = r#"<body><a href="/next">n</a></body>"#;
        assert!(rewriter().rewrite_for_hub(html, 3).contains(r#"href="/next""#));

        let out = rewriter().rewrite_anchors(true).rewrite_for_hub(html, 3);
        assert!(out.contains(r#"href="/market/3/canvas/demo/next""#));
    }

    #[test]
    fn default_wrapper_has_all_placeholders() {
        assert!(DEFAULT_WRAPPER.contains(HEAD_PLACEHOLDER));
        assert!(DEFAULT_WRAPPER.contains(BODY_PLACEHOLDER));
        assert!(DEFAULT_WRAPPER.contains(BOTTOM_PLACEHOLDER));
    }

    #[test]
    fn load_wrapper_defaults_to_embedded_shell() {
        assert_eq!(CanvasRewriter::load_wrapper(None).unwrap(), DEFAULT_WRAPPER);
    }

    #[test]
    fn load_wrapper_reports_missing_file() {
        let err = CanvasRewriter::load_wrapper(Some(Path::new("/nonexistent/shell.html")));
        assert!(matches!(err, Err(Error::Read { .. })));
    }
}
