//! Local stand-in for the marketplace host.
//!
//! In production the marketplace receives `/market/<hub_id>/canvas/<slug>/...`,
//! signs a parameter set, strips the canvas prefix and forwards the request
//! to the app. Later it wraps the app's HTML in the HubSpot shell. The
//! [`MockCanvas`] middleware performs both halves locally so the app can be
//! exercised at `http://localhost:8000/market/<hub_id>/canvas/<slug>/...`.
//!
//! It must sit ahead of the [`AuthGate`](super::AuthGate) in the pipeline:
//! the gate then verifies the synthesized signature like any other.

use regex::Regex;

use crate::config::{MarketplaceConfig, MockSimulationConfig};
use crate::error::Error;
use crate::html::CanvasRewriter;
use crate::params::Params;
use crate::secret::SecretKey;
use crate::signature;

use super::{MarketRequest, MarketResponse, Middleware};

/// Payload signed for every mocked request.
const MOCK_PAYLOAD: &[u8] = b"payload";

/// Simulates the marketplace host for canvas paths.
#[derive(Debug, Clone)]
pub struct MockCanvas {
    slug: String,
    path_re: Regex,
    callback_prefix: String,
    static_params: Params,
    rewriter: CanvasRewriter,
}

impl MockCanvas {
    /// Builds the simulator for `mock`, signing with `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfiguration`] for an empty slug, and
    /// [`Error::Read`] when a configured template cannot be read.
    pub fn new(mock: &MockSimulationConfig, secret: &SecretKey) -> Result<Self, Error> {
        if mock.slug.trim().is_empty() {
            return Err(Error::MissingConfiguration { what: "mock.slug" });
        }

        let wrapper = CanvasRewriter::load_wrapper(mock.template_path.as_deref())?;
        let rewriter = CanvasRewriter::new(mock.slug.clone(), wrapper)?
            .rewrite_anchors(mock.rewrite_anchors);
        let path_re = Regex::new(&format!(
            r"^/market/(\d+)/canvas/{}(/.*)?$",
            regex::escape(&mock.slug)
        ))?;

        Ok(Self {
            slug: mock.slug.clone(),
            path_re,
            callback_prefix: callback_prefix(&mock.app.callback_url),
            static_params: static_params(mock, secret),
            rewriter,
        })
    }

    /// Builds the simulator if configuration asks for it.
    ///
    /// Returns `Ok(None)` (logged at info) when there is no `mock` table,
    /// when the safety variable is named but unset, or when no secret key is
    /// configured to sign with.
    pub fn from_config(config: &MarketplaceConfig) -> Result<Option<Self>, Error> {
        let Some(mock) = &config.mock else {
            tracing::info!("marketplace mock canvas is off: no mock configuration");
            return Ok(None);
        };
        if !mock.safety_gate_open() {
            tracing::info!(
                safety_env = mock.safety_env.as_deref().unwrap_or_default(),
                "marketplace mock canvas is off: safety variable not set"
            );
            return Ok(None);
        }
        let Some(secret) = config.secret_key() else {
            tracing::info!("marketplace mock canvas is off: no secret key to sign with");
            return Ok(None);
        };

        let canvas = Self::new(mock, secret)?;
        tracing::info!(slug = %canvas.slug, "marketplace mock canvas activated");
        Ok(Some(canvas))
    }

    /// The configured slug.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Injects signed parameters and unwraps the path of a canvas request.
    ///
    /// Returns `false`, leaving the request untouched, for any other path.
    pub fn simulate(&self, request: &mut MarketRequest) -> bool {
        let Some(captures) = self.path_re.captures(request.path()) else {
            return false;
        };
        let Ok(hub_id) = captures[1].parse::<i64>() else {
            request
                .log()
                .warn(format_args!("canvas hub id out of range, not mocking"));
            return false;
        };
        let remainder = captures.get(2).map_or("", |m| m.as_str()).to_string();

        let original_path = request.path().to_string();
        let canvas_url = format!(
            "http://{}/market/{}/canvas/{}/",
            request.host(),
            hub_id,
            self.slug
        );

        let params = request.params_mut();
        params.extend(&self.static_params);
        params.append("hubspot.marketplace.portal_id", hub_id.to_string());
        params.append("hubspot.marketplace.app.canvasUrl", canvas_url);
        params.append("hubspot.marketplace.app.pageUrl", original_path);

        let mut path = format!("{}{}", self.callback_prefix, remainder);
        if path.is_empty() {
            path.push('/');
        }
        request.log().debug(format_args!(
            "mocked canvas request for hub {} as {}",
            hub_id, path
        ));
        request.set_path(path);
        true
    }

    /// Wraps a mocked `200` HTML response in the canvas shell.
    pub fn wrap_response(
        &self,
        request: &MarketRequest,
        response: MarketResponse,
    ) -> MarketResponse {
        match request.marketplace() {
            Some(ctx) if ctx.is_mock() && response.status() == 200 => {
                response.rewrite_body(&self.rewriter, ctx)
            }
            _ => response,
        }
    }
}

impl Middleware for MockCanvas {
    fn name(&self) -> &'static str {
        "mock_canvas"
    }

    fn process_request(&self, request: &mut MarketRequest) -> Option<MarketResponse> {
        self.simulate(request);
        None
    }

    fn process_response(
        &self,
        request: &MarketRequest,
        response: MarketResponse,
    ) -> MarketResponse {
        self.wrap_response(request, response)
    }
}

/// Parameters identical on every mocked request.
fn static_params(mock: &MockSimulationConfig, secret: &SecretKey) -> Params {
    let mut params = Params::new();
    let mut put = |key: &str, value: Option<&str>| {
        if let Some(value) = value {
            params.append(format!("hubspot.marketplace.{}", key), value);
        }
    };

    put("caller", Some(&mock.caller));
    put("user_id", Some(&mock.user.id.to_string()));
    put("user.email", mock.user.email.as_deref());
    put("user.firstName", mock.user.first_name.as_deref());
    put("user.lastName", mock.user.last_name.as_deref());
    put("app.name", Some(&mock.app.name));
    put("app.callbackUrl", Some(&mock.app.callback_url));
    put("app.pageUrl", mock.app.page_url.as_deref());
    put(
        "signature",
        Some(&signature::sign(secret.expose_secret(), MOCK_PAYLOAD)),
    );
    put("is_mock", Some("true"));
    params
}

/// Path portion of the callback URL, without a trailing slash.
///
/// `http://localhost:8000` yields `""`, `http://localhost:8000/app/` yields `/app`.
fn callback_prefix(callback_url: &str) -> String {
    let without_scheme = callback_url
        .split_once("//")
        .map_or(callback_url, |(_, rest)| rest);
    match without_scheme.split_once('/') {
        Some((_, path)) => {
            let path = path.trim_end_matches('/');
            if path.is_empty() {
                String::new()
            } else {
                format!("/{}", path)
            }
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SIGNATURE_PARAM;
    use crate::signature::SignatureVerifier;
    use crate::web::AuthState;

    fn canvas(slug: &str) -> MockCanvas {
        MockCanvas::new(&MockSimulationConfig::new(slug), &SecretKey::new("k")).unwrap()
    }

    #[test]
    fn canvas_path_is_unwrapped() {
        let mut request = MarketRequest::get("req-1", "/market/42/canvas/demo/foo");
        assert!(canvas("demo").simulate(&mut request));
        assert_eq!(request.path(), "/foo");
    }

    #[test]
    fn bare_canvas_path_becomes_root() {
        let mut request = MarketRequest::get("req-1", "/market/42/canvas/demo");
        assert!(canvas("demo").simulate(&mut request));
        assert_eq!(request.path(), "/");
    }

    #[test]
    fn injected_parameters_are_complete_and_signed() {
        let mut request =
            MarketRequest::get("req-1", "/market/42/canvas/demo/foo").with_host("dev.local:8000");
        canvas("demo").simulate(&mut request);
        let params = request.params();

        assert_eq!(params.get("hubspot.marketplace.portal_id"), Some("42"));
        assert_eq!(params.get("hubspot.marketplace.is_mock"), Some("true"));
        assert_eq!(params.get("hubspot.marketplace.caller"), Some("Hubspot Marketplace"));
        assert_eq!(params.get("hubspot.marketplace.user_id"), Some("9999999"));
        assert_eq!(params.get("hubspot.marketplace.app.name"), Some("MyAppName"));
        assert_eq!(
            params.get("hubspot.marketplace.app.canvasUrl"),
            Some("http://dev.local:8000/market/42/canvas/demo/")
        );
        assert_eq!(
            params.get("hubspot.marketplace.app.pageUrl"),
            Some("/market/42/canvas/demo/foo")
        );

        let token = params.get(SIGNATURE_PARAM).unwrap();
        assert!(SignatureVerifier::new(SecretKey::new("k")).verify(token).is_ok());
    }

    #[test]
    fn existing_parameters_are_kept() {
        let mut request = MarketRequest::get("req-1", "/market/42/canvas/demo/foo")
            .with_query("q=1&hubspot.marketplace.portal_id=7");
        canvas("demo").simulate(&mut request);

        assert_eq!(request.params().get("q"), Some("1"));
        let portals: Vec<_> = request
            .params()
            .get_all("hubspot.marketplace.portal_id")
            .collect();
        assert_eq!(portals, vec!["7", "42"]);
    }

    #[test]
    fn other_paths_pass_through() {
        for path in [
            "/foo",
            "/market/42/canvas/other/foo",
            "/market/x/canvas/demo/",
            "/market/42/canvas/demox",
        ] {
            let mut request = MarketRequest::get("req-1", path);
            assert!(!canvas("demo").simulate(&mut request), "{}", path);
            assert_eq!(request.path(), path);
            assert!(request.params().is_empty());
        }
    }

    #[test]
    fn slug_is_matched_literally() {
        let mut request = MarketRequest::get("req-1", "/market/1/canvas/aXb/");
        assert!(!canvas("a.b").simulate(&mut request));
    }

    #[test]
    fn callback_path_is_prefixed() {
        let mut mock = MockSimulationConfig::new("demo");
        mock.app.callback_url = "http://localhost:8000/app/".to_string();
        let canvas = MockCanvas::new(&mock, &SecretKey::new("k")).unwrap();

        let mut request = MarketRequest::get("req-1", "/market/42/canvas/demo/foo");
        canvas.simulate(&mut request);
        assert_eq!(request.path(), "/app/foo");
    }

    #[test]
    fn callback_prefix_forms() {
        assert_eq!(callback_prefix("http://localhost:8000"), "");
        assert_eq!(callback_prefix("http://localhost:8000/"), "");
        assert_eq!(callback_prefix("https://example.com/a/b/"), "/a/b");
        assert_eq!(callback_prefix("example.com/app"), "/app");
    }

    #[test]
    fn empty_slug_is_missing_configuration() {
        let err =
            MockCanvas::new(&MockSimulationConfig::new(""), &SecretKey::new("k")).unwrap_err();
        assert!(matches!(err, Error::MissingConfiguration { what: "mock.slug" }));
    }

    #[test]
    fn from_config_without_secret_is_off() {
        let config = MarketplaceConfig::default().mock(MockSimulationConfig::new("demo"));
        assert!(MockCanvas::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn from_config_without_mock_is_off() {
        let config = MarketplaceConfig::with_secret("k");
        assert!(MockCanvas::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn request_path_wins_over_configured_page_url() {
        let mut mock = MockSimulationConfig::new("demo");
        mock.app.page_url = Some("/static".to_string());
        let canvas = MockCanvas::new(&mock, &SecretKey::new("k")).unwrap();

        let mut request = MarketRequest::get("req-1", "/market/42/canvas/demo/foo");
        canvas.simulate(&mut request);

        let pages: Vec<_> = request
            .params()
            .get_all("hubspot.marketplace.app.pageUrl")
            .collect();
        assert_eq!(pages, vec!["/static", "/market/42/canvas/demo/foo"]);
        assert_eq!(
            request.params().get("hubspot.marketplace.app.pageUrl"),
            Some("/market/42/canvas/demo/foo")
        );
    }

    #[test]
    fn authenticated_real_response_is_not_wrapped() {
        let mut request = MarketRequest::get("req-1", "/foo");
        let params = Params::from_query("hubspot.marketplace.portal_id=42");
        let ctx = crate::context::extract(&params).unwrap();
        assert!(!ctx.is_mock());
        request.attach(AuthState::Authenticated, Some(ctx));

        let response = MarketResponse::html("<body>X</body>");
        let wrapped = canvas("demo").wrap_response(&request, response.clone());
        assert_eq!(wrapped, response);
    }

    #[test]
    fn unauthenticated_response_is_not_wrapped() {
        let request = MarketRequest::get("req-1", "/foo");
        let response = MarketResponse::html("<body>X</body>");
        let wrapped = canvas("demo").wrap_response(&request, response.clone());
        assert_eq!(wrapped, response);
    }
}
