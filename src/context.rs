//! The per-request marketplace context.
//!
//! The marketplace forwards portal, app and user details as a flat set of
//! `hubspot.marketplace.*` request parameters. [`extract`] turns that flat
//! namespace into a [`MarketplaceContext`]:
//!
//! ```text
//! hubspot.marketplace.portal_id=123        -> portal_id = 123 (integer)
//! hubspot.marketplace.user.firstName=Ada   -> user_firstName = "Ada"
//! hubspot.marketplace.is_mock=TRUE         -> is_mock = true
//! ```
//!
//! Keys are normalized by stripping the prefix and turning the remaining
//! `.` separators into `_`. Names ending in `_id` are integers, names starting
//! with `is_` are booleans, everything else is text. A fixed alias table then
//! copies a few attributes under friendlier names (`portal_id` -> `hub_id`,
//! `app_canvasUrl` -> `base_url`, ...).
//!
//! Extraction makes no trust decision. Only call it after the signature has
//! been verified.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::params::Params;

/// Namespace shared by every marketplace parameter.
pub const PARAM_PREFIX: &str = "hubspot.marketplace.";

/// The parameter carrying the signature token.
pub const SIGNATURE_PARAM: &str = "hubspot.marketplace.signature";

/// Alias table: `(source, alias)`.
const ALIASES: &[(&str, &str)] = &[
    ("portal_id", "hub_id"),
    ("app_pageUrl", "local_url"),
    ("app_callbackUrl", "local_base_url"),
    ("app_canvasUrl", "base_url"),
    ("user_firstName", "user_first_name"),
    ("user_lastName", "user_last_name"),
];

/// Attribute names promoted to typed fields. Everything else is "extra".
const KNOWN: &[&str] = &[
    "signature",
    "caller",
    "portal_id",
    "hub_id",
    "is_mock",
    "app_name",
    "app_callbackUrl",
    "app_pageUrl",
    "app_canvasUrl",
    "local_url",
    "local_base_url",
    "base_url",
    "user_id",
    "user_email",
    "user_firstName",
    "user_lastName",
    "user_first_name",
    "user_last_name",
];

/// A coerced marketplace parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// An `*_id` attribute
    Integer(i64),
    /// An `is_*` attribute
    Boolean(bool),
    /// Any other attribute
    Text(String),
}

impl ParamValue {
    /// Returns the integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Boolean(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

/// App details forwarded by the marketplace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    /// Display name of the app
    pub name: Option<String>,
    /// Where the marketplace forwards canvas traffic
    pub callback_url: Option<String>,
    /// The app-relative page being rendered
    pub page_url: Option<String>,
    /// Public canvas URL, always ending in `/`
    pub canvas_url: Option<String>,
}

/// The HubSpot user viewing the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    /// HubSpot user id
    pub id: Option<i64>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Email address
    pub email: Option<String>,
}

/// Structured context for one authenticated marketplace request.
///
/// Built once per request by the gate, attached to the request, and dropped
/// with it. Alias fields are copied at construction and never change
/// independently of their source.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::{context, Params};
///
/// let params: Params = vec![
///     ("hubspot.marketplace.portal_id", "123"),
///     ("hubspot.marketplace.user_id", "7"),
///     ("hubspot.marketplace.app.name", "Foo"),
/// ]
/// .into_iter()
/// .collect();
///
/// let ctx = context::extract(&params).unwrap();
/// assert_eq!(ctx.portal_id(), Some(123));
/// assert_eq!(ctx.hub_id(), Some(123));
/// assert_eq!(ctx.user().id, Some(7));
/// assert_eq!(ctx.app().name.as_deref(), Some("Foo"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceContext {
    caller: Option<String>,
    portal_id: Option<i64>,
    hub_id: Option<i64>,
    app: AppInfo,
    user: UserInfo,
    is_mock: bool,
    local_url: Option<String>,
    local_base_url: Option<String>,
    base_url: Option<String>,
    attributes: BTreeMap<String, ParamValue>,
}

impl MarketplaceContext {
    /// Name of the caller, normally `Hubspot Marketplace`.
    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    /// The HubSpot portal the request is for.
    pub fn portal_id(&self) -> Option<i64> {
        self.portal_id
    }

    /// Alias of [`portal_id`](Self::portal_id).
    pub fn hub_id(&self) -> Option<i64> {
        self.hub_id
    }

    /// App details.
    pub fn app(&self) -> &AppInfo {
        &self.app
    }

    /// Viewing user.
    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    /// `true` when the request was synthesized by the local mock.
    pub fn is_mock(&self) -> bool {
        self.is_mock
    }

    /// Alias of the app page URL.
    pub fn local_url(&self) -> Option<&str> {
        self.local_url.as_deref()
    }

    /// Alias of the app callback URL.
    pub fn local_base_url(&self) -> Option<&str> {
        self.local_base_url.as_deref()
    }

    /// Alias of the canvas URL. Ends in `/`.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Looks up any normalized attribute, aliases included.
    pub fn attribute(&self, name: &str) -> Option<&ParamValue> {
        self.attributes.get(name)
    }

    /// Attributes outside the fixed schema.
    pub fn extra(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.attributes
            .iter()
            .filter(|(name, _)| !KNOWN.contains(&name.as_str()))
            .map(|(name, value)| (name.as_str(), value))
    }

    fn text(attributes: &BTreeMap<String, ParamValue>, name: &str) -> Option<String> {
        attributes.get(name).map(ToString::to_string)
    }

    fn integer(attributes: &BTreeMap<String, ParamValue>, name: &str) -> Option<i64> {
        attributes.get(name).and_then(ParamValue::as_i64)
    }

    fn from_attributes(attributes: BTreeMap<String, ParamValue>) -> Self {
        let text = |name| Self::text(&attributes, name);
        Self {
            caller: text("caller"),
            portal_id: Self::integer(&attributes, "portal_id"),
            hub_id: Self::integer(&attributes, "hub_id"),
            app: AppInfo {
                name: text("app_name"),
                callback_url: text("app_callbackUrl"),
                page_url: text("app_pageUrl"),
                canvas_url: text("app_canvasUrl"),
            },
            user: UserInfo {
                id: Self::integer(&attributes, "user_id"),
                first_name: text("user_first_name"),
                last_name: text("user_last_name"),
                email: text("user_email"),
            },
            is_mock: attributes
                .get("is_mock")
                .and_then(ParamValue::as_bool)
                .unwrap_or(false),
            local_url: text("local_url"),
            local_base_url: text("local_base_url"),
            base_url: text("base_url"),
            attributes,
        }
    }
}

/// Normalizes a parameter key, or returns `None` outside the namespace.
///
/// ```
/// use marketplace_canvas::context::normalize_key;
///
/// let key = normalize_key("hubspot.marketplace.app.canvasUrl");
/// assert_eq!(key.as_deref(), Some("app_canvasUrl"));
/// assert_eq!(normalize_key("next"), None);
/// ```
pub fn normalize_key(key: &str) -> Option<String> {
    key.strip_prefix(PARAM_PREFIX)
        .map(|rest| rest.replace('.', "_"))
}

/// Coerces a raw value according to its normalized name.
pub fn coerce(name: &str, raw: &str) -> Result<ParamValue, Error> {
    if name.ends_with("_id") {
        raw.trim()
            .parse::<i64>()
            .map(ParamValue::Integer)
            .map_err(|_| Error::InvalidParameter {
                name: name.to_string(),
                value: raw.to_string(),
            })
    } else if name.starts_with("is_") {
        Ok(ParamValue::Boolean(raw.eq_ignore_ascii_case("true")))
    } else {
        Ok(ParamValue::Text(raw.to_string()))
    }
}

/// Builds a [`MarketplaceContext`] from request parameters.
///
/// Each distinct key is read once using its most recent value. Keys outside
/// the `hubspot.marketplace.` namespace are ignored.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] when an `*_id` parameter is not an
/// integer.
pub fn extract(params: &Params) -> Result<MarketplaceContext, Error> {
    let mut attributes = BTreeMap::new();
    for key in params.keys() {
        let Some(name) = normalize_key(key) else {
            continue;
        };
        let raw = params.get(key).unwrap_or_default();
        let value = coerce(&name, raw)?;
        attributes.insert(name, value);
    }

    for (source, alias) in ALIASES {
        if let Some(value) = attributes.get(*source).cloned() {
            attributes.insert((*alias).to_string(), value);
        }
    }

    Ok(MarketplaceContext::from_attributes(attributes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().copied().collect()
    }

    #[test]
    fn typed_fields_are_coerced() {
        let ctx = extract(&params(&[
            ("hubspot.marketplace.portal_id", "123"),
            ("hubspot.marketplace.user_id", "7"),
            ("hubspot.marketplace.app.name", "Foo"),
        ]))
        .unwrap();

        assert_eq!(ctx.portal_id(), Some(123));
        assert_eq!(ctx.user().id, Some(7));
        assert_eq!(ctx.app().name.as_deref(), Some("Foo"));
        assert_eq!(ctx.attribute("app_name"), Some(&ParamValue::Text("Foo".into())));
        assert_eq!(ctx.hub_id(), Some(123));
    }

    #[test]
    fn aliases_copy_their_sources() {
        let ctx = extract(&params(&[
            ("hubspot.marketplace.app.pageUrl", "/page"),
            ("hubspot.marketplace.app.callbackUrl", "http://localhost:8000"),
            ("hubspot.marketplace.app.canvasUrl", "http://app.hubspot.com/market/1/canvas/demo/"),
            ("hubspot.marketplace.user.firstName", "Ada"),
            ("hubspot.marketplace.user.lastName", "Lovelace"),
        ]))
        .unwrap();

        assert_eq!(ctx.local_url(), Some("/page"));
        assert_eq!(ctx.local_base_url(), Some("http://localhost:8000"));
        assert_eq!(ctx.base_url(), ctx.app().canvas_url.as_deref());
        assert_eq!(ctx.user().first_name.as_deref(), Some("Ada"));
        assert_eq!(ctx.user().last_name.as_deref(), Some("Lovelace"));
        assert_eq!(ctx.attribute("user_first_name"), ctx.attribute("user_firstName"));
    }

    #[test]
    fn missing_alias_source_leaves_alias_absent() {
        let ctx = extract(&params(&[("hubspot.marketplace.caller", "x")])).unwrap();
        assert_eq!(ctx.hub_id(), None);
        assert_eq!(ctx.base_url(), None);
        assert!(ctx.attribute("hub_id").is_none());
    }

    #[test]
    fn boolean_is_case_insensitive() {
        let ctx = extract(&params(&[("hubspot.marketplace.is_mock", "TRUE")])).unwrap();
        assert!(ctx.is_mock());

        let ctx = extract(&params(&[("hubspot.marketplace.is_mock", "yes")])).unwrap();
        assert!(!ctx.is_mock());
    }

    #[test]
    fn is_mock_defaults_to_false() {
        let ctx = extract(&Params::new()).unwrap();
        assert!(!ctx.is_mock());
    }

    #[test]
    fn non_integer_id_is_rejected() {
        let err = extract(&params(&[("hubspot.marketplace.portal_id", "abc")])).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "portal_id"));
    }

    #[test]
    fn foreign_keys_are_ignored() {
        let ctx = extract(&params(&[("next", "/home"), ("hubspot.portal_id", "1")])).unwrap();
        assert_eq!(ctx.extra().count(), 0);
        assert_eq!(ctx.portal_id(), None);
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let ctx = extract(&params(&[
            ("hubspot.marketplace.feature.flag", "on"),
            ("hubspot.marketplace.contact_id", "55"),
        ]))
        .unwrap();

        let extra: Vec<_> = ctx.extra().collect();
        assert_eq!(
            extra,
            vec![
                ("contact_id", &ParamValue::Integer(55)),
                ("feature_flag", &ParamValue::Text("on".into())),
            ]
        );
    }

    #[test]
    fn last_value_wins() {
        let ctx = extract(&params(&[
            ("hubspot.marketplace.portal_id", "1"),
            ("hubspot.marketplace.portal_id", "2"),
        ]))
        .unwrap();
        assert_eq!(ctx.portal_id(), Some(2));
    }

    #[test]
    fn extraction_is_idempotent() {
        let input = params(&[
            ("hubspot.marketplace.portal_id", "9"),
            ("hubspot.marketplace.app.name", "Foo"),
        ]);
        assert_eq!(extract(&input).unwrap(), extract(&input).unwrap());
    }

    #[test]
    fn normalize_replaces_every_separator() {
        assert_eq!(
            normalize_key("hubspot.marketplace.a.b.c").as_deref(),
            Some("a_b_c")
        );
    }
}
