//! Namespaced Keys
//!
//! Cache keys built by convention: `<prefix><resource>[_<action>][?k=v&k=v]`.

use std::str::FromStr;

use crate::error::CacheError;

use super::value::Scalar;

/// Recognized key namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Request,
    WebPage,
    Geo,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Request, Namespace::WebPage, Namespace::Geo];

    pub fn name(self) -> &'static str {
        match self {
            Namespace::Request => "request",
            Namespace::WebPage => "webpage",
            Namespace::Geo => "geo",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Request => "req_",
            Namespace::WebPage => "web_",
            Namespace::Geo => "geo_",
        }
    }

    /// Builds a key in this namespace.
    ///
    /// Parameters keep their given order; falsy values are skipped, and
    /// the query part is dropped when nothing remains.
    pub fn key(self, resource: &str, action: Option<&str>, params: &[(&str, Scalar)]) -> String {
        let mut key = format!("{}{}", self.prefix(), resource);
        if let Some(action) = action.filter(|a| !a.is_empty()) {
            key.push('_');
            key.push_str(action);
        }

        let query: Vec<String> = params
            .iter()
            .filter(|(_, value)| value.is_truthy())
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        if !query.is_empty() {
            key.push('?');
            key.push_str(&query.join("&"));
        }
        key
    }
}

impl FromStr for Namespace {
    type Err = CacheError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.name() == name)
            .ok_or_else(|| CacheError::UnknownNamespace(name.to_string()))
    }
}

/// Builds a namespaced key from a namespace name.
///
/// Fails with `UnknownNamespace` unless `namespace` is `request`,
/// `webpage` or `geo`.
pub fn make_ns_key(
    namespace: &str,
    resource: &str,
    action: Option<&str>,
    params: &[(&str, Scalar)],
) -> Result<String, CacheError> {
    Ok(namespace.parse::<Namespace>()?.key(resource, action, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_key() {
        let key = make_ns_key("request", "users", Some("list"), &[("page", Scalar::from(2))]).unwrap();
        assert_eq!(key, "req_users_list?page=2");
    }

    #[test]
    fn test_resource_only() {
        assert_eq!(make_ns_key("request", "users", None, &[]).unwrap(), "req_users");
        assert_eq!(make_ns_key("webpage", "home", Some(""), &[]).unwrap(), "web_home");
    }

    #[test]
    fn test_params_keep_order_and_skip_falsy() {
        let params = [
            ("q", Scalar::from("paris")),
            ("page", Scalar::from(0)),
            ("empty", Scalar::from("")),
            ("exact", Scalar::from(true)),
            ("off", Scalar::from(false)),
            ("none", Scalar::Null),
        ];
        assert_eq!(
            make_ns_key("geo", "lookup", None, &params).unwrap(),
            "geo_lookup?q=paris&exact=true"
        );
    }

    #[test]
    fn test_float_params_keep_decimal_point() {
        let key = make_ns_key("request", "u", None, &[("p", Scalar::from(2.0))]).unwrap();
        assert_eq!(key, "req_u?p=2.0");
        assert_ne!(key, make_ns_key("request", "u", None, &[("p", Scalar::from(2))]).unwrap());
    }

    #[test]
    fn test_all_params_falsy_drops_query() {
        let params = [("page", Scalar::from(0))];
        assert_eq!(
            make_ns_key("request", "users", Some("list"), &params).unwrap(),
            "req_users_list"
        );
    }

    #[test]
    fn test_unknown_namespace() {
        assert!(matches!(
            make_ns_key("session", "x", None, &[]),
            Err(CacheError::UnknownNamespace(name)) if name == "session"
        ));
    }

    #[test]
    fn test_equal_inputs_equal_keys() {
        let params = [("a", Scalar::from(1)), ("b", Scalar::from("x"))];
        assert_eq!(
            Namespace::Geo.key("r", Some("act"), &params),
            Namespace::Geo.key("r", Some("act"), &params)
        );
    }
}
