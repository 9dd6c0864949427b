//! Record identifier codec.
//!
//! A unique identifier is `<prefix>?feature=<f>&itemID=<id>[&subfeature=<s>]`
//! and a domain identifier is `<prefix>.<f>[.<s>]`. The identifier is both the
//! record's primary key and the query string handed back on activation, so
//! [`decode`] must exactly undo [`encode`].

use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::types::{Feature, NavigationTarget, Subfeature};

pub const DEFAULT_BASE_IDENTIFIER: &str = "com.kk";

pub const FEATURE_KEY: &str = "feature";
pub const SUBFEATURE_KEY: &str = "subfeature";
pub const ITEM_ID_KEY: &str = "itemID";

/// Bytes that would change the meaning of a query component. `+` is left
/// alone: it is a literal plus on both sides of the codec.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// The routing parts that locate one indexed item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub feature: Feature,
    pub subfeature: Option<Subfeature>,
    pub item_id: String,
}

impl ItemKey {
    pub fn new(feature: Feature, subfeature: Option<Subfeature>, item_id: impl Into<String>) -> Self {
        Self { feature, subfeature, item_id: item_id.into() }
    }

    pub fn identifier(&self, prefix: &str) -> String {
        encode(prefix, self.feature, self.subfeature, &self.item_id)
    }

    pub fn domain(&self, prefix: &str) -> String {
        domain(prefix, self.feature, self.subfeature)
    }
}

pub fn encode(prefix: &str, feature: Feature, subfeature: Option<Subfeature>, item_id: &str) -> String {
    // Plain ASCII ids pass through untouched.
    let item_id = utf8_percent_encode(item_id, QUERY_VALUE);
    let mut identifier = format!("{prefix}?{FEATURE_KEY}={feature}&{ITEM_ID_KEY}={item_id}");
    if let Some(sub) = subfeature {
        identifier.push_str(&format!("&{SUBFEATURE_KEY}={sub}"));
    }
    identifier
}

pub fn domain(prefix: &str, feature: Feature, subfeature: Option<Subfeature>) -> String {
    let mut domain = format!("{prefix}.{feature}");
    if let Some(sub) = subfeature {
        domain.push('.');
        domain.push_str(sub.as_str());
    }
    domain
}

/// Parse the query part of an identifier into key/value pairs.
///
/// Only percent escapes are undone; `+` stays a plus. A pair without `=`
/// has an empty value. Later duplicates override earlier ones. No `?` means
/// no parameters.
pub fn query_parameters(identifier: &str) -> HashMap<String, String> {
    let Some((_, query)) = identifier.split_once('?') else {
        return HashMap::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Decode an identifier into a navigation target.
///
/// Returns `None` when `feature` is missing or not a known feature. An
/// unrecognised `subfeature` is dropped rather than rejecting the target.
pub fn decode(identifier: &str) -> Option<NavigationTarget> {
    let mut params = query_parameters(identifier);
    let feature: Feature = params.get(FEATURE_KEY)?.parse().ok()?;
    let subfeature = params.get(SUBFEATURE_KEY).and_then(|raw| match raw.parse::<Subfeature>() {
        Ok(sub) => Some(sub),
        Err(e) => {
            tracing::debug!(identifier, "ignoring subfeature: {}", e);
            None
        }
    });
    let item_id = params.remove(ITEM_ID_KEY);
    Some(NavigationTarget { feature, subfeature, item_id })
}
