//! Hierarchical location paths
//!
//! `/<network>/<contract>/<view>/<table>/<scope>` with segments omitted from
//! the first unset one. Custom networks carry `?endpoint=<url-encoded>`.

use std::fmt;

use crate::domain::network::Network;

/// Which half of a contract is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Tables,
    Actions,
}

impl View {
    pub fn slug(&self) -> &'static str {
        match self {
            View::Tables => "tables",
            View::Actions => "actions",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        match value {
            "tables" => Some(View::Tables),
            "actions" => Some(View::Actions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub network: Network,
    pub endpoint: Option<String>,
    pub contract: Option<String>,
    pub view: Option<View>,
    pub table: Option<String>,
    pub scope: Option<String>,
}

impl Location {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Parse a path, a `#`-prefixed fragment or a full `scheme://host/...` URL.
    ///
    /// The first segment must name a network; anything after the first
    /// empty or unrecognised segment is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let raw = match raw.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric()) => {
                rest.split_once('/').map_or("", |(_, path)| path)
            }
            _ => raw,
        };
        let raw = raw.trim_start_matches('#');
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };
        let path = path.split('#').next().unwrap_or_default();

        let mut segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(decode_segment);

        let network = Network::from_slug(&segments.next()?)?;
        let mut location = Location::new(network);
        location.endpoint = query.and_then(endpoint_param);

        location.contract = segments.next();
        if location.contract.is_none() {
            return Some(location);
        }
        location.view = segments.next().as_deref().and_then(View::from_slug);
        if location.view.is_none() {
            return Some(location);
        }
        location.table = segments.next();
        if location.table.is_some() {
            location.scope = segments.next();
        }
        Some(location)
    }

    pub fn to_path(&self) -> String {
        let mut path = format!("/{}", self.network.slug());
        let segments = [
            self.contract.as_deref(),
            self.view.map(|v| v.slug()),
            self.table.as_deref(),
            self.scope.as_deref(),
        ];
        for segment in segments {
            match segment {
                Some(value) if !value.is_empty() => {
                    path.push('/');
                    path.push_str(&urlencoding::encode(value));
                }
                _ => break,
            }
        }
        if self.network == Network::Custom {
            if let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.is_empty()) {
                path.push_str("?endpoint=");
                path.push_str(&urlencoding::encode(endpoint));
            }
        }
        path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn endpoint_param(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "endpoint")
        .map(|(_, value)| decode_segment(value))
        .filter(|value| !value.is_empty())
}
