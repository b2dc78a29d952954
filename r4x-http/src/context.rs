use http::request::Parts;

use crate::query;

/// What the templates of one request can read.
///
/// Borrowed from the request head for the duration of argument resolution.
#[derive(Debug)]
pub struct RequestContext<'a> {
    parts: &'a Parts,
    captures: Vec<(String, String)>,
}

impl<'a> RequestContext<'a> {
    /// Creates a context from a request head and the location's path captures.
    pub fn new(parts: &'a Parts, captures: Vec<(String, String)>) -> Self {
        Self { parts, captures }
    }

    /// The request head.
    pub fn parts(&self) -> &Parts {
        self.parts
    }

    /// Named segment captured by the location pattern.
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Decoded query parameter. Fails only if a pair carrying `name` cannot
    /// be parsed; other parameters are never looked at.
    pub fn query_param(&self, name: &str) -> Result<Option<String>, String> {
        query::lookup(self.parts.uri.query().unwrap_or_default(), name)
            .map_err(|err| format!("invalid query parameter {name}: {err}"))
    }
}
