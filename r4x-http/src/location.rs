use actix_router::{Quoter, ResourceDef};
use r4x_core::{CommandArgv, Error};
use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::{CommandTemplate, RequestContext};

/// Failure to build a [`Location`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    /// The command has no arguments at all.
    #[error("location {0} has an empty command")]
    EmptyCommand(String),
    /// The path pattern is malformed.
    #[error("invalid path pattern {path}: {reason}")]
    InvalidPattern {
        /// The pattern as configured.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A path pattern and the command it forwards to.
///
/// Patterns use the actix-router syntax: `{name}` captures a segment,
/// `{name:regex}` constrains it and `{tail}*` captures the rest of the path.
#[derive(Debug)]
pub struct Location {
    path: String,
    pattern: ResourceDef,
    templates: Vec<CommandTemplate>,
}

impl Location {
    /// Creates a location. `templates` needs at least the command name.
    pub fn new(path: &str, templates: Vec<CommandTemplate>) -> Result<Self, LocationError> {
        if templates.is_empty() {
            return Err(LocationError::EmptyCommand(path.to_owned()));
        }
        check_pattern(path).map_err(|reason| LocationError::InvalidPattern {
            path: path.to_owned(),
            reason,
        })?;
        Ok(Self {
            path: path.to_owned(),
            pattern: ResourceDef::new(path),
            templates,
        })
    }

    /// The path pattern as configured.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The argument templates, command name first.
    pub fn templates(&self) -> &[CommandTemplate] {
        &self.templates
    }

    /// Matches the raw request `path`, returning the percent-decoded
    /// captured segments.
    ///
    /// Segments are split before decoding, so an encoded `/` stays inside
    /// its segment.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let mut path = actix_router::Path::new(path);
        if !self.pattern.capture_match_info(&mut path) {
            return None;
        }
        let quoter = Quoter::new(b"", b"");
        Some(
            path.iter()
                .map(|(key, value)| {
                    let value = match quoter.requote(value.as_bytes()) {
                        Some(decoded) => String::from_utf8_lossy(&decoded).into_owned(),
                        None => value.to_owned(),
                    };
                    (key.to_owned(), value)
                })
                .collect(),
        )
    }

    /// Evaluates every template, in order, into the command's arguments.
    ///
    /// The first failing template aborts resolution; no partial command is
    /// ever returned.
    pub fn resolve(&self, ctx: &RequestContext<'_>) -> Result<CommandArgv, Error> {
        let mut argv = CommandArgv::with_capacity(self.templates.len());
        for (index, template) in self.templates.iter().enumerate() {
            let arg = template.evaluate(ctx).map_err(|reason| {
                warn!(location = %self.path, index, %reason, "Argument resolution failed");
                Error::ArgumentResolution { index, reason }
            })?;
            argv.push(arg);
        }
        Ok(argv)
    }
}

const MAX_DYNAMIC_SEGMENTS: usize = 16;

/// Rejects every pattern `ResourceDef::new` would panic on.
///
/// Builds the same matching regex the router builds, so a bad custom regex
/// or capture name is reported instead of aborting.
fn check_pattern(path: &str) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err("must start with '/'".to_owned());
    }

    let mut re = String::from("^");
    let mut rest = path;
    let mut dynamic = 0;
    while let Some(start) = rest.find('{') {
        re.push_str(&regex::escape(&rest[..start]));
        let segment = &rest[start..];
        let end = closing_brace(segment).ok_or("unclosed '{'")?;
        let param = &segment[1..end];
        rest = &segment[end + 1..];
        let tail = rest == "*";

        let (name, body) = match param.split_once(':') {
            Some(_) if tail => return Err("tail segments take no custom regex".to_owned()),
            Some((name, body)) => (name, body),
            None if tail => {
                rest = "";
                (param, ".*")
            }
            None => (param, "[^/]+"),
        };
        re.push_str(&format!("(?P<{name}>{body})"));
        dynamic += 1;
    }
    if dynamic > MAX_DYNAMIC_SEGMENTS {
        return Err(format!(
            "at most {MAX_DYNAMIC_SEGMENTS} dynamic segments are allowed, found {dynamic}"
        ));
    }
    re.push_str(&regex::escape(rest));

    Regex::new(&re).map(drop).map_err(|err| err.to_string())
}

fn closing_brace(segment: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in segment.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// The locations of one server, tried in configuration order.
#[derive(Debug, Default)]
pub struct Routes {
    locations: Vec<Location>,
}

impl Routes {
    /// Creates routes from locations in priority order.
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// First location matching `path`, with its captures.
    pub fn route(&self, path: &str) -> Option<(&Location, Vec<(String, String)>)> {
        self.locations
            .iter()
            .find_map(|location| location.captures(path).map(|captures| (location, captures)))
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if there are no locations.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use pretty_assertions::assert_eq;

    fn templates(args: &[&str]) -> Vec<CommandTemplate> {
        args.iter()
            .map(|arg| CommandTemplate::compile(arg, None).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert_eq!(
            Location::new("/get", vec![]).unwrap_err(),
            LocationError::EmptyCommand("/get".to_owned())
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(Location::new("/get/{key", templates(&["GET"])).is_err());
        assert!(Location::new("get", templates(&["GET"])).is_err());
        assert!(Location::new("/k/{}", templates(&["GET"])).is_err());
        assert!(Location::new("/k/{a}/{a}", templates(&["GET"])).is_err());
        assert!(Location::new("/k/{tail:.*}*", templates(&["GET"])).is_err());
    }

    #[test]
    fn test_bad_custom_regex_is_an_error() {
        let err = Location::new("/k/{id:[}", templates(&["GET", "{path.id}"])).unwrap_err();
        assert!(matches!(
            err,
            LocationError::InvalidPattern { ref path, .. } if path == "/k/{id:[}"
        ));
    }

    #[test]
    fn test_valid_patterns_are_accepted() {
        for path in ["/", "/get/{key}", "/k/{id:\\d+}", "/files/{tail}*", "/a/{x:[0-9]{2}}"] {
            assert!(Location::new(path, templates(&["GET"])).is_ok(), "{path}");
        }
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        let location = Location::new("/get/{key}", templates(&["GET", "{path.key}"])).unwrap();

        assert_eq!(
            location.captures("/get/my%20key").unwrap(),
            vec![("key".to_owned(), "my key".to_owned())]
        );
        assert_eq!(
            location.captures("/get/a%2Fb").unwrap(),
            vec![("key".to_owned(), "a/b".to_owned())]
        );
        assert_eq!(
            location.captures("/get/caf%C3%A9").unwrap(),
            vec![("key".to_owned(), "café".to_owned())]
        );
    }

    #[test]
    fn test_routes_first_match_wins() {
        let routes = Routes::new(vec![
            Location::new("/keys/special", templates(&["PING"])).unwrap(),
            Location::new("/keys/{key}", templates(&["GET", "{path.key}"])).unwrap(),
        ]);

        let (location, captures) = routes.route("/keys/special").unwrap();
        assert_eq!(location.path(), "/keys/special");
        assert!(captures.is_empty());

        let (location, captures) = routes.route("/keys/mykey").unwrap();
        assert_eq!(location.path(), "/keys/{key}");
        assert_eq!(captures, vec![("key".to_owned(), "mykey".to_owned())]);

        assert!(routes.route("/other").is_none());
    }

    #[test]
    fn test_resolve_in_template_order() {
        let location =
            Location::new("/keys/{key}", templates(&["GET", "{path.key}"])).unwrap();
        let (parts, ()) = Request::get("/keys/mykey")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = RequestContext::new(&parts, location.captures("/keys/mykey").unwrap());

        let argv = location.resolve(&ctx).unwrap();
        assert_eq!(argv.argc(), 2);
        assert_eq!(
            argv.iter().map(|arg| arg.as_ref()).collect::<Vec<&[u8]>>(),
            vec![&b"GET"[..], &b"mykey"[..]]
        );
    }

    #[test]
    fn test_resolution_failure_reports_index() {
        let location = Location::new("/q", templates(&["GET", "{query.user}"])).unwrap();
        let (parts, ()) = Request::get("/q?user%5Bname%5D=x")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = RequestContext::new(&parts, vec![]);

        assert!(matches!(
            location.resolve(&ctx),
            Err(Error::ArgumentResolution { index: 1, .. })
        ));
    }
}
