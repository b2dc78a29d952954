//! Command argument templates.
//!
//! A template is literal text with placeholders in braces, compiled once when
//! the configuration is loaded and evaluated once per request:
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `{method}` | request method |
//! | `{uri}` | path and query, as received |
//! | `{path}` | request path |
//! | `{query}` | raw query string |
//! | `{path.NAME}` | segment captured by the location pattern |
//! | `{query.NAME}` | decoded query parameter |
//! | `{header.NAME}` | request header value |
//! | `{script}` | digest of the location's script, fixed at compile time |
//!
//! `{{` and `}}` stand for literal braces. A missing capture, parameter or
//! header evaluates to an empty string.
//!
//! ```
//! use r4x_http::CommandTemplate;
//!
//! let template = CommandTemplate::compile("user:{path.id}", None).unwrap();
//! assert_eq!(template.fragments().len(), 2);
//! ```

use bytes::{Bytes, BytesMut};
use http::HeaderName;
use r4x_core::Digest;
use thiserror::Error;

use crate::RequestContext;

/// Failure to compile a template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{` without its closing `}`.
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),
    /// A `}` that closes nothing.
    #[error("unmatched '}}' at byte {0}")]
    Unmatched(usize),
    /// Placeholder name not in the table of known variables.
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    /// `{header.NAME}` with a name that is not a valid header name.
    #[error("invalid header name in {{header.{0}}}")]
    InvalidHeader(String),
    /// `{script}` used by a location without a script.
    #[error("{{script}} requires a script for this location")]
    NoScript,
}

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text.
    Literal(Bytes),
    /// Request method.
    Method,
    /// Path and query.
    Uri,
    /// Request path.
    Path,
    /// Raw query string.
    Query,
    /// Location capture.
    Capture(String),
    /// Decoded query parameter.
    QueryParam(String),
    /// Request header.
    Header(HeaderName),
}

/// A compiled command argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    fragments: Vec<Fragment>,
}

impl CommandTemplate {
    /// Compiles `source`. `script` is substituted for `{script}`.
    pub fn compile(source: &str, script: Option<&Digest>) -> Result<Self, TemplateError> {
        let bytes = source.as_bytes();
        let mut fragments = Vec::new();
        let mut literal = BytesMut::new();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b'{' if bytes.get(pos + 1) == Some(&b'{') => {
                    literal.extend_from_slice(b"{");
                    pos += 2;
                }
                b'}' if bytes.get(pos + 1) == Some(&b'}') => {
                    literal.extend_from_slice(b"}");
                    pos += 2;
                }
                b'}' => return Err(TemplateError::Unmatched(pos)),
                b'{' => {
                    let len = bytes[pos + 1..]
                        .iter()
                        .position(|&b| b == b'}')
                        .ok_or(TemplateError::Unclosed(pos))?;
                    let name = &source[pos + 1..pos + 1 + len];
                    let fragment = match placeholder(name, script)? {
                        Fragment::Literal(text) => {
                            literal.extend_from_slice(&text);
                            None
                        }
                        fragment => Some(fragment),
                    };
                    if let Some(fragment) = fragment {
                        if !literal.is_empty() {
                            fragments.push(Fragment::Literal(literal.split().freeze()));
                        }
                        fragments.push(fragment);
                    }
                    pos += len + 2;
                }
                _ => {
                    let len = bytes[pos..]
                        .iter()
                        .position(|&b| b == b'{' || b == b'}')
                        .unwrap_or(bytes.len() - pos);
                    literal.extend_from_slice(&bytes[pos..pos + len]);
                    pos += len;
                }
            }
        }

        if !literal.is_empty() || fragments.is_empty() {
            fragments.push(Fragment::Literal(literal.freeze()));
        }
        Ok(Self { fragments })
    }

    /// Compiled fragments, in order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Returns `true` if the template has no placeholders left after compile.
    pub fn is_static(&self) -> bool {
        matches!(self.fragments.as_slice(), [Fragment::Literal(_)])
    }

    /// Evaluates the template for one request.
    ///
    /// Static templates hand out their literal without copying.
    pub fn evaluate(&self, ctx: &RequestContext<'_>) -> Result<Bytes, String> {
        if let [Fragment::Literal(text)] = self.fragments.as_slice() {
            return Ok(text.clone());
        }

        let parts = ctx.parts();
        let mut out = BytesMut::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => out.extend_from_slice(text),
                Fragment::Method => out.extend_from_slice(parts.method.as_str().as_bytes()),
                Fragment::Uri => {
                    let uri = parts
                        .uri
                        .path_and_query()
                        .map(|pq| pq.as_str())
                        .unwrap_or_else(|| parts.uri.path());
                    out.extend_from_slice(uri.as_bytes());
                }
                Fragment::Path => out.extend_from_slice(parts.uri.path().as_bytes()),
                Fragment::Query => {
                    out.extend_from_slice(parts.uri.query().unwrap_or_default().as_bytes())
                }
                Fragment::Capture(name) => {
                    out.extend_from_slice(ctx.capture(name).unwrap_or_default().as_bytes())
                }
                Fragment::QueryParam(name) => {
                    if let Some(value) = ctx.query_param(name)? {
                        out.extend_from_slice(value.as_bytes());
                    }
                }
                Fragment::Header(name) => {
                    if let Some(value) = parts.headers.get(name) {
                        out.extend_from_slice(value.as_bytes());
                    }
                }
            }
        }
        Ok(out.freeze())
    }
}

fn placeholder(name: &str, script: Option<&Digest>) -> Result<Fragment, TemplateError> {
    let fragment = match name.split_once('.') {
        None => match name {
            "method" => Fragment::Method,
            "uri" => Fragment::Uri,
            "path" => Fragment::Path,
            "query" => Fragment::Query,
            "script" => {
                let digest = script.ok_or(TemplateError::NoScript)?;
                Fragment::Literal(Bytes::copy_from_slice(digest.as_bytes()))
            }
            _ => return Err(TemplateError::UnknownPlaceholder(name.to_owned())),
        },
        Some(("path", capture)) if !capture.is_empty() => Fragment::Capture(capture.to_owned()),
        Some(("query", param)) if !param.is_empty() => Fragment::QueryParam(param.to_owned()),
        Some(("header", header)) => HeaderName::from_bytes(header.as_bytes())
            .map(Fragment::Header)
            .map_err(|_| TemplateError::InvalidHeader(header.to_owned()))?,
        _ => return Err(TemplateError::UnknownPlaceholder(name.to_owned())),
    };
    Ok(fragment)
}
