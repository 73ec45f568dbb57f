//! `http::Request` adapter
//!
//! [`HttpRequestSource`] exposes a request as an attribute tree that key
//! rules can address:
//!
//! | attribute | content |
//! |-----------|---------|
//! | `method`  | request method |
//! | `path`    | URI path |
//! | `query`   | URI query, `null` when absent |
//! | `version` | protocol version (`HTTP/1.1`) |
//! | `headers` | lower-case header name to value |
//! | `META`    | CGI-style variables (`REQUEST_METHOD`, `PATH_INFO`, `HTTP_*`, ...) |
//! | `environ` | `META` plus the `wsgi.*` entries |
//!
//! Header values listed in the redaction set render as `[REDACTED]`. Nothing
//! is computed for an attribute the key rules reject.

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::{HeaderMap, HeaderName, Request, Version};
use jsonlog_core::{AccessError, Attr, AttributeSource, Kind, LogRecord, RecordValue};
use serde_json::{json, Map, Value};
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::sync::OnceLock;

/// Replacement for redacted header values
pub const REDACTED: &str = "[REDACTED]";

const ATTRIBUTES: [&str; 7] = ["method", "path", "query", "version", "headers", "META", "environ"];

/// Headers redacted when no explicit set is given
pub fn default_redactions() -> &'static HashSet<String> {
    static DEFAULTS: OnceLock<HashSet<String>> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        ["authorization", "cookie", "x-api-key", "x-auth-token"]
            .into_iter()
            .map(String::from)
            .collect()
    })
}

/// Attribute tree view of an `http::Request`
pub struct HttpRequestSource<'a, B> {
    request: &'a Request<B>,
    redact: &'a HashSet<String>,
}

impl<'a, B> HttpRequestSource<'a, B> {
    /// View `request` with the default redaction set
    pub fn new(request: &'a Request<B>) -> Self {
        Self {
            request,
            redact: default_redactions(),
        }
    }

    /// Use another redaction set (lower-case header names)
    pub fn redact(mut self, headers: &'a HashSet<String>) -> Self {
        self.redact = headers;
        self
    }

    /// All values of one header joined with `, `, or a single marker when
    /// the name is redacted
    fn header_value(&self, headers: &HeaderMap, name: &HeaderName) -> String {
        if self.redact.contains(name.as_str()) {
            return REDACTED.to_string();
        }
        headers
            .get_all(name)
            .iter()
            .map(|value| value.to_str().unwrap_or("[non-utf8]"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One entry per distinct header name, in map order
    fn collect_headers<F>(&self, key: F) -> Map<String, Value>
    where
        F: Fn(&str) -> String,
    {
        let headers = self.request.headers();
        headers
            .keys()
            .map(|name| {
                let value = self.header_value(headers, name);
                (key(name.as_str()), Value::String(value))
            })
            .collect()
    }

    fn headers(&self) -> Value {
        Value::Object(self.collect_headers(str::to_string))
    }

    fn environ(&self, wsgi: bool) -> Value {
        let request = self.request;
        let uri = request.uri();
        let mut env = Map::new();

        for (name, key) in [(CONTENT_LENGTH, "CONTENT_LENGTH"), (CONTENT_TYPE, "CONTENT_TYPE")] {
            if request.headers().contains_key(&name) {
                let value = self.header_value(request.headers(), &name);
                env.insert(key.into(), value.into());
            }
        }
        let cgi_headers = self.collect_headers(|name| {
            format!("HTTP_{}", name.to_ascii_uppercase().replace('-', "_"))
        });
        for (key, value) in cgi_headers {
            if key != "HTTP_CONTENT_LENGTH" && key != "HTTP_CONTENT_TYPE" {
                env.insert(key, value);
            }
        }

        let scheme = uri.scheme_str().unwrap_or("http");
        let (server_name, server_port) = server_address(request, scheme);

        env.insert("PATH_INFO".into(), uri.path().into());
        env.insert("QUERY_STRING".into(), uri.query().unwrap_or("").into());
        if let Some(addr) = remote_addr(request) {
            env.insert("REMOTE_ADDR".into(), addr.into());
        }
        env.insert("REQUEST_METHOD".into(), request.method().as_str().into());
        env.insert("SCRIPT_NAME".into(), "".into());
        env.insert("SERVER_NAME".into(), server_name.into());
        env.insert("SERVER_PORT".into(), server_port.into());
        env.insert("SERVER_PROTOCOL".into(), protocol(request.version()).into());

        if wsgi {
            env.insert("wsgi.version".into(), json!([1, 0]));
            env.insert("wsgi.url_scheme".into(), scheme.into());
            env.insert("wsgi.multithread".into(), true.into());
            env.insert("wsgi.multiprocess".into(), false.into());
            env.insert("wsgi.run_once".into(), false.into());
        }
        Value::Object(env)
    }
}

impl<B> AttributeSource for HttpRequestSource<'_, B> {
    fn kind(&self) -> Kind {
        Kind::Object
    }

    fn keys(&self) -> Vec<Cow<'_, str>> {
        ATTRIBUTES.iter().map(|k| Cow::Borrowed(*k)).collect()
    }

    fn attribute(&self, name: &str) -> Result<Attr<'_>, AccessError> {
        let uri = self.request.uri();
        let value = match name {
            "method" => Value::from(self.request.method().as_str()),
            "path" => Value::from(uri.path()),
            "query" => uri.query().map_or(Value::Null, Value::from),
            "version" => Value::from(protocol(self.request.version())),
            "headers" => self.headers(),
            "META" => self.environ(false),
            "environ" => self.environ(true),
            _ => return Err(AccessError::Missing(name.to_string())),
        };
        Ok(Attr::owned(value))
    }

    fn describe(&self) -> String {
        describe_request(self.request.method(), self.request.uri())
    }
}

fn protocol(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

/// Server name and port from the URI authority, else the Host header
fn server_address<B>(request: &Request<B>, scheme: &str) -> (String, String) {
    let default_port = if scheme == "https" { "443" } else { "80" };
    if let Some(host) = request.uri().host() {
        let port = request
            .uri()
            .port_u16()
            .map_or_else(|| default_port.to_string(), |p| p.to_string());
        return (host.to_string(), port);
    }
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    match host.rsplit_once(':') {
        Some((name, port)) if port.parse::<u16>().is_ok() => (name.to_string(), port.to_string()),
        _ => (host.to_string(), default_port.to_string()),
    }
}

/// Peer address from the connection info extension, else proxy headers
fn remote_addr<B>(request: &Request<B>) -> Option<String> {
    if let Some(addr) = request.extensions().get::<SocketAddr>() {
        return Some(addr.ip().to_string());
    }
    request
        .headers()
        .get("x-forwarded-for")
        .or_else(|| request.headers().get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|s| {
            // X-Forwarded-For can have multiple IPs, take the first
            s.split(',').next().unwrap_or(s).trim().to_string()
        })
}

fn describe_request(method: &http::Method, uri: &http::Uri) -> String {
    format!("<Request: {} '{}'>", method, uri)
}

/// Encoder hook for requests attached to a record as opaque values.
///
/// Renders `http::Request<B>` and `http::request::Parts` as
/// `{"request": "<Request: GET '/path'>"}`.
pub struct HttpRequestEncoder<B> {
    _body: PhantomData<fn() -> B>,
}

impl<B> HttpRequestEncoder<B> {
    /// Create an encoder for requests with body type `B`
    pub fn new() -> Self {
        Self { _body: PhantomData }
    }
}

impl<B> Default for HttpRequestEncoder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Any> jsonlog_core::Encoder for HttpRequestEncoder<B> {
    fn render(&self, value: &dyn AttributeSource) -> Option<Value> {
        let any = value.as_any()?;
        let described = if let Some(request) = any.downcast_ref::<Request<B>>() {
            describe_request(request.method(), request.uri())
        } else {
            let parts = any.downcast_ref::<http::request::Parts>()?;
            describe_request(&parts.method, &parts.uri)
        };
        Some(json!({ "request": described }))
    }
}

/// Add flat `request_method` and `request_path` attributes to a record
pub fn flatten_request<B>(record: &mut LogRecord<'_>, request: &Request<B>) {
    record.set("request_method", RecordValue::Json(request.method().as_str().into()));
    record.set("request_path", RecordValue::Json(request.uri().path().into()));
}
