//! End-to-end request logging through the tracing layer

use http::Request;
use jsonlog_extras::{JsonLogLayer, RequestLogger};
use jsonlog_core::JsonLogConfig;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone, Default)]
struct TestWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl TestWriter {
    fn lines(&self) -> Vec<Value> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("Mutex poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for TestWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn test_request() -> Request<()> {
    let mut request = Request::builder()
        .method("GET")
        .uri("/my_path?test=true&test_2=false")
        .header("host", "testserver")
        .body(())
        .unwrap();
    request
        .extensions_mut()
        .insert("127.0.0.1:50000".parse::<SocketAddr>().unwrap());
    request
}

fn request_config() -> JsonLogConfig {
    JsonLogConfig::builder()
        .include_keys([
            "request.META.REQUEST_METHOD",
            "request.META.SERVER_NAME",
            "request.environ",
        ])
        .exclude_keys(["request.META.SERVER_NAME", "request.environ.wsgi"])
        .remove_empty(true)
        .build()
}

fn expected(message: &str) -> Value {
    json!({
        "level": "INFO",
        "message": message,
        "request": {
            "environ": {
                "HTTP_HOST": "testserver",
                "PATH_INFO": "/my_path",
                "REMOTE_ADDR": "127.0.0.1",
                "REQUEST_METHOD": "GET",
                "SERVER_NAME": "testserver",
                "SERVER_PORT": "80",
                "SERVER_PROTOCOL": "HTTP/1.1",
                "QUERY_STRING": "test=true&test_2=false"
            },
            "META": {
                "REQUEST_METHOD": "GET"
            }
        }
    })
}

#[test]
fn test_request_documents_through_layer() {
    let writer = TestWriter::default();
    let config = request_config();
    let layer = JsonLogLayer::new(&config)
        .unwrap()
        .with_writer(writer.clone());
    let logger = RequestLogger::new::<()>(&config).unwrap();
    let request = test_request();

    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        logger.log(Level::INFO, "Simple message", &request);
        logger.log(
            Level::INFO,
            &format!("Composed message: {}", "this is a composed message"),
            &request,
        );
    });

    assert_eq!(
        writer.lines(),
        vec![
            expected("Simple message"),
            expected("Composed message: this is a composed message"),
        ]
    );
}

#[test]
fn test_rendered_key_order() {
    let logger = RequestLogger::new::<()>(&request_config()).unwrap();
    let line = logger.render(Level::INFO, "Simple message", &test_request());
    assert!(line.starts_with(r#"{"level":"INFO","message":"Simple message","request":{"META":"#));
    assert!(!line.contains("wsgi"));
    assert!(!line.contains("SCRIPT_NAME"));
}

#[test]
fn test_unfiltered_request_keeps_everything() {
    let config = JsonLogConfig::builder()
        .include_key("request")
        .build();
    let logger = RequestLogger::new::<()>(&config).unwrap();
    let doc: Value =
        serde_json::from_str(&logger.render(Level::DEBUG, "m", &test_request())).unwrap();

    let request = doc["request"].as_object().unwrap();
    let keys: Vec<&str> = request.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["method", "path", "query", "version", "headers", "META", "environ"]
    );
    assert_eq!(doc["request"]["environ"]["wsgi.url_scheme"], "http");
    assert_eq!(doc["request"]["META"]["SCRIPT_NAME"], "");
}
