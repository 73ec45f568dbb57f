//! Facade built with only the tracing layer:
//! `cargo test -p jsonlog --no-default-features --features tracing-layer`

#![cfg(all(feature = "tracing-layer", not(feature = "http"), not(feature = "config")))]

use jsonlog::prelude::*;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone, Default)]
struct TestWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for TestWriter {
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

#[test]
fn test_layer_without_http_or_config() {
    let writer = TestWriter::default();
    let config = JsonLogConfig::builder().include_key("request.method").build();
    let layer = JsonLogLayer::new(&config).unwrap().with_writer(writer.clone());

    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        tracing::event!(target: "app", tracing::Level::INFO, request.method = "GET", request.path = "/", "served");
    });

    let buffer = writer.buffer.lock().unwrap();
    let doc: Value = serde_json::from_slice(&buffer).unwrap();
    assert_eq!(
        doc,
        json!({"level": "INFO", "message": "served", "request": {"method": "GET"}})
    );
}
