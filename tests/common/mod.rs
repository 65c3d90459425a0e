#![allow(dead_code)]

pub mod fixtures;

use fontfall::{FallbackPipeline, FontCollection, PipelineBuilder};
use fontfall_core::{CacheKey, Fingerprint, FingerprintCache, SelectionPolicy, TtfMetadataParser};
use fontfall_traits::{FontMetadataParser, FontParseError};
use fontfall_types::ParsedFontMetadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The real parser, counting how often it is invoked.
#[derive(Debug, Default)]
pub struct CountingParser {
    calls: AtomicUsize,
}

impl CountingParser {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FontMetadataParser for CountingParser {
    fn parse(&self, data: &[u8]) -> Result<ParsedFontMetadata, FontParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        TtfMetadataParser.parse(data)
    }

    fn name(&self) -> &'static str {
        "CountingParser"
    }
}

/// A pipeline reading real files and URLs, caching under `cache_dir`.
pub fn pipeline_with_cache(cache_dir: &Path, parser: Arc<CountingParser>) -> FallbackPipeline {
    PipelineBuilder::new()
        .with_cache_dir(cache_dir)
        .with_parser(parser)
        .build()
        .expect("pipeline builds")
}

/// Where the default-policy pipeline stores metrics for `collection`.
pub fn cache_entry(cache_dir: &Path, collection: &FontCollection) -> PathBuf {
    let key = CacheKey::new(
        Fingerprint::of(&collection.variants),
        collection.fallback,
        SelectionPolicy::default(),
    );
    FingerprintCache::at(cache_dir)
        .entry_path(&key)
        .expect("directory cache has entry paths")
}

/// Writes `bytes` to `dir/name` and returns the absolute path as a string.
pub fn write_font(dir: &Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write font fixture");
    path.to_string_lossy().into_owned()
}

/// Serves `body` with status 200 to every connection, standing in for a font CDN.
pub async fn serve_font(body: Vec<u8>, file_name: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: font/ttf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{}/{}", addr, file_name)
}

/// A URL on a local port with nothing listening.
pub async fn unreachable_url(file_name: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/{}", addr, file_name)
}
