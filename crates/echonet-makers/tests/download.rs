//! Downloading against a local HTTP server.

use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use echonet_makers::cache::{CacheEntry, load_metadata, update_cache_entry};
use echonet_makers::transform::sha256_hex;
use echonet_makers::{DownloadOptions, DownloadStatus, Error, download};
use tiny_http::{Header, Response, Server, StatusCode};

const PDF_BODY: &[u8] = b"%PDF-1.5 code list";
const ETAG: &str = "\"v1\"";
const LAST_MODIFIED: &str = "Wed, 01 Oct 2025 00:00:00 GMT";

struct Reply {
    status: u16,
    body: &'static [u8],
    headers: Vec<(&'static str, &'static str)>,
}

impl Reply {
    fn ok(body: &'static [u8]) -> Self {
        Reply {
            status: 200,
            body,
            headers: vec![("ETag", ETAG), ("Last-Modified", LAST_MODIFIED)],
        }
    }

    fn status(status: u16) -> Self {
        Reply {
            status,
            body: b"",
            headers: Vec::new(),
        }
    }
}

type SeenHeaders = Vec<Vec<(String, String)>>;

/// Answer one request per reply, in order, then shut down.
///
/// The handle yields each request's headers with lowercased names.
fn serve(replies: Vec<Reply>) -> (String, JoinHandle<SeenHeaders>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for reply in replies {
            let request = server.recv().unwrap();
            seen.push(
                request
                    .headers()
                    .iter()
                    .map(|h| (h.field.to_string().to_lowercase(), h.value.to_string()))
                    .collect(),
            );

            let mut response =
                Response::from_data(reply.body.to_vec()).with_status_code(StatusCode(reply.status));
            for (name, value) in reply.headers {
                response.add_header(Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap());
            }
            request.respond(response).unwrap();
        }
        seen
    });

    (format!("http://127.0.0.1:{port}/spec_g/list_code.pdf"), handle)
}

/// A URL nothing listens on.
fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/spec_g/list_code.pdf")
}

fn options(url: &str, dir: &Path) -> DownloadOptions {
    let mut options = DownloadOptions::new(url, dir.join("list_code.pdf"));
    options.retry_delay = Duration::ZERO;
    options.timeout = Duration::from_secs(10);
    options
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Put a cached copy and its entry in place without touching the network.
fn seed_cache(options: &DownloadOptions) {
    std::fs::write(&options.dest, PDF_BODY).unwrap();
    update_cache_entry(
        &options.metadata_path,
        &options.dest,
        CacheEntry {
            url: options.url.clone(),
            last_modified: Some(LAST_MODIFIED.to_string()),
            etag: Some(ETAG.to_string()),
            size: PDF_BODY.len() as u64,
            downloaded_at: "2025-10-01T00:00:00.000Z".to_string(),
            sha256: Some(sha256_hex(PDF_BODY)),
        },
    )
    .unwrap();
}

#[test]
fn fresh_download_writes_file_and_cache_entry() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve(vec![Reply::ok(PDF_BODY)]);
    let options = options(&url, dir.path());

    let outcome = download(&options).unwrap();
    let seen = server.join().unwrap();

    assert_eq!(outcome.status, DownloadStatus::Downloaded);
    assert_eq!(outcome.size, PDF_BODY.len() as u64);
    assert_eq!(outcome.warning, None);
    assert_eq!(std::fs::read(&options.dest).unwrap(), PDF_BODY);
    assert_eq!(header(&seen[0], "if-none-match"), None);

    let metadata = load_metadata(&dir.path().join("cache-metadata.json"));
    let entry = &metadata["list_code.pdf"];
    assert_eq!(entry.url, url);
    assert_eq!(entry.etag.as_deref(), Some(ETAG));
    assert_eq!(entry.last_modified.as_deref(), Some(LAST_MODIFIED));
    assert_eq!(entry.sha256.as_deref(), Some(sha256_hex(PDF_BODY).as_str()));
}

#[test]
fn cached_copy_is_revalidated_and_kept_on_not_modified() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve(vec![Reply::ok(PDF_BODY), Reply::status(304)]);
    let options = options(&url, dir.path());

    download(&options).unwrap();
    let outcome = download(&options).unwrap();
    let seen = server.join().unwrap();

    assert_eq!(outcome.status, DownloadStatus::CacheHit);
    assert_eq!(outcome.size, PDF_BODY.len() as u64);
    assert_eq!(header(&seen[1], "if-none-match"), Some(ETAG));
    assert_eq!(header(&seen[1], "if-modified-since"), Some(LAST_MODIFIED));
    assert_eq!(std::fs::read(&options.dest).unwrap(), PDF_BODY);
}

#[test]
fn changed_file_replaces_cached_copy() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve(vec![Reply::ok(b"%PDF-1.5 updated")]);
    let options = options(&url, dir.path());
    seed_cache(&options);

    let outcome = download(&options).unwrap();
    server.join().unwrap();

    assert_eq!(outcome.status, DownloadStatus::Downloaded);
    assert_eq!(std::fs::read(&options.dest).unwrap(), b"%PDF-1.5 updated");
}

#[test]
fn force_skips_validators() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve(vec![Reply::ok(PDF_BODY)]);
    let mut options = options(&url, dir.path());
    seed_cache(&options);
    options.force = true;

    let outcome = download(&options).unwrap();
    let seen = server.join().unwrap();

    assert_eq!(outcome.status, DownloadStatus::Downloaded);
    assert_eq!(header(&seen[0], "if-none-match"), None);
    assert_eq!(header(&seen[0], "if-modified-since"), None);
}

#[test]
fn not_found_fails_without_retrying() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve(vec![Reply::status(404)]);
    let options = options(&url, dir.path());

    let err = download(&options).unwrap_err();
    let seen = server.join().unwrap();

    assert!(matches!(err, Error::Download { .. }));
    assert!(err.to_string().contains("404"), "{err}");
    assert_eq!(seen.len(), 1);
    assert!(!options.dest.exists());
}

#[test]
fn server_error_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve(vec![Reply::status(500), Reply::ok(PDF_BODY)]);
    let options = options(&url, dir.path());

    let outcome = download(&options).unwrap();
    let seen = server.join().unwrap();

    assert_eq!(outcome.status, DownloadStatus::Downloaded);
    assert_eq!(seen.len(), 2);
}

#[test]
fn persistent_server_error_gives_up_after_max_retries() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve(vec![Reply::status(503), Reply::status(503)]);
    let mut options = options(&url, dir.path());
    options.max_retries = 2;

    let err = download(&options).unwrap_err();
    server.join().unwrap();

    let msg = err.to_string();
    assert!(msg.contains("HTTP 503 after 2 attempts"), "{msg}");
}

#[test]
fn unreachable_server_falls_back_to_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(&closed_url(), dir.path());
    options.max_retries = 1;
    seed_cache(&options);

    let outcome = download(&options).unwrap();

    assert_eq!(outcome.status, DownloadStatus::CacheHit);
    let warning = outcome.warning.unwrap();
    assert!(warning.contains("using cache"), "{warning}");
}

#[test]
fn unreachable_server_without_cache_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(&closed_url(), dir.path());
    options.max_retries = 1;

    let err = download(&options).unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("network error after 1 attempts"), "{msg}");
}
