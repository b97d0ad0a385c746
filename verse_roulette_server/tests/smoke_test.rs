// Integration smoke test for the page server.
//
// Writes a small data directory (verse and slogan datasets plus one local
// image) to a temp dir, starts the server on an OS-picked port, and talks to
// it over plain TCP with hand-written HTTP/1.1 requests: load the page, read
// the JSON stage, click Randomize, click the slogan, report an image
// failure, fetch an image, and try a traversal attempt and an unknown
// route.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use verse_roulette_core::PageConfig;
use verse_roulette_server::server::{ServerConfig, start_server};

const VERSES: &str = r#"[
    {"id": 1, "act": "ACT_1", "text": "Booted up at sunrise", "notes": "first"},
    {"id": 2, "act": "ACT_2", "text": "Blurbo filed a ticket", "notes": "second"},
    {"id": 3, "act": "ACT_3", "text": "Walkies at last", "notes": "third", "ending_type": "happy"}
]"#;

const SLOGANS: &str = r#"{"ute": ["Tray back, bring the dog."]}"#;

struct HttpReply {
    status: u16,
    head: String,
    body: Vec<u8>,
}

impl HttpReply {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim().to_owned())
        })
    }
}

/// Helper: send one request with `Connection: close` and read the whole
/// response.
fn request(addr: SocketAddr, method: &str, path: &str) -> HttpReply {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    write!(
        stream,
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    )
    .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).unwrap();
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).into_owned();
    let body = raw[split + 4..].to_vec();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("response has no status code");
    HttpReply { status, head, body }
}

fn start(dir: &std::path::Path) -> (verse_roulette_server::server::ServerHandle, SocketAddr) {
    let config = ServerConfig {
        port: 0,
        data_dir: dir.to_path_buf(),
        page: PageConfig {
            seed: Some(42),
            ..PageConfig::default()
        },
        ..ServerConfig::default()
    };
    start_server(config).unwrap()
}

#[test]
fn page_round_trip_over_http() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("poem.json"), VERSES).unwrap();
    std::fs::write(dir.path().join("aussie-slogans.json"), SLOGANS).unwrap();
    std::fs::create_dir(dir.path().join("images")).unwrap();
    std::fs::write(dir.path().join("images/sunrise.jpg"), b"not really a jpeg").unwrap();

    let (handle, addr) = start(dir.path());

    // Initial page.
    let page = request(addr, "GET", "/");
    assert_eq!(page.status, 200);
    let html = page.text();
    assert!(html.contains("Dog+Me+Daddy"));
    assert!(html.contains("Booted up at sunrise"));
    assert!(html.contains("ACT_3 (happy ending)"));
    assert!(html.contains("Tray back, bring the dog."));
    assert!(html.contains("id=\"regenerate-btn\""));

    // JSON view of the same stage.
    let poem = request(addr, "GET", "/poem");
    assert_eq!(poem.status, 200);
    let stage: serde_json::Value = serde_json::from_slice(&poem.body).unwrap();
    assert_eq!(stage["poem"]["state"], "poem");
    assert_eq!(stage["poem"]["content"]["blocks"].as_array().unwrap().len(), 3);
    assert_eq!(stage["control"]["disabled"], false);

    // Randomize answers with a redirect once the cycle is done.
    let randomize = request(addr, "POST", "/randomize");
    assert_eq!(randomize.status, 303);
    assert_eq!(randomize.header("Location").as_deref(), Some("/"));
    let after: serde_json::Value =
        serde_json::from_slice(&request(addr, "GET", "/poem").body).unwrap();
    assert_eq!(after["control"]["label"], "Randomize");

    let slogan = request(addr, "POST", "/slogan");
    assert_eq!(slogan.status, 303);

    let failed = request(addr, "POST", "/image-failed/0");
    assert_eq!(failed.status, 204);
    let after: serde_json::Value =
        serde_json::from_slice(&request(addr, "GET", "/poem").body).unwrap();
    assert_eq!(after["poem"]["content"]["blocks"][0]["image_retried"], true);

    // Static images.
    let image = request(addr, "GET", "/images/sunrise.jpg");
    assert_eq!(image.status, 200);
    assert_eq!(image.header("Content-Type").as_deref(), Some("image/jpeg"));
    assert_eq!(image.body, b"not really a jpeg");

    assert_eq!(request(addr, "GET", "/images/..%2Fpoem.json").status, 404);
    assert_eq!(request(addr, "GET", "/nowhere").status, 404);

    handle.stop();
}

#[test]
fn missing_datasets_still_serve_a_page() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, addr) = start(dir.path());

    let page = request(addr, "GET", "/");
    assert_eq!(page.status, 200);
    let html = page.text();
    assert!(html.contains("Nature&#39;s Symphony"));
    assert!(html.contains("extreme Australian energy"));

    handle.stop();
}
