// HTTP server and request loop for the page.
//
// Architecture: one background thread owns the `PageRuntime` and a
// `tiny_http::Server`. It polls for requests with `recv_timeout`, so it can
// notice the `keep_running` flag between requests, and handles each request
// to completion before taking the next. There is no shared state and no
// locking; the runtime never leaves its thread.
//
// Routes:
//   GET  /                    the page as HTML
//   GET  /poem                the stage as JSON
//   POST /randomize           Randomize click, then 303 to /
//   POST /slogan              slogan click, then 303 to /
//   POST /image-failed/<n>    image load failure for block n, 204
//   GET  /images/<file>       static image from <data-dir>/images
// Anything else is a 404.
//
// Each POST dispatches one `UiEvent` and runs the queue until idle before
// answering, so a redirected GET always sees a settled page.
//
// `route` is a pure function of the runtime and the request line, which keeps
// the routing table testable without sockets.

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, error, info, warn};
use verse_roulette_core::{
    DatasetSource, DirSource, PageConfig, PageRuntime, UiEvent, write_page,
};
use verse_roulette_prng::{PageRng, RandomSource};

/// How often the request loop checks for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle returned by `start_server` to control the running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Signal the server to stop and wait for it to shut down.
    pub fn stop(self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread {
            let _ = handle.join();
        }
    }
}

/// Configuration for starting the page server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Holds the datasets and the `images/` directory.
    pub data_dir: PathBuf,
    pub page: PageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            page: PageConfig::default(),
        }
    }
}

/// Start the page server on a background thread. The page is loaded before
/// this returns. Returns a handle for stopping the server and the bound
/// address (useful when port 0 lets the OS pick).
pub fn start_server(config: ServerConfig) -> std::io::Result<(ServerHandle, SocketAddr)> {
    let server = Server::http(format!("{}:{}", config.host, config.port))
        .map_err(std::io::Error::other)?;
    let addr = server.server_addr().to_ip().ok_or_else(|| {
        std::io::Error::other("page server is not listening on an IP address")
    })?;

    let rng = match config.page.seed {
        Some(seed) => PageRng::new(seed),
        None => PageRng::from_clock(),
    };
    let source = DirSource::new(&config.data_dir, &config.page);
    let mut runtime = PageRuntime::new(source, rng, config.page);
    runtime.load();
    info!(%addr, data_dir = %config.data_dir.display(), "page server listening");

    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_clone = keep_running.clone();
    let data_dir = config.data_dir;

    let thread = thread::spawn(move || {
        run_server(server, runtime, data_dir, keep_running_clone);
    });

    Ok((
        ServerHandle {
            keep_running,
            thread: Some(thread),
        },
        addr,
    ))
}

/// Request loop. Runs until `keep_running` is set to false.
fn run_server<S: DatasetSource, R: RandomSource>(
    server: Server,
    mut runtime: PageRuntime<S, R>,
    data_dir: PathBuf,
    keep_running: Arc<AtomicBool>,
) {
    while keep_running.load(Ordering::SeqCst) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => handle_request(&mut runtime, &data_dir, request),
            Ok(None) => {}
            Err(e) => {
                error!(%e, "page server stopped accepting requests");
                break;
            }
        }
    }
    info!("page server shut down");
}

fn handle_request<S: DatasetSource, R: RandomSource>(
    runtime: &mut PageRuntime<S, R>,
    data_dir: &Path,
    request: Request,
) {
    let reply = route(runtime, request.method(), request.url(), data_dir);
    debug!(
        method = %request.method(),
        url = request.url(),
        status = reply.status,
        "request"
    );
    if let Err(e) = request.respond(reply.into_response()) {
        warn!(%e, "failed to write response");
    }
}

/// A response before it is handed to `tiny_http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub location: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            location: None,
            body: body.into_bytes(),
        }
    }

    fn json(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            location: None,
            body,
        }
    }

    fn see_other(location: &'static str) -> Self {
        Self {
            status: 303,
            content_type: "text/plain; charset=utf-8",
            location: Some(location),
            body: Vec::new(),
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            content_type: "text/plain; charset=utf-8",
            location: None,
            body: Vec::new(),
        }
    }

    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            location: None,
            body: message.as_bytes().to_vec(),
        }
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut response =
            Response::from_data(self.body).with_status_code(StatusCode(self.status));
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes())
        {
            response = response.with_header(header);
        }
        if let Some(location) = self.location {
            if let Ok(header) = Header::from_bytes(&b"Location"[..], location.as_bytes()) {
                response = response.with_header(header);
            }
        }
        response
    }
}

/// Map one request onto the runtime.
pub fn route<S: DatasetSource, R: RandomSource>(
    runtime: &mut PageRuntime<S, R>,
    method: &Method,
    url: &str,
    data_dir: &Path,
) -> Reply {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    match (method, path) {
        (Method::Get, "/") => Reply::html(write_page(runtime.stage())),
        (Method::Get, "/poem") => match serde_json::to_vec(runtime.stage()) {
            Ok(body) => Reply::json(body),
            Err(e) => {
                error!(%e, "failed to serialize stage");
                Reply::text(500, "internal error")
            }
        },
        (Method::Post, "/randomize") => {
            runtime.dispatch(UiEvent::RandomizeClicked);
            runtime.run_until_idle();
            Reply::see_other("/")
        }
        (Method::Post, "/slogan") => {
            runtime.dispatch(UiEvent::SloganClicked);
            runtime.run_until_idle();
            Reply::see_other("/")
        }
        (Method::Post, p) if p.starts_with("/image-failed/") => {
            match p["/image-failed/".len()..].parse::<usize>() {
                Ok(block) => {
                    runtime.dispatch(UiEvent::ImageFailed { block });
                    runtime.run_until_idle();
                    Reply::no_content()
                }
                Err(_) => Reply::text(400, "block index must be a number"),
            }
        }
        (Method::Get, p) if p.starts_with("/images/") => {
            serve_image(data_dir, &p["/images/".len()..])
        }
        _ => Reply::text(404, "not found"),
    }
}

fn serve_image(data_dir: &Path, file: &str) -> Reply {
    if !is_plain_file_name(file) {
        warn!(file, "rejected image path");
        return Reply::text(404, "not found");
    }
    let Some(content_type) = image_content_type(file) else {
        return Reply::text(404, "not found");
    };
    let path = data_dir.join("images").join(file);
    match std::fs::read(&path) {
        Ok(body) => Reply {
            status: 200,
            content_type,
            location: None,
            body,
        },
        Err(e) => {
            debug!(path = %path.display(), %e, "image not found");
            Reply::text(404, "not found")
        }
    }
}

/// A single path component with no traversal or hidden-file tricks.
fn is_plain_file_name(file: &str) -> bool {
    !file.is_empty()
        && !file.starts_with('.')
        && !file.contains(['/', '\\', '\0'])
        && !file.contains("..")
}

fn image_content_type(file: &str) -> Option<&'static str> {
    let ext = file.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
