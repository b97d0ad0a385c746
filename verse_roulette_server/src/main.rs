// CLI entry point for the Verse Roulette page server.
//
// Loads the page once at startup and serves it until the process is killed.
// See `server.rs` for the routes.
//
// Usage:
//   verse-roulette [OPTIONS]
//     --host <HOST>         Bind address (default: 127.0.0.1)
//     --port <PORT>         Listen port (default: 8080)
//     --data-dir <DIR>      Datasets and images/ (default: data)
//     --config <FILE>       Page config JSON (optional)
//     --seed <N>            Fixed PRNG seed (overrides the config file)
//
// Log verbosity follows RUST_LOG (default: info).

use std::path::PathBuf;

use tracing::error;
use tracing_subscriber::EnvFilter;
use verse_roulette_core::PageConfig;
use verse_roulette_server::server::{ServerConfig, start_server};

fn main() {
    init_logging();
    let config = parse_args();

    let (handle, addr) = match start_server(config) {
        Ok(result) => result,
        Err(e) => {
            error!(%e, "failed to start page server");
            std::process::exit(1);
        }
    };

    println!("Verse Roulette on http://{addr}/");
    println!("Press Ctrl+C to stop.");

    // The process exits on SIGINT; the server thread goes with it.
    let _handle = handle;
    loop {
        std::thread::park();
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Parse command-line arguments into a `ServerConfig`. Uses simple
/// `std::env::args()` matching, no clap dependency.
fn parse_args() -> ServerConfig {
    let mut config = ServerConfig::default();
    let mut config_file: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                i += 1;
                config.host = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--host requires a value");
                    std::process::exit(1);
                });
            }
            "--port" => {
                i += 1;
                config.port = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--port requires a valid port number");
                    std::process::exit(1);
                });
            }
            "--data-dir" => {
                i += 1;
                config.data_dir = args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--data-dir requires a path");
                    std::process::exit(1);
                });
            }
            "--config" => {
                i += 1;
                config_file = args.get(i).map(PathBuf::from).or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                });
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|s| s.parse().ok()).or_else(|| {
                    eprintln!("--seed requires a number");
                    std::process::exit(1);
                });
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(path) = config_file {
        config.page = PageConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });
    }
    if seed.is_some() {
        config.page.seed = seed;
    }

    config
}

fn print_usage() {
    println!("Usage: verse-roulette [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host <HOST>         Bind address (default: 127.0.0.1)");
    println!("  --port <PORT>         Listen port (default: 8080)");
    println!("  --data-dir <DIR>      Datasets and images/ (default: data)");
    println!("  --config <FILE>       Page config JSON (optional)");
    println!("  --seed <N>            Fixed PRNG seed");
    println!("  --help, -h            Show this help");
}
