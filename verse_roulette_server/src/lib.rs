// verse_roulette_server is the HTTP front end for the Verse Roulette page.
//
// The page itself (mode, poem, images, slogan, Randomize state) lives in
// `verse_roulette_core::PageRuntime`. This crate puts it behind a small
// HTTP server so a browser can look at it and click things:
//
// - `server.rs`: `tiny_http` listener on a background thread, the route
//                table, and the shutdown handle.
// - `main.rs`:   `verse-roulette` binary; argument parsing, log setup.
//
// One runtime serves every client. Requests are handled one at a time on the
// server thread, which gives the page the same single-threaded event order
// it would have in a browser tab.

pub mod server;

pub use server::start_server;
