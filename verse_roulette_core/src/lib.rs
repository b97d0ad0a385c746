// Verse Roulette core: everything the page does, minus the transport.
//
// A page load picks a visual mode, samples one verse per narrative act from
// the verse dataset, pairs each verse with an illustrative image, and lays
// the result out as a staged poem. A tagline is drawn independently from the
// slogan dataset. "Randomize" re-rolls the lot; clicking the slogan re-rolls
// only the tagline.
//
// Architecture:
// - `theme.rs`:   Mode registry (palette, fonts, background) and the
//                 per-mode title/subtitle table.
// - `verse.rs`:   Verse dataset parsing, per-act sampling, built-in
//                 fallback poem, `load_poem`.
// - `image.rs`:   Fixed image pool and the explicit → preferred-tag →
//                 unused → any resolution policy, plus load-failure fallback.
// - `render.rs`:  Pure render tree (`PoemView`) with staggered entry delays;
//                 render failures become a static error pane.
// - `slogan.rs`:  Slogan dataset and random tagline pick.
// - `stage.rs`:   The page surface as plain data: theme, mode indicator,
//                 header, poem pane, slogan text, Randomize control.
// - `runtime.rs`: Single-threaded cooperative event queue driving the stage
//                 (the interaction layer).
// - `html.rs`:    Serializes a `Stage` into a complete HTML document.
// - `source.rs`:  `DatasetSource` trait with directory and in-memory sources.
// - `config.rs`:  `PageConfig`, loaded from JSON.
// - `error.rs`:   `PageError`.
//
// All randomness goes through `verse_roulette_prng::RandomSource`, so every
// selection can be scripted in tests.

pub mod config;
pub mod error;
pub mod html;
pub mod image;
pub mod render;
pub mod runtime;
pub mod slogan;
pub mod source;
pub mod stage;
pub mod theme;
pub mod verse;

// Re-export key types at crate root for convenience.
pub use config::PageConfig;
pub use error::{Dataset, PageError};
pub use html::write_page;
pub use image::{Image, ImagePool, UsedSources};
pub use render::{PoemPane, PoemView, StanzaBlock};
pub use runtime::{PageRuntime, UiEvent};
pub use slogan::{Slogan, SloganBook};
pub use source::{DatasetSource, DirSource, StaticSource};
pub use stage::Stage;
pub use theme::{HeadingTable, Mode, ModeId};
pub use verse::{Act, PoemData, Stanza, Verse, VerseDataset};
