// Interaction layer: a single-threaded cooperative event loop over the stage.
//
// The runtime owns the dataset source, the random source, the stage and the
// current mode. Work arrives as `UiEvent`s, which `dispatch` appends to a
// FIFO task queue; `run_until_idle` executes tasks one at a time until the
// queue is empty. Handlers that would suspend on a fetch in a browser
// (regeneration, slogan refresh) are split in two: the event handler does
// the immediate UI change and enqueues a continuation task that does the
// rest. Anything dispatched in between observes the intermediate state.
//
// Randomize flow:
//   RandomizeClicked ─► control disabled, label "Regenerating..."
//                      └► Regenerate continuation:
//                           roll mode (30%) → resample + render → heading
//                           → slogan → control re-enabled
// A RandomizeClicked handled while the control is disabled does nothing, so
// two rapid clicks produce one cycle.
//
// Every step of a cycle recovers from its own failures (fallback poem,
// fallback slogan, error pane), so the control is always re-enabled at the
// end of the continuation.
//
// The current mode lives here as explicit state and is passed into
// `load_poem` for heading resolution; nothing else writes it.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};
use verse_roulette_prng::RandomSource;

use crate::config::PageConfig;
use crate::error::PageError;
use crate::image::ImagePool;
use crate::render::render;
use crate::slogan::{FALLBACK_SLOGAN, SLOGAN_LOADING_TEXT, load_slogan};
use crate::source::DatasetSource;
use crate::stage::Stage;
use crate::theme::{HeadingTable, ModeId, select_mode};
use crate::verse::load_poem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// The Randomize control was activated.
    RandomizeClicked,
    /// The slogan area was clicked.
    SloganClicked,
    /// The image of the given stanza block failed to load.
    ImageFailed { block: usize },
}

#[derive(Debug)]
enum Task {
    Event(UiEvent),
    Regenerate,
    RefreshSlogan,
}

pub struct PageRuntime<S, R> {
    source: S,
    rng: R,
    config: PageConfig,
    pool: ImagePool,
    headings: HeadingTable,
    stage: Stage,
    current_mode: Option<ModeId>,
    queue: VecDeque<Task>,
    completed_cycles: u64,
}

impl<S: DatasetSource, R: RandomSource> PageRuntime<S, R> {
    pub fn new(source: S, rng: R, config: PageConfig) -> Self {
        Self {
            source,
            rng,
            config,
            pool: ImagePool::default(),
            headings: HeadingTable::default(),
            stage: Stage::new(),
            current_mode: None,
            queue: VecDeque::new(),
            completed_cycles: 0,
        }
    }

    pub fn with_pool(mut self, pool: ImagePool) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_headings(mut self, headings: HeadingTable) -> Self {
        self.headings = headings;
        self
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn current_mode(&self) -> Option<ModeId> {
        self.current_mode
    }

    /// Number of Randomize cycles that have run to completion.
    pub fn completed_cycles(&self) -> u64 {
        self.completed_cycles
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Initial page load: slogan, mode, poem, heading.
    pub fn load(&mut self) {
        info!("loading page");
        self.refresh_slogan();
        let mode = select_mode(&mut self.rng);
        self.set_mode(mode);
        self.generate_poem();
    }

    /// Queue an event. Nothing runs until `run_until_idle`.
    pub fn dispatch(&mut self, event: UiEvent) {
        self.queue.push_back(Task::Event(event));
    }

    /// Run queued tasks, including continuations they enqueue, until the
    /// queue is empty. Returns the number of tasks run.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.queue.pop_front() {
            self.run_task(task);
            ran += 1;
        }
        ran
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Event(event) => self.on_event(event),
            Task::Regenerate => self.regenerate(),
            Task::RefreshSlogan => self.refresh_slogan(),
        }
    }

    fn on_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::RandomizeClicked => {
                if !self.stage.begin_busy() {
                    debug!("randomize ignored, regeneration in flight");
                    return;
                }
                self.queue.push_back(Task::Regenerate);
            }
            UiEvent::SloganClicked => {
                self.stage.show_slogan(SLOGAN_LOADING_TEXT);
                self.queue.push_back(Task::RefreshSlogan);
            }
            UiEvent::ImageFailed { block } => self.retry_image(block),
        }
    }

    fn regenerate(&mut self) {
        let cycle = self.completed_cycles + 1;
        let span = info_span!("regenerate", cycle);
        let _guard = span.enter();

        if self.rng.random_bool(self.config.mode_reroll_probability) {
            let mode = select_mode(&mut self.rng);
            self.set_mode(mode);
        }
        self.generate_poem();
        self.refresh_slogan();

        self.completed_cycles = cycle;
        self.stage.end_busy();
    }

    fn set_mode(&mut self, mode: ModeId) {
        info!(mode = mode.key(), "applying mode");
        self.current_mode = Some(mode);
        self.stage.apply_mode(mode);
    }

    fn generate_poem(&mut self) {
        let poem = load_poem(
            &mut self.source,
            self.current_mode,
            &self.headings,
            &mut self.rng,
        );
        let pane = render(&poem, &self.pool, &mut self.rng, self.config.stagger_ms);
        self.stage.show_poem(pane);
        self.stage.set_heading(&poem.title, &poem.subtitle);
    }

    fn refresh_slogan(&mut self) {
        match load_slogan(&mut self.source, &mut self.rng) {
            Ok(slogan) => {
                info!(category = %slogan.category, text = %slogan.text, "loaded slogan");
                self.stage.show_slogan(&slogan.text);
            }
            Err(err) => {
                warn!(%err, "showing fallback slogan");
                self.stage.show_slogan(FALLBACK_SLOGAN);
            }
        }
    }

    fn retry_image(&mut self, index: usize) {
        let Some(block) = self.stage.block_mut(index) else {
            debug!(block = index, "image failure for a block that is not showing");
            return;
        };
        if block.image_retried {
            debug!(block = index, "image already retried, leaving it broken");
            return;
        }
        block.image_retried = true;

        let failure = PageError::ImageLoadFailure {
            src: block.image.src.clone(),
        };
        match self.pool.fallback_for(&block.image) {
            Some(backup) => {
                warn!(%failure, backup = %backup.src, "swapping in backup image");
                block.image = backup;
            }
            None => warn!(%failure, "no backup image with the same tag"),
        }
    }
}
