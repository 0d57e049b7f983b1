//! Frame loop
//!
//! Host-owned scheduler replacing a self-re-registering animation callback:
//! one explicit loop asks the clock for the time, calls
//! `LessonPipeline::render_frame` once, and repeats. At most one frame is in
//! flight. A failed frame is logged and skipped; the next tick proceeds
//! normally.

use thiserror::Error;

use crate::core::{ConfigError, LessonConfig};
use crate::foundation::time::TimeSource;
use crate::render::{LessonPipeline, RenderContext, RenderError};

/// Frame loop errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Lesson configuration could not be loaded
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline could not be built
    #[error("Initialization failed: {0}")]
    InitializationFailed(#[from] RenderError),

    /// Too many frames in a row failed
    #[error("Rendering stalled: {consecutive} consecutive frames failed, last error: {last_error}")]
    Stalled {
        /// Failed frames in a row
        consecutive: u32,
        /// Message of the most recent failure
        last_error: String,
    },
}

/// Outcome counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames drawn
    pub rendered: u64,
    /// Frames that failed and were skipped
    pub skipped: u64,
}

impl FrameStats {
    /// Ticks taken
    pub const fn total(&self) -> u64 {
        self.rendered + self.skipped
    }
}

/// Explicit frame scheduler
#[derive(Debug)]
pub struct FrameLoop<T: TimeSource> {
    clock: T,
    frame_limit: Option<u64>,
    max_consecutive_failures: Option<u32>,
    consecutive_failures: u32,
    stats: FrameStats,
    running: bool,
}

impl<T: TimeSource> FrameLoop<T> {
    /// Create a loop driven by `clock`
    pub fn new(clock: T) -> Self {
        Self {
            clock,
            frame_limit: None,
            max_consecutive_failures: None,
            consecutive_failures: 0,
            stats: FrameStats { rendered: 0, skipped: 0 },
            running: true,
        }
    }

    /// Stop after `frames` ticks
    pub fn with_frame_limit(mut self, frames: Option<u64>) -> Self {
        self.frame_limit = frames;
        self
    }

    /// Give up once `failures` frames in a row have failed
    pub fn with_max_consecutive_failures(mut self, failures: u32) -> Self {
        self.max_consecutive_failures = Some(failures);
        self
    }

    /// Counts so far
    pub const fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Whether another tick will run
    pub fn is_running(&self) -> bool {
        self.running && self.frame_limit.map_or(true, |limit| self.stats.total() < limit)
    }

    /// Stop before the next tick
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Frame loop stopping after {} frames", self.stats.total());
        }
        self.running = false;
    }

    /// Run one tick
    ///
    /// Returns the frame's error after counting it as skipped; the caller
    /// decides whether to keep going.
    pub fn step<C: RenderContext + ?Sized>(
        &mut self,
        pipeline: &mut LessonPipeline,
        ctx: &mut C,
    ) -> Result<(), RenderError> {
        let elapsed_ms = self.clock.tick();
        match pipeline.render_frame(elapsed_ms, ctx) {
            Ok(()) => {
                self.stats.rendered += 1;
                self.consecutive_failures = 0;
                Ok(())
            }
            Err(e) => {
                self.stats.skipped += 1;
                self.consecutive_failures += 1;
                log::warn!("Skipping frame {} at {:.1} ms: {}", self.clock.frame_count(), elapsed_ms, e);
                Err(e)
            }
        }
    }

    /// Tick until the frame limit or `stop`
    ///
    /// Without a frame limit this only returns on a stall.
    pub fn run<C: RenderContext + ?Sized>(
        &mut self,
        pipeline: &mut LessonPipeline,
        ctx: &mut C,
    ) -> Result<FrameStats, EngineError> {
        log::info!("Starting frame loop ({} mode)", pipeline.mode());
        while self.is_running() {
            if let Err(e) = self.step(pipeline, ctx) {
                if let Some(max) = self.max_consecutive_failures {
                    if self.consecutive_failures >= max {
                        self.running = false;
                        return Err(EngineError::Stalled {
                            consecutive: self.consecutive_failures,
                            last_error: e.to_string(),
                        });
                    }
                }
            }
        }
        log::info!(
            "Frame loop finished: {} rendered, {} skipped",
            self.stats.rendered,
            self.stats.skipped
        );
        Ok(self.stats)
    }
}

/// Build the pipeline for `config` and run it to its frame limit
pub fn run_lesson<C, T>(config: &LessonConfig, ctx: &mut C, clock: T) -> Result<FrameStats, EngineError>
where
    C: RenderContext + ?Sized,
    T: TimeSource,
{
    let mut pipeline = LessonPipeline::new(config, ctx)?;
    FrameLoop::new(clock)
        .with_frame_limit(config.frame_limit)
        .run(&mut pipeline, ctx)
}
