//! Session lifecycle: MENU -> PLAYING -> WON | LOST, with the button
//! restarting a fresh PLAYING session from either end state.
//!
//! Each [`PuzzleState::step`] first checks the clock, then applies input.
//! A session whose time ran out is LOST even if the same tick carries a
//! completing drop.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};
use web_time::Instant;

use crate::config::CaptchaConfig;
use crate::gesture::GestureSample;
use crate::input::CursorSample;
use crate::models::Point;
use crate::permutation::GridPermutation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Menu,
    Playing,
    Won,
    Lost,
}

impl Phase {
    /// The start/reset button is live in every phase except PLAYING.
    pub fn accepts_button(self) -> bool {
        self != Phase::Playing
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// A tile picked up by the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub index: usize,
    pub dragging: bool,
    /// Where inside the tile the pick-up happened.
    pub offset: Point,
}

/// What a step changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started { restart: bool },
    Selected { index: usize },
    Swapped { from: usize, to: usize },
    DropAborted { from: usize },
    Won { moves: u32, elapsed: Duration },
    TimedOut,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameClock {
    started: Option<Instant>,
    stopped: Option<Instant>,
}

impl GameClock {
    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.stopped = None;
    }

    pub fn stop(&mut self, now: Instant) {
        if self.started.is_some() && self.stopped.is_none() {
            self.stopped = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.stopped.is_none()
    }

    pub fn start_instant(&self) -> Option<Instant> {
        self.started
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.started {
            Some(start) => self.stopped.unwrap_or(now).saturating_duration_since(start),
            None => Duration::ZERO,
        }
    }

    pub fn remaining(&self, limit: Duration, now: Instant) -> Duration {
        limit.saturating_sub(self.elapsed(now))
    }
}

/// Everything the puzzle owns. Mutated only by [`step`](Self::step); the
/// presentation layer reads it afterwards.
#[derive(Clone, Debug)]
pub struct PuzzleState {
    config: CaptchaConfig,
    phase: Phase,
    permutation: GridPermutation,
    selection: Option<Selection>,
    clock: GameClock,
    moves: u32,
    cursor: Option<CursorSample>,
    hand: Option<GestureSample>,
    now: Option<Instant>,
}

impl PuzzleState {
    pub fn new(config: CaptchaConfig) -> Self {
        let permutation = GridPermutation::identity(config.cell_count());
        PuzzleState {
            config,
            phase: Phase::Menu,
            permutation,
            selection: None,
            clock: GameClock::default(),
            moves: 0,
            cursor: None,
            hand: None,
            now: None,
        }
    }

    pub fn config(&self) -> &CaptchaConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn permutation(&self) -> &GridPermutation {
        &self.permutation
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Cursor of the last step.
    pub fn cursor(&self) -> Option<&CursorSample> {
        self.cursor.as_ref()
    }

    /// Hand reticle of the last step, if a hand was visible.
    pub fn hand(&self) -> Option<&GestureSample> {
        self.hand.as_ref()
    }

    /// Remaining time as of the last step. Full limit before the first game.
    pub fn remaining(&self) -> Duration {
        match self.now {
            Some(now) if self.clock.start_instant().is_some() => {
                self.clock.remaining(self.config.time_limit, now)
            }
            _ => self.config.time_limit,
        }
    }

    /// Whole seconds left, `limit - floor(elapsed)`, as shown on the timer.
    pub fn remaining_secs(&self) -> u64 {
        let elapsed = match self.now {
            Some(now) => self.clock.elapsed(now),
            None => Duration::ZERO,
        };
        self.config
            .time_limit
            .as_secs()
            .saturating_sub(elapsed.as_secs())
    }

    /// Grid cell under `p`: `row * N + col`, or `None` off the puzzle area.
    pub fn cell_at(&self, p: Point) -> Option<usize> {
        if !self.config.puzzle_rect().contains(p) {
            return None;
        }
        let tile = self.config.tile_size();
        let n = self.config.grid_size;
        let col = (p.x / tile) as usize;
        let row = (p.y / tile) as usize;
        if col >= n {
            return None;
        }
        let index = row * n + col;
        (index < self.permutation.len()).then_some(index)
    }

    /// Advance one tick: clock check first, then the unified input.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        sample: &CursorSample,
        hand: Option<&GestureSample>,
        now: Instant,
        rng: &mut R,
    ) -> Vec<GameEvent> {
        self.now = Some(now);
        self.cursor = Some(*sample);
        self.hand = hand.copied();

        let mut events = Vec::new();

        if self.phase == Phase::Playing && self.remaining_secs() == 0 {
            self.phase = Phase::Lost;
            self.selection = None;
            self.clock.stop(now);
            info!(moves = self.moves, "verification timed out");
            events.push(GameEvent::TimedOut);
            return events;
        }

        if sample.click_started {
            self.on_click_start(sample.position, now, rng, &mut events);
        }
        if sample.click_released {
            self.on_click_release(sample.position, now, &mut events);
        }
        debug_assert!(self.permutation.is_valid());
        events
    }

    /// Reshuffle and restart the clock.
    pub fn start_session<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> GameEvent {
        let restart = self.phase.is_finished();
        self.permutation.reset();
        // A pre-solved board would verify without any interaction.
        while self.permutation.is_identity() {
            self.permutation.shuffle(rng);
        }
        self.selection = None;
        self.moves = 0;
        self.phase = Phase::Playing;
        self.clock.start(now);
        self.now = Some(now);
        info!(restart, "verification started");
        GameEvent::Started { restart }
    }

    fn on_click_start<R: Rng + ?Sized>(
        &mut self,
        at: Point,
        now: Instant,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        if self.phase.accepts_button() {
            if self.config.button_rect().contains(at) {
                events.push(self.start_session(now, rng));
            }
            return;
        }

        let Some(index) = self.cell_at(at) else {
            return;
        };
        let tile = self.config.tile_size();
        let n = self.config.grid_size as i32;
        let cell_origin = Point::new((index as i32 % n) * tile, (index as i32 / n) * tile);
        self.selection = Some(Selection {
            index,
            dragging: true,
            offset: at - cell_origin,
        });
        debug!(index, "tile picked up");
        events.push(GameEvent::Selected { index });
    }

    fn on_click_release(&mut self, at: Point, now: Instant, events: &mut Vec<GameEvent>) {
        let Some(selection) = self.selection.take() else {
            return;
        };
        if self.phase != Phase::Playing {
            return;
        }
        let from = selection.index;
        let Some(to) = self.cell_at(at) else {
            debug!(from, x = at.x, y = at.y, "drop outside grid");
            events.push(GameEvent::DropAborted { from });
            return;
        };
        if let Err(err) = self.permutation.swap(from, to) {
            debug!(from, %err, "swap rejected");
            events.push(GameEvent::DropAborted { from });
            return;
        }
        self.moves += 1;
        debug!(from, to, "tiles swapped");
        events.push(GameEvent::Swapped { from, to });

        if self.permutation.is_identity() {
            self.phase = Phase::Won;
            self.clock.stop(now);
            let elapsed = self.clock.elapsed(now);
            info!(moves = self.moves, elapsed_ms = elapsed.as_millis() as u64, "verification passed");
            events.push(GameEvent::Won {
                moves: self.moves,
                elapsed,
            });
        }
    }
}
