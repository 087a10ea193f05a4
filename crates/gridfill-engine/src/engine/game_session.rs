use std::time::Duration;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::core::{GridState, Offset, PieceId, Position, ShapeId, can_place_shape, legal_anchors};

use super::{
    ComboTracker, GameStats, HighScoreStore, LineClear, PieceDescriptor, SUPPLY_SLOTS,
    ScoringRules, SupplyGenerator, SupplyPiece, SupplyQueue, SupplySeed, clear_lines,
    has_legal_move,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum SessionState {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// A session operation was requested in a state that does not allow it.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("cannot {action} a session in state {state:?}")]
pub struct SessionStateError {
    pub action: &'static str,
    pub state: SessionState,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("session is not playing (state: {state:?})")]
pub struct NotPlayingError {
    pub state: SessionState,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlaceError {
    #[display("{_0}")]
    NotPlaying(NotPlayingError),
    #[display("supply slot {slot} is empty")]
    EmptySupplySlot { slot: usize },
    #[display("shape {shape} does not fit at {anchor}")]
    InvalidPlacement { shape: ShapeId, anchor: Position },
}

/// Everything that happened as the result of one accepted placement.
///
/// The cleared line indices are a snapshot taken at clear time, ready to drive
/// an animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOutcome {
    pub slot: usize,
    pub piece: PieceId,
    pub shape: ShapeId,
    pub anchor: Position,
    pub placement_score: usize,
    pub clear_score: usize,
    pub lines: LineClear,
    /// Combo count after this placement, if it cleared anything.
    pub combo: Option<usize>,
    /// A new wave was dealt because this placement used the last supply piece.
    pub wave_refilled: bool,
    pub game_over: bool,
}

impl PlacementOutcome {
    #[must_use]
    pub fn rows_cleared(&self) -> usize {
        self.lines.rows_cleared()
    }

    #[must_use]
    pub fn columns_cleared(&self) -> usize {
        self.lines.columns_cleared()
    }

    #[must_use]
    pub fn score_delta(&self) -> usize {
        self.placement_score + self.clear_score
    }
}

/// A single play session.
///
/// Owns the board, the supply, scoring state and the frame clock, and drives
/// the state machine:
///
/// ```text
/// Menu --start--> Playing <--pause/resume--> Paused
///                    |                          |
///                    +---- no legal move / end -+--> GameOver --restart--> Playing
/// ```
///
/// A placement is one atomic step: validate, write the board, score the
/// placement, clear full lines, score the clear, deal a new wave if the
/// current one is used up, then check for game over.
///
/// # Example
///
/// ```
/// use gridfill_engine::{GameSession, SupplySeed};
///
/// let mut session = GameSession::with_seed(60, SupplySeed::from_u128(42));
/// session.start().unwrap();
///
/// let (slot, anchor) = session
///     .supply()
///     .pending()
///     .find_map(|(slot, _)| session.legal_anchors(slot).next().map(|a| (slot, a)))
///     .unwrap();
/// let outcome = session.try_place(slot, anchor).unwrap();
/// assert!(outcome.placement_score > 0);
/// assert_eq!(session.score(), outcome.score_delta());
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    grid: GridState,
    supply: SupplyQueue,
    generator: SupplyGenerator,
    rules: ScoringRules,
    stats: GameStats,
    combo: ComboTracker,
    session_state: SessionState,
    high_score: usize,
    next_piece_id: u32,
    fps: u64,
    total_frames: u64,
}

impl GameSession {
    /// Creates a session in the menu state with a random supply seed.
    #[must_use]
    pub fn new(fps: u64) -> Self {
        Self::with_generator(fps, SupplyGenerator::new())
    }

    #[must_use]
    pub fn with_seed(fps: u64, seed: SupplySeed) -> Self {
        Self::with_generator(fps, SupplyGenerator::with_seed(seed))
    }

    fn with_generator(fps: u64, generator: SupplyGenerator) -> Self {
        Self {
            grid: GridState::new(),
            supply: SupplyQueue::new(),
            generator,
            rules: ScoringRules::default(),
            stats: GameStats::new(),
            combo: ComboTracker::new(),
            session_state: SessionState::Menu,
            high_score: 0,
            next_piece_id: 0,
            fps: fps.max(1),
            total_frames: 0,
        }
    }

    /// Replaces the scoring rules.
    #[must_use]
    pub fn with_rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    #[must_use]
    pub fn supply(&self) -> &SupplyQueue {
        &self.supply
    }

    /// Shapes in the supply slots, `None` for consumed slots.
    #[must_use]
    pub fn supply_shapes(&self) -> [Option<ShapeId>; SUPPLY_SLOTS] {
        std::array::from_fn(|slot| self.supply.get(slot).map(|piece| piece.shape))
    }

    #[must_use]
    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    /// Score multiplier implied by the current combo.
    ///
    /// Reported for display only; it is never applied to awarded points.
    #[must_use]
    pub fn combo_multiplier(&self) -> f64 {
        self.combo.multiplier(&self.rules)
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    /// Best score known to this session, including the current one.
    #[must_use]
    pub fn high_score(&self) -> usize {
        self.high_score
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.session_state.is_game_over()
    }

    #[must_use]
    pub fn fps(&self) -> u64 {
        self.fps
    }

    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Elapsed play time derived from the frame count.
    #[must_use]
    pub fn duration(&self) -> Duration {
        const NANOS_PER_SEC: u128 = 1_000_000_000;
        let secs = self.total_frames / self.fps;
        // Below one second, so it fits in a u64.
        #[expect(clippy::cast_possible_truncation)]
        let nanos = (u128::from(self.total_frames % self.fps) * NANOS_PER_SEC
            / u128::from(self.fps)) as u64;
        Duration::from_secs(secs) + Duration::from_nanos(nanos)
    }

    /// Advances the session clock by one frame while playing.
    pub fn increment_frame(&mut self) {
        if self.session_state.is_playing() {
            self.total_frames += 1;
        }
    }

    /// Seeds the running best score from a store.
    pub fn load_high_score<S>(&mut self, store: &S)
    where
        S: HighScoreStore + ?Sized,
    {
        self.high_score = self.high_score.max(store.load());
    }

    /// Writes the best score to `store` if it beats the stored value.
    ///
    /// Returns `Ok(true)` if the store was written.
    pub fn save_high_score<S>(&self, store: &mut S) -> Result<bool, S::Error>
    where
        S: HighScoreStore + ?Sized,
    {
        if self.high_score <= store.load() {
            return Ok(false);
        }
        store.save(self.high_score)?;
        Ok(true)
    }

    /// Leaves the menu and deals the first wave.
    pub fn start(&mut self) -> Result<(), SessionStateError> {
        if !self.session_state.is_menu() {
            return Err(SessionStateError {
                action: "start",
                state: self.session_state,
            });
        }
        self.begin();
        Ok(())
    }

    /// Resets the board and score and deals a fresh wave from any state.
    ///
    /// The supply generator keeps its position in the random sequence.
    pub fn restart(&mut self) {
        self.begin();
    }

    pub fn pause(&mut self) -> Result<(), SessionStateError> {
        if !self.session_state.is_playing() {
            return Err(SessionStateError {
                action: "pause",
                state: self.session_state,
            });
        }
        self.session_state = SessionState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionStateError> {
        if !self.session_state.is_paused() {
            return Err(SessionStateError {
                action: "resume",
                state: self.session_state,
            });
        }
        self.session_state = SessionState::Playing;
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            state @ (SessionState::Menu | SessionState::GameOver) => state,
        };
    }

    /// Ends a running or paused session.
    pub fn end(&mut self) -> Result<(), SessionStateError> {
        if !(self.session_state.is_playing() || self.session_state.is_paused()) {
            return Err(SessionStateError {
                action: "end",
                state: self.session_state,
            });
        }
        self.game_over("ended");
        Ok(())
    }

    /// Returns the pending supply pieces, dealing a new wave first if the
    /// current one is used up.
    ///
    /// Dealing a wave runs the game-over check, so the session may be over
    /// when this returns.
    pub fn try_spawn_wave(
        &mut self,
    ) -> Result<ArrayVec<PieceDescriptor, SUPPLY_SLOTS>, NotPlayingError> {
        self.ensure_playing()?;
        if self.supply.is_exhausted() {
            self.spawn_wave();
        }
        Ok(self.supply.descriptors())
    }

    /// Places the piece in `slot` with its anchor at `anchor`.
    ///
    /// Rejected requests leave the session unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn try_place(
        &mut self,
        slot: usize,
        anchor: Position,
    ) -> Result<PlacementOutcome, PlaceError> {
        self.ensure_playing().map_err(PlaceError::NotPlaying)?;
        let piece = self
            .supply
            .get(slot)
            .ok_or(PlaceError::EmptySupplySlot { slot })?;
        let shape = piece.shape;
        if !can_place_shape(shape, anchor, &self.grid) {
            return Err(PlaceError::InvalidPlacement { shape, anchor });
        }
        self.grid
            .place(piece.id, shape, anchor)
            .map_err(|_| PlaceError::InvalidPlacement { shape, anchor })?;
        self.supply.take(slot);

        let placement_score = self.rules.placement_score(shape.cell_count());
        self.stats
            .record_placement(shape.cell_count(), placement_score);

        let cleared = clear_lines(&mut self.grid);
        let mut clear_score = 0;
        let mut combo = None;
        if !cleared.lines.is_empty() {
            clear_score = self.rules.clear_score(cleared.lines.line_count());
            self.stats.record_clear(
                cleared.lines.rows_cleared(),
                cleared.lines.columns_cleared(),
                clear_score,
            );
            let count = self
                .combo
                .record_clear(self.duration(), self.rules.combo_window());
            self.stats.record_combo(count);
            combo = Some(count);
            tracing::debug!(
                rows = ?cleared.lines.rows(),
                columns = ?cleared.lines.columns(),
                cells = cleared.cells_removed,
                combo = count,
                "lines cleared"
            );
        }
        self.high_score = self.high_score.max(self.stats.score());

        tracing::debug!(
            slot,
            shape = %shape,
            anchor = %anchor,
            placement_score,
            clear_score,
            "piece placed"
        );

        let wave_refilled = self.supply.is_exhausted();
        if wave_refilled {
            self.spawn_wave();
        } else if !has_legal_move(&self.supply, &self.grid) {
            self.game_over("no legal move");
        }

        Ok(PlacementOutcome {
            slot,
            piece: piece.id,
            shape,
            anchor,
            placement_score,
            clear_score,
            lines: cleared.lines,
            combo,
            wave_refilled,
            game_over: self.is_game_over(),
        })
    }

    /// Lines that would clear if a shape with `offsets` were placed at `anchor`.
    ///
    /// Read-only; does not check whether the shape fits.
    #[must_use]
    pub fn preview_clear(&self, offsets: &[Offset], anchor: Position) -> LineClear {
        LineClear::preview(self.grid.occupancy(), offsets, anchor)
    }

    /// Like [`Self::preview_clear`], for the piece in `slot`.
    ///
    /// Returns `None` if the slot is empty or the piece does not fit at
    /// `anchor`.
    #[must_use]
    pub fn preview_slot(&self, slot: usize, anchor: Position) -> Option<LineClear> {
        let piece = self.supply.get(slot)?;
        can_place_shape(piece.shape, anchor, &self.grid)
            .then(|| self.preview_clear(piece.shape.offsets(), anchor))
    }

    /// Anchors where the piece in `slot` fits; empty if the slot is empty.
    pub fn legal_anchors(&self, slot: usize) -> impl Iterator<Item = Position> + '_ {
        self.supply
            .get(slot)
            .into_iter()
            .flat_map(move |piece| legal_anchors(piece.shape, &self.grid))
    }

    fn ensure_playing(&self) -> Result<(), NotPlayingError> {
        if self.session_state.is_playing() {
            Ok(())
        } else {
            Err(NotPlayingError {
                state: self.session_state,
            })
        }
    }

    fn begin(&mut self) {
        self.grid.reset();
        self.supply.clear();
        self.stats = GameStats::new();
        self.combo.reset();
        self.total_frames = 0;
        self.session_state = SessionState::Playing;
        tracing::info!(high_score = self.high_score, "session started");
        self.spawn_wave();
    }

    fn spawn_wave(&mut self) {
        let shapes = self.generator.generate_wave(self.grid.occupancy());
        let pieces = shapes.map(|shape| {
            let id = PieceId(self.next_piece_id);
            self.next_piece_id = self.next_piece_id.wrapping_add(1);
            SupplyPiece { id, shape }
        });
        self.supply.fill(pieces);
        self.stats.record_wave();
        tracing::debug!(
            wave = self.stats.waves(),
            shapes = ?shapes.map(ShapeId::index),
            "wave spawned"
        );

        if !has_legal_move(&self.supply, &self.grid) {
            self.game_over("no legal move");
        }
    }

    fn game_over(&mut self, reason: &'static str) {
        self.session_state = SessionState::GameOver;
        tracing::info!(
            reason,
            score = self.stats.score(),
            high_score = self.high_score,
            placed = self.stats.placed_pieces(),
            "game over"
        );
    }
}
