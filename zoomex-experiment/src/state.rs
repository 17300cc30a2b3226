use rand::Rng;
use zoomex_core::{
    Cell, GeometryError, Point, Rect, TrialPhase, TrialRecord, diagonal, distance, grid_cells,
    point_in_rect, pointer_position, random_target_box, zoom_to_cell,
};

use super::config::ExperimentConfig;

/// Owns all mutable trial state and enforces the `Idle -> Running ->
/// Finished` machine. Renderer-independent: the interactive app and the
/// headless driver both go through the same operations.
///
/// `process_move` and `process_undo` do not gate on the phase themselves;
/// callers are responsible for only dispatching input while `Running`.
pub struct TrialSimulation<R: Rng> {
    pub phase: TrialPhase,
    pub config: ExperimentConfig,
    pub current_view: Rect,
    pub target_box: Rect,
    /// Oldest first; always holds at least the initial full-image view.
    pub view_history: Vec<Rect>,
    pub moves: u32,
    /// Valid once the trial is Finished; 0 before that.
    pub percentage_moved: f64,
    pub rng: R,
}

impl<R: Rng> TrialSimulation<R> {
    pub fn new(config: ExperimentConfig, mut rng: R) -> Self {
        let full = config.full_dimensions;
        let current_view = Rect::from_dimensions(full);
        let target_box = random_target_box(full, config.target_size_ratio, &mut rng);

        Self {
            phase: TrialPhase::Idle,
            config,
            current_view,
            target_box,
            view_history: vec![current_view],
            moves: 0,
            percentage_moved: 0.0,
            rng,
        }
    }

    /// Replaces every trial field with freshly constructed values for the
    /// same full dimensions: new target, full-image view, empty history.
    /// Nothing leaks from the previous trial.
    pub fn reset_trial(&mut self) {
        let full = self.config.full_dimensions;

        self.target_box = random_target_box(full, self.config.target_size_ratio, &mut self.rng);
        self.current_view = Rect::from_dimensions(full);
        self.view_history.clear();
        self.view_history.push(self.current_view);
        self.moves = 0;
        self.percentage_moved = 0.0;
        self.phase = TrialPhase::Idle;
    }

    /// External input transitions `Idle -> Running`.
    pub fn start(&mut self) {
        if self.phase.is_idle() {
            self.phase = TrialPhase::Running;
        }
    }

    /// Applies one zoom move into the grid cell at `cell_index` and returns
    /// whether the pointer landed inside the target.
    ///
    /// An out-of-range index is rejected before any state changes, so a
    /// failed move leaves moves, history, and the current view untouched.
    pub fn process_move(&mut self, cell_index: usize) -> Result<bool, GeometryError> {
        let new_view = zoom_to_cell(self.current_view, cell_index, self.config.grid)?;

        self.moves += 1;
        self.view_history.push(new_view);
        self.current_view = new_view;

        let pointer = pointer_position(self.current_view);
        if point_in_rect(pointer, self.target_box) {
            self.phase = TrialPhase::Finished;

            let initial = pointer_position(self.view_history[0]);
            let moved = distance(initial, pointer);
            self.percentage_moved = moved / diagonal(self.config.full_dimensions) * 100.0;
            return Ok(true);
        }

        Ok(false)
    }

    /// Steps back to the previous view. No-op at the initial view, and a
    /// no-op once Finished: a completed trial's stats stay frozen until
    /// `reset_trial`.
    pub fn process_undo(&mut self) {
        if self.phase.is_finished() {
            return;
        }

        if self.view_history.len() > 1 {
            self.view_history.pop();
            if let Some(last) = self.view_history.last() {
                self.current_view = *last;
            }
            self.moves = self.moves.saturating_sub(1);
        }
    }

    /// Pointer at the current view's center.
    pub fn pointer(&self) -> Point {
        pointer_position(self.current_view)
    }

    /// Pointer position at trial start (center of the full image).
    pub fn initial_pointer(&self) -> Point {
        pointer_position(self.view_history[0])
    }

    /// Straight-line distance from the initial pointer to the target center,
    /// the D term of the Index of Difficulty.
    pub fn initial_distance(&self) -> f64 {
        distance(self.initial_pointer(), self.target_box.center())
    }

    /// Grid partition of the current view, recomputed on every query.
    pub fn grid(&self) -> Result<Vec<Cell>, GeometryError> {
        grid_cells(self.current_view, self.config.grid)
    }

    /// The trial's record for analysis, available once Finished.
    pub fn record(&self, trial: usize) -> Option<TrialRecord> {
        if !self.phase.is_finished() {
            return None;
        }
        Some(TrialRecord {
            trial,
            moves: self.moves,
            initial_distance: self.initial_distance(),
            target_width: self.target_box.w,
            percentage_moved: self.percentage_moved,
        })
    }
}
