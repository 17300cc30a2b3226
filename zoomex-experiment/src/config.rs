use zoomex_core::{Dimensions, GridDims};

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub full_dimensions: Dimensions,
    pub grid: GridDims,
    /// Target side length as a fraction of the full image width.
    pub target_size_ratio: f64,
    /// Safety bound for the headless driver: a trial exceeding this many
    /// moves is aborted instead of looping forever on a geometry defect.
    pub max_moves: u32,
    pub batch_trials: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            // Known, reliable dimensions for headless runs; the interactive
            // app overrides this with the loaded image's dimensions.
            full_dimensions: Dimensions::new(2560.0, 1600.0),
            grid: GridDims::default(),
            target_size_ratio: 0.02,
            max_moves: 50,
            batch_trials: 1000,
        }
    }
}
