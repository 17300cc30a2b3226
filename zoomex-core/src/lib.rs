pub mod error;
pub mod geometry;
pub mod phase;
pub mod trial;

pub use error::GeometryError;
pub use geometry::{
    Cell, Dimensions, GridDims, Point, Rect, diagonal, distance, grid_cells, point_in_rect,
    pointer_position, random_target_box, zoom_to_cell,
};
pub use phase::TrialPhase;
pub use trial::TrialRecord;
