use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in image coordinates. Used both for the current
/// view and for the target box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The full-image rectangle anchored at the origin.
    pub fn from_dimensions(dims: Dimensions) -> Self {
        Self::new(0.0, 0.0, dims.w, dims.h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Width and height of the full image; immutable for a trial set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub w: f64,
    pub h: f64,
}

impl Dimensions {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}

/// Grid partition shape overlaid on the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub cols: usize,
    pub rows: usize,
}

impl GridDims {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

impl Default for GridDims {
    fn default() -> Self {
        // Matches the three QWERTY key rows of eight keys each.
        Self { cols: 8, rows: 3 }
    }
}

/// One rectangle of the grid partition, addressed by a row-major flat index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub rect: Rect,
    pub row: usize,
    pub col: usize,
    pub index: usize,
}

/// Partitions `view` into `cols * rows` equal cells in row-major order.
/// The grid is derived state: recomputed from the view on every query,
/// never persisted.
pub fn grid_cells(view: Rect, grid: GridDims) -> Result<Vec<Cell>, GeometryError> {
    if view.w <= 0.0 || view.h <= 0.0 {
        return Err(GeometryError::InvalidGeometry {
            w: view.w,
            h: view.h,
        });
    }

    let cell_w = view.w / grid.cols as f64;
    let cell_h = view.h / grid.rows as f64;
    let mut cells = Vec::with_capacity(grid.cell_count());

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            cells.push(Cell {
                rect: Rect::new(
                    view.x + col as f64 * cell_w,
                    view.y + row as f64 * cell_h,
                    cell_w,
                    cell_h,
                ),
                row,
                col,
                index: row * grid.cols + col,
            });
        }
    }

    Ok(cells)
}

/// The pointer is the center of the current view.
pub fn pointer_position(view: Rect) -> Point {
    view.center()
}

/// Inclusive containment on both axes, so a pointer landing exactly on a
/// target edge counts as a win.
pub fn point_in_rect(point: Point, rect: Rect) -> bool {
    point.x >= rect.x
        && point.x <= rect.x + rect.w
        && point.y >= rect.y
        && point.y <= rect.y + rect.h
}

/// Computes the view after zooming into the grid cell at `cell_index`.
///
/// The new view takes the cell's height but keeps the *original view's*
/// aspect ratio for its width, horizontally centered on the cell and
/// top-aligned with it. Grid cells are wider than the view's aspect ratio
/// would make them, so this keeps the displayed viewport shape constant
/// across zoom levels.
pub fn zoom_to_cell(view: Rect, cell_index: usize, grid: GridDims) -> Result<Rect, GeometryError> {
    let cells = grid_cells(view, grid)?;
    let cell = cells
        .get(cell_index)
        .ok_or(GeometryError::InvalidCellIndex {
            index: cell_index,
            cells: cells.len(),
        })?;

    let aspect_ratio = view.w / view.h;
    let new_h = cell.rect.h;
    let new_w = new_h * aspect_ratio;

    let cell_center_x = cell.rect.x + cell.rect.w / 2.0;

    Ok(Rect::new(
        cell_center_x - new_w / 2.0,
        cell.rect.y,
        new_w,
        new_h,
    ))
}

/// Euclidean distance between two points.
pub fn distance(p1: Point, p2: Point) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

/// Diagonal length of the full image, the normalizer for `percentage_moved`.
pub fn diagonal(dims: Dimensions) -> f64 {
    (dims.w * dims.w + dims.h * dims.h).sqrt()
}

/// Places a square target of side `size_ratio * full.w` uniformly at random,
/// fully contained within the image bounds.
pub fn random_target_box<R: Rng>(full: Dimensions, size_ratio: f64, rng: &mut R) -> Rect {
    let side = full.w * size_ratio;

    let x = rng.random_range(0.0..full.w - side);
    let y = rng.random_range(0.0..full.h - side);

    Rect::new(x, y, side, side)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn grid_tiles_the_view_exactly() {
        let view = Rect::new(100.0, 50.0, 800.0, 450.0);
        let grid = GridDims::default();
        let cells = grid_cells(view, grid).unwrap();

        assert_eq!(cells.len(), 24);

        let area: f64 = cells.iter().map(|c| c.rect.w * c.rect.h).sum();
        assert!((area - view.w * view.h).abs() < TOLERANCE);

        for cell in &cells {
            assert_eq!(cell.index, cell.row * grid.cols + cell.col);
            assert!(cell.rect.x >= view.x - TOLERANCE);
            assert!(cell.rect.y >= view.y - TOLERANCE);
            assert!(cell.rect.x + cell.rect.w <= view.x + view.w + TOLERANCE);
            assert!(cell.rect.y + cell.rect.h <= view.y + view.h + TOLERANCE);
        }
    }

    #[test]
    fn grid_cells_are_disjoint() {
        let cells = grid_cells(Rect::new(0.0, 0.0, 2560.0, 1600.0), GridDims::default()).unwrap();
        for a in &cells {
            for b in &cells {
                if a.index == b.index {
                    continue;
                }
                let overlap_w = (a.rect.x + a.rect.w).min(b.rect.x + b.rect.w)
                    - a.rect.x.max(b.rect.x);
                let overlap_h = (a.rect.y + a.rect.h).min(b.rect.y + b.rect.h)
                    - a.rect.y.max(b.rect.y);
                if overlap_w > TOLERANCE && overlap_h > TOLERANCE {
                    panic!("cells {} and {} overlap", a.index, b.index);
                }
            }
        }
    }

    #[test]
    fn degenerate_view_is_rejected() {
        let grid = GridDims::default();
        assert_eq!(
            grid_cells(Rect::new(0.0, 0.0, 0.0, 100.0), grid),
            Err(GeometryError::InvalidGeometry { w: 0.0, h: 100.0 })
        );
        assert!(grid_cells(Rect::new(0.0, 0.0, 100.0, -1.0), grid).is_err());
    }

    #[test]
    fn pointer_is_view_center() {
        let p = pointer_position(Rect::new(10.0, 20.0, 100.0, 60.0));
        assert_eq!(p, Point::new(60.0, 50.0));
    }

    #[test]
    fn containment_is_inclusive_at_edges() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_rect(Point::new(0.0, 0.0), rect));
        assert!(point_in_rect(Point::new(10.0, 10.0), rect));
        assert!(point_in_rect(Point::new(5.0, 10.0), rect));
        assert!(!point_in_rect(Point::new(10.1, 5.0), rect));
        assert!(!point_in_rect(Point::new(5.0, -0.1), rect));
    }

    #[test]
    fn zoom_preserves_original_aspect_ratio() {
        let view = Rect::new(0.0, 0.0, 2560.0, 1600.0);
        let grid = GridDims::default();
        let zoomed = zoom_to_cell(view, 10, grid).unwrap();

        let original_ratio = view.w / view.h;
        let zoomed_ratio = zoomed.w / zoomed.h;
        assert!((original_ratio - zoomed_ratio).abs() < TOLERANCE);
    }

    #[test]
    fn zoom_narrows_both_dimensions() {
        let view = Rect::new(0.0, 0.0, 2560.0, 1600.0);
        let zoomed = zoom_to_cell(view, 10, GridDims::default()).unwrap();
        assert!(zoomed.w < view.w);
        assert!(zoomed.h < view.h);
    }

    #[test]
    fn zoom_centers_on_cell_and_top_aligns() {
        let view = Rect::new(0.0, 0.0, 800.0, 300.0);
        let grid = GridDims::new(4, 2);
        let cells = grid_cells(view, grid).unwrap();
        let cell = cells[5];

        let zoomed = zoom_to_cell(view, 5, grid).unwrap();
        let cell_center_x = cell.rect.x + cell.rect.w / 2.0;
        assert!((zoomed.x + zoomed.w / 2.0 - cell_center_x).abs() < TOLERANCE);
        assert!((zoomed.y - cell.rect.y).abs() < TOLERANCE);
        assert!((zoomed.h - cell.rect.h).abs() < TOLERANCE);
    }

    #[test]
    fn zoom_rejects_out_of_range_index() {
        let view = Rect::new(0.0, 0.0, 800.0, 450.0);
        let grid = GridDims::default();
        assert_eq!(
            zoom_to_cell(view, 24, grid),
            Err(GeometryError::InvalidCellIndex {
                index: 24,
                cells: 24
            })
        );
    }

    #[test]
    fn distance_and_diagonal() {
        assert!((distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)) - 5.0).abs() < TOLERANCE);
        assert!((diagonal(Dimensions::new(300.0, 400.0)) - 500.0).abs() < TOLERANCE);
    }

    #[test]
    fn random_target_stays_inside_the_image() {
        let full = Dimensions::new(2560.0, 1600.0);
        let mut rng = rand::rng();

        for _ in 0..1000 {
            let target = random_target_box(full, 0.02, &mut rng);
            assert!((target.w - full.w * 0.02).abs() < TOLERANCE);
            assert_eq!(target.w, target.h);
            assert!(target.x >= 0.0);
            assert!(target.y >= 0.0);
            assert!(target.x + target.w <= full.w);
            assert!(target.y + target.h <= full.h);
        }
    }
}
