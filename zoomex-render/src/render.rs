use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8,
    Rect as SkRect, Stroke, Transform,
};
use zoomex_core::{Dimensions, GridDims, Rect, TrialPhase, grid_cells, pointer_position};

/// Palette of the experiment UI, kept in one place.
mod colors {
    use tiny_skia::Color;

    pub fn grid() -> Color {
        Color::from_rgba8(255, 255, 255, 77) // semi-transparent white
    }
    pub fn highlight() -> Color {
        Color::from_rgba8(255, 165, 0, 128)
    }
    pub fn target() -> Color {
        Color::from_rgba8(255, 165, 0, 204)
    }
    pub fn view_outline() -> Color {
        Color::from_rgba8(255, 0, 0, 204)
    }
    pub fn pointer() -> Color {
        Color::from_rgba8(255, 165, 0, 204)
    }
    pub fn idle_backdrop() -> Color {
        Color::from_rgba8(136, 136, 136, 255)
    }
    pub fn label() -> Color {
        Color::from_rgba8(255, 255, 255, 255)
    }
}

const POINTER_RADIUS: f32 = 10.0;

/// Everything the renderer needs to draw one frame, read off the simulation
/// by the caller. The renderer never mutates trial state.
pub struct Scene<'a> {
    pub phase: TrialPhase,
    pub full_dimensions: Dimensions,
    pub current_view: Rect,
    pub target_box: Rect,
    pub grid: GridDims,
    /// Row-major key caption per cell; empty slice disables labels.
    pub key_labels: &'a [&'a str],
    /// Cell flashed after a key press.
    pub highlighted_cell: Option<usize>,
    pub moves: u32,
    pub percentage_moved: f64,
}

struct TextCache {
    font: FontVec,
    size_px: f32,
    map: HashMap<String, Arc<Pixmap>>,
}

impl TextCache {
    fn new(font: FontVec, size_px: f32) -> Self {
        Self {
            font,
            size_px,
            map: HashMap::new(),
        }
    }

    fn get_or_render(&mut self, text: &str) -> Arc<Pixmap> {
        if let Some(pm) = self.map.get(text) {
            return Arc::clone(pm);
        }
        let pm = Arc::new(render_text_pixmap(
            text,
            self.size_px,
            &self.font,
            colors::label(),
        ));
        self.map.insert(text.to_string(), Arc::clone(&pm));
        pm
    }
}

/// Software renderer for the two experiment panels. The top half of the
/// frame shows the zoomed view with the selection grid, the bottom half the
/// full-image overview with the target, view outline, and pointer.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    canvas: Pixmap,
    background: Pixmap,
    labels: Option<TextCache>,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, background: Pixmap) -> Result<Self> {
        let canvas =
            Pixmap::new(width, height).ok_or_else(|| anyhow!("zero-sized render surface"))?;
        Ok(Self {
            width,
            height,
            canvas,
            background,
            labels: None,
        })
    }

    /// Enables key-label and overlay text. Without a font the panels render
    /// with geometry only.
    pub fn set_font(&mut self, font: FontVec, size_px: f32) {
        self.labels = Some(TextCache::new(font, size_px));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(canvas) = Pixmap::new(width, height) {
            self.width = width;
            self.height = height;
            self.canvas = canvas;
        }
    }

    /// Draws the scene and copies the result into `frame` (RGBA8, same
    /// dimensions as the renderer).
    pub fn render_frame(&mut self, scene: &Scene<'_>, frame: &mut [u8]) -> Result<()> {
        self.canvas.fill(Color::BLACK);

        let panel_h = self.height as f32 / 2.0;
        let top = SkRect::from_xywh(0.0, 0.0, self.width as f32, panel_h)
            .ok_or_else(|| anyhow!("degenerate top panel"))?;
        let bottom = SkRect::from_xywh(0.0, panel_h, self.width as f32, panel_h)
            .ok_or_else(|| anyhow!("degenerate bottom panel"))?;

        self.draw_zoom_panel(scene, top);
        self.draw_overview_panel(scene, bottom);

        let src: &[u8] = self.canvas.data();
        if frame.len() != src.len() {
            return Err(anyhow!(
                "frame buffer is {} bytes, expected {}",
                frame.len(),
                src.len()
            ));
        }
        frame.copy_from_slice(src);
        Ok(())
    }

    /// Overview: the full image scaled into the panel, with the target box,
    /// the current-view outline (hidden while Idle), and the pointer dot.
    fn draw_overview_panel(&mut self, scene: &Scene<'_>, panel: SkRect) {
        let scale_x = panel.width() / scene.full_dimensions.w as f32;
        let scale_y = panel.height() / scene.full_dimensions.h as f32;

        self.blit_background(
            Transform::from_scale(
                panel.width() / self.background.width() as f32,
                panel.height() / self.background.height() as f32,
            )
            .post_translate(panel.x(), panel.y()),
        );

        let to_panel = |rect: Rect| {
            SkRect::from_xywh(
                panel.x() + rect.x as f32 * scale_x,
                panel.y() + rect.y as f32 * scale_y,
                rect.w as f32 * scale_x,
                rect.h as f32 * scale_y,
            )
        };

        if let Some(target) = to_panel(scene.target_box) {
            self.stroke_rect(target, colors::target(), 3.0);
        }

        if !scene.phase.is_idle() {
            if let Some(outline) = to_panel(scene.current_view) {
                self.stroke_rect(outline, colors::view_outline(), 2.0);
            }
        }

        let pointer = pointer_position(scene.current_view);
        self.fill_circle(
            panel.x() + pointer.x as f32 * scale_x,
            panel.y() + pointer.y as f32 * scale_y,
            POINTER_RADIUS,
        );
    }

    /// Zoom panel: the current view's subregion of the image filling the
    /// panel, the selection grid with key labels, the target translated into
    /// view coordinates, and the pointer pinned to the panel center.
    fn draw_zoom_panel(&mut self, scene: &Scene<'_>, panel: SkRect) {
        if scene.phase.is_idle() || scene.phase.is_finished() {
            self.fill_rect(panel, colors::idle_backdrop());
            let message = if scene.phase.is_idle() {
                "hit space to start".to_string()
            } else {
                format!(
                    "moved {:.1}% of the image diagonal in {} moves - space for another trial",
                    scene.percentage_moved, scene.moves
                )
            };
            self.draw_centered_text(&message, panel);
            return;
        }

        let scale_x = panel.width() / scene.current_view.w as f32;
        let scale_y = panel.height() / scene.current_view.h as f32;

        // Map image coordinates so the current view fills the panel.
        let image_scale_x = scene.full_dimensions.w as f32 / self.background.width() as f32;
        let image_scale_y = scene.full_dimensions.h as f32 / self.background.height() as f32;
        self.blit_background(
            Transform::from_scale(image_scale_x * scale_x, image_scale_y * scale_y)
                .post_translate(
                    panel.x() - scene.current_view.x as f32 * scale_x,
                    panel.y() - scene.current_view.y as f32 * scale_y,
                ),
        );

        // Grid and labels live in panel coordinates; the partition of the
        // panel rectangle matches the partition of the view exactly.
        let panel_rect = Rect::new(
            panel.x() as f64,
            panel.y() as f64,
            panel.width() as f64,
            panel.height() as f64,
        );
        if let Ok(cells) = grid_cells(panel_rect, scene.grid) {
            for cell in &cells {
                let Some(rect) = SkRect::from_xywh(
                    cell.rect.x as f32,
                    cell.rect.y as f32,
                    cell.rect.w as f32,
                    cell.rect.h as f32,
                ) else {
                    continue;
                };

                if scene.highlighted_cell == Some(cell.index) {
                    self.fill_rect(rect, colors::highlight());
                }
                self.stroke_rect(rect, colors::grid(), 1.0);

                if let Some(label) = scene.key_labels.get(cell.index) {
                    self.draw_label(label, rect);
                }
            }
        }

        let view = scene.current_view;
        let target = scene.target_box;
        if let Some(rect) = SkRect::from_xywh(
            panel.x() + (target.x - view.x) as f32 * scale_x,
            panel.y() + (target.y - view.y) as f32 * scale_y,
            target.w as f32 * scale_x,
            target.h as f32 * scale_y,
        ) {
            self.stroke_rect(rect, colors::target(), 3.0);
        }

        self.fill_circle(
            panel.x() + panel.width() / 2.0,
            panel.y() + panel.height() / 2.0,
            POINTER_RADIUS,
        );
    }

    fn blit_background(&mut self, transform: Transform) {
        self.canvas.draw_pixmap(
            0,
            0,
            self.background.as_ref(),
            &PixmapPaint::default(),
            transform,
            None,
        );
    }

    fn fill_rect(&mut self, rect: SkRect, color: Color) {
        let mut paint = Paint::default();
        paint.set_color(color);
        self.canvas
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn stroke_rect(&mut self, rect: SkRect, color: Color, width: f32) {
        let path = PathBuilder::from_rect(rect);
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.canvas
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32) {
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(colors::pointer());
        paint.anti_alias = true;
        self.canvas
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

        let mut outline = Paint::default();
        outline.set_color(Color::BLACK);
        outline.anti_alias = true;
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        self.canvas
            .stroke_path(&path, &outline, &stroke, Transform::identity(), None);
    }

    fn draw_label(&mut self, text: &str, cell: SkRect) {
        let Some(labels) = self.labels.as_mut() else {
            return;
        };
        let pm = labels.get_or_render(text);
        let x = cell.x() + (cell.width() - pm.width() as f32) / 2.0;
        let y = cell.y() + (cell.height() - pm.height() as f32) / 2.0;
        self.canvas.draw_pixmap(
            x as i32,
            y as i32,
            pm.as_ref().as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_centered_text(&mut self, text: &str, panel: SkRect) {
        let Some(labels) = self.labels.as_mut() else {
            return;
        };
        let pm = labels.get_or_render(text);
        let x = panel.x() + (panel.width() - pm.width() as f32) / 2.0;
        let y = panel.y() + (panel.height() - pm.height() as f32) / 2.0;
        self.canvas.draw_pixmap(
            x as i32,
            y as i32,
            pm.as_ref().as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

/// Rasterizes a single line of text into a tight transparent pixmap with
/// premultiplied alpha, kerned glyph by glyph.
pub fn render_text_pixmap(text: &str, font_size: f32, font: &FontVec, color: Color) -> Pixmap {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // Layout with the baseline at the ascent.
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    // Union of the outlined pixel bounds.
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }
    }

    if min_x == f32::INFINITY {
        return Pixmap::new(1, 1).expect("pixmap");
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h).expect("pixmap");

    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();

    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            out.draw(|x, y, cov| {
                if cov <= f32::EPSILON {
                    return;
                }
                let fx = x as f32 + b.min.x - min_x;
                let fy = y as f32 + b.min.y - min_y;
                let (xi, yi) = (fx as usize, fy as usize);
                if xi >= stride {
                    return;
                }
                let Some(px) = dst.get_mut(yi * stride + xi) else {
                    return;
                };

                // Premultiplied: channel values never exceed alpha.
                let a = (cov * color.alpha() * 255.0).min(255.0) as u8;
                *px = PremultipliedColorU8::from_rgba(
                    (color.red() * a as f32) as u8,
                    (color.green() * a as f32) as u8,
                    (color.blue() * a as f32) as u8,
                    a,
                )
                .unwrap_or(PremultipliedColorU8::TRANSPARENT);
            });
        }
    }

    pm
}

/// Checkerboard stand-in for the background photograph so the zoom remains
/// legible when no image file is supplied.
pub fn placeholder_background(dims: Dimensions) -> Result<Pixmap> {
    let w = dims.w as u32;
    let h = dims.h as u32;
    let mut pm = Pixmap::new(w, h).ok_or_else(|| anyhow!("zero-sized background"))?;

    let square = (w / 64).max(4);
    let light = Color::from_rgba8(90, 105, 135, 255);
    let dark = Color::from_rgba8(45, 55, 75, 255);

    for (i, px) in pm.pixels_mut().iter_mut().enumerate() {
        let x = i as u32 % w;
        let y = i as u32 / w;
        let color = if ((x / square) + (y / square)) % 2 == 0 {
            light
        } else {
            dark
        };
        *px = color.premultiply().to_color_u8();
    }

    Ok(pm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoomex_core::Rect;

    fn scene(full: Dimensions, view: Rect, phase: TrialPhase) -> Scene<'static> {
        Scene {
            phase,
            full_dimensions: full,
            current_view: view,
            target_box: Rect::new(100.0, 100.0, 51.2, 51.2),
            grid: GridDims::default(),
            key_labels: &[],
            highlighted_cell: None,
            moves: 0,
            percentage_moved: 0.0,
        }
    }

    #[test]
    fn renders_a_frame_into_a_matching_buffer() {
        let full = Dimensions::new(256.0, 160.0);
        let background = placeholder_background(full).unwrap();
        let mut renderer = SkiaRenderer::new(128, 128, background).unwrap();

        let mut frame = vec![0u8; 128 * 128 * 4];
        let scene = scene(full, Rect::from_dimensions(full), TrialPhase::Running);
        renderer.render_frame(&scene, &mut frame).unwrap();

        // The checkerboard background must have produced non-black pixels.
        assert!(frame.iter().any(|&b| b != 0));
    }

    #[test]
    fn rejects_a_mismatched_frame_buffer() {
        let full = Dimensions::new(256.0, 160.0);
        let background = placeholder_background(full).unwrap();
        let mut renderer = SkiaRenderer::new(64, 64, background).unwrap();

        let mut frame = vec![0u8; 16];
        let scene = scene(full, Rect::from_dimensions(full), TrialPhase::Idle);
        assert!(renderer.render_frame(&scene, &mut frame).is_err());
    }

    #[test]
    fn resize_changes_the_expected_buffer_size() {
        let full = Dimensions::new(256.0, 160.0);
        let background = placeholder_background(full).unwrap();
        let mut renderer = SkiaRenderer::new(64, 64, background).unwrap();
        renderer.resize(32, 32);

        let mut frame = vec![0u8; 32 * 32 * 4];
        let scene = scene(full, Rect::from_dimensions(full), TrialPhase::Finished);
        renderer.render_frame(&scene, &mut frame).unwrap();
    }

    #[test]
    fn placeholder_matches_requested_dimensions() {
        let pm = placeholder_background(Dimensions::new(320.0, 200.0)).unwrap();
        assert_eq!(pm.width(), 320);
        assert_eq!(pm.height(), 200);
    }
}
