use ab_glyph::FontVec;
use anyhow::{Result, anyhow};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tiny_skia::Pixmap;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};
use zoomex_core::{Dimensions, TrialPhase};
use zoomex_experiment::{ExperimentConfig, TrialSimulation};
use zoomex_render::{Scene, SkiaRenderer, placeholder_background};

use crate::keymap::{self, KEY_LABELS};

/// How long a selected cell stays highlighted after a key press.
const HIGHLIGHT_FLASH: Duration = Duration::from_millis(150);
const LABEL_SIZE_PX: f32 = 20.0;

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Background photograph; a checkerboard stands in when absent.
    pub image: Option<PathBuf>,
    /// TTF/OTF font for key labels and overlay text; text is skipped
    /// when absent.
    pub font: Option<PathBuf>,
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    simulation: TrialSimulation<ThreadRng>,
    background: Option<Pixmap>,
    font: Option<FontVec>,
    highlight: Option<(usize, Instant)>,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    should_exit: bool,
}

impl App {
    pub fn new(options: AppOptions) -> Result<Self> {
        let (background, full_dimensions) = match &options.image {
            Some(path) => {
                let img = image::open(path)?.into_rgba8();
                let (w, h) = img.dimensions();
                let size = tiny_skia::IntSize::from_wh(w, h)
                    .ok_or_else(|| anyhow!("image {} has zero dimensions", path.display()))?;
                let pixmap = Pixmap::from_vec(img.into_raw(), size)
                    .ok_or_else(|| anyhow!("image {} could not be converted", path.display()))?;
                println!("Loaded background image {} ({w}x{h})", path.display());
                (pixmap, Dimensions::new(w as f64, h as f64))
            }
            None => {
                let full = ExperimentConfig::default().full_dimensions;
                (placeholder_background(full)?, full)
            }
        };

        let font = match &options.font {
            Some(path) => {
                let bytes = std::fs::read(path)?;
                Some(FontVec::try_from_vec(bytes)?)
            }
            None => None,
        };

        let config = ExperimentConfig {
            full_dimensions,
            ..ExperimentConfig::default()
        };
        let simulation = TrialSimulation::new(config, rand::rng());

        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            simulation,
            background: Some(background),
            font,
            highlight: None,
            current_size: None,
            scale_factor: 1.0,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        println!("=== ZOOM POINTING EXPERIMENT ===");
        println!("Zoom in with the grid keys until the pointer lands in the target box.");
        println!("SPACE starts a trial, BACKSPACE undoes a zoom, ESC exits.\n");

        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("No monitor available"))?;

        let window_attributes = Window::default_attributes()
            .with_title("Zoomex")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.current_size = Some(physical_size);
        self.scale_factor = window.scale_factor();

        println!("Display Configuration:");
        println!(
            "  Physical size: {}x{}",
            physical_size.width, physical_size.height
        );
        println!("  Scale factor: {:.2}", self.scale_factor);

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        let background = self
            .background
            .take()
            .ok_or_else(|| anyhow!("background already consumed"))?;
        let mut renderer =
            SkiaRenderer::new(physical_size.width, physical_size.height, background)?;
        if let Some(font) = self.font.take() {
            renderer.set_font(font, LABEL_SIZE_PX * self.scale_factor as f32);
        }
        self.renderer = Some(renderer);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut())
        else {
            return Ok(());
        };

        if let Some((_, since)) = self.highlight {
            if since.elapsed() >= HIGHLIGHT_FLASH {
                self.highlight = None;
            }
        }

        let sim = &self.simulation;
        let scene = Scene {
            phase: sim.phase,
            full_dimensions: sim.config.full_dimensions,
            current_view: sim.current_view,
            target_box: sim.target_box,
            grid: sim.config.grid,
            key_labels: &KEY_LABELS,
            highlighted_cell: self.highlight.map(|(index, _)| index),
            moves: sim.moves,
            percentage_moved: sim.percentage_moved,
        };

        renderer.render_frame(&scene, pixels.frame_mut())?;
        pixels.render()?;
        Ok(())
    }

    fn handle_input(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };

        match code {
            KeyCode::Escape => self.cleanup_and_exit(event_loop),
            KeyCode::Space => match self.simulation.phase {
                TrialPhase::Idle => {
                    self.simulation.start();
                    println!("Trial started.");
                }
                TrialPhase::Finished => {
                    self.simulation.reset_trial();
                    self.simulation.start();
                    println!("New trial started.");
                }
                TrialPhase::Running => {}
            },
            KeyCode::Backspace => {
                if self.simulation.phase.allows_input() {
                    self.simulation.process_undo();
                }
            }
            other => {
                if !self.simulation.phase.allows_input() {
                    return;
                }
                let Some(cell_index) = keymap::cell_for_key(other) else {
                    return;
                };

                self.highlight = Some((cell_index, Instant::now()));
                match self.simulation.process_move(cell_index) {
                    Ok(true) => {
                        println!(
                            "Target acquired in {} moves; pointer moved {:.1}% of the diagonal.",
                            self.simulation.moves, self.simulation.percentage_moved
                        );
                        println!("Press SPACE for another trial.");
                    }
                    Ok(false) => {}
                    // Unreachable with the fixed key mapping, but reported
                    // rather than swallowed.
                    Err(err) => eprintln!("move rejected: {err}"),
                }
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                eprintln!("Failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                eprintln!("Failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height);
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        println!("\nExperiment session ended.");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                eprintln!("Failed to create window and surface: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    eprintln!("render failed: {e}");
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
