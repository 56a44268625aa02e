use eframe::egui;
use tracing::{error, info};

use mandelview_render::{create_palette, Navigator, Outcome, View};

use crate::config::ExplorerConfig;
use crate::input::{self, WheelAccumulator};
use crate::surface::EguiSurface;

// ---------------------------------------------------------------------------
// Explorer app
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    view: View<EguiSurface>,
    navigator: Navigator,
    config: ExplorerConfig,
    wheel: WheelAccumulator,
}

impl ExplorerApp {
    pub fn new(ctx: &egui::Context, config: ExplorerConfig) -> mandelview_render::Result<Self> {
        let width = config.window_width.max(1.0) as u32;
        let height = config.window_height.max(1.0) as u32;

        let surface = EguiSurface::new(ctx.clone(), width, height)?;
        let palette = create_palette(config.palette_size(), config.weights());
        let mut view = View::mandelbrot(surface, palette).with_fast_scroll(config.fast_scroll);
        if let Some(workers) = config.concurrency {
            view = view.with_concurrency(workers);
        }
        view.goto_waypoint(config.start_waypoint(width));

        let navigator = Navigator::new(
            config.home_waypoint(width),
            config.palette_size(),
            config.weights(),
        );

        Ok(Self {
            view,
            navigator,
            config,
            wheel: WheelAccumulator::default(),
        })
    }

    fn check_resize(&mut self, width: u32, height: u32) {
        if self.view.surface_mut().resize(width, height) {
            info!(width, height, "Canvas resized");
            self.view.invalidate();
        }
    }

    fn paint(&mut self) {
        if let Err(e) = self.view.paint() {
            error!("Failed to paint the view: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App
// ---------------------------------------------------------------------------

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_size();
                let width = available.x.max(1.0) as u32;
                let height = available.y.max(1.0) as u32;
                self.check_resize(width, height);

                let (response, painter) =
                    ui.allocate_painter(available, egui::Sense::click_and_drag());

                let mut repaint = false;
                for command in input::collect_commands(ctx, &response, &mut self.wheel) {
                    match self.navigator.apply(&mut self.view, command) {
                        Outcome::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
                        Outcome::Repaint => repaint = true,
                        Outcome::Idle => {}
                    }
                }
                if repaint || !self.view.is_valid() {
                    self.paint();
                }

                if let Some(texture) = self.view.surface().texture() {
                    let uv =
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    painter.image(texture.id(), response.rect, uv, egui::Color32::WHITE);
                }
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.last_view = Some(self.view.current_waypoint());
        self.config.save();
        info!("Saved configuration on exit");
    }
}
