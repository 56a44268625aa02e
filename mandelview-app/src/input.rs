//! Translation of egui input into explorer [`Command`]s.

use eframe::egui;
use mandelview_render::Command;

/// Pixels scrolled per arrow-key press.
const SCROLL_STEP: i32 = 10;
/// Window-relative zoom delta for Page Up / Page Down.
const PAGE_ZOOM: i32 = 50;
/// Zoom delta per wheel notch.
const WHEEL_ZOOM: i32 = 20;
/// Bearing change per wheel notch with Shift held.
const WHEEL_ROTATE: i32 = 4;
const ORBIT_STEP: i32 = 10;
/// Smooth-scroll points that make up one wheel notch.
const POINTS_PER_NOTCH: f32 = 50.0;
const NOTCHES_PER_PAGE: f32 = 3.0;

/// Command bound to a key press, if any.
pub fn key_command(key: egui::Key) -> Option<Command> {
    use egui::Key;
    let command = match key {
        Key::Escape => Command::Quit,
        Key::Home => Command::GotoHome,
        Key::ArrowUp => Command::ScrollBy {
            dx: 0,
            dy: SCROLL_STEP,
        },
        Key::ArrowDown => Command::ScrollBy {
            dx: 0,
            dy: -SCROLL_STEP,
        },
        Key::ArrowLeft => Command::ScrollBy {
            dx: -SCROLL_STEP,
            dy: 0,
        },
        Key::ArrowRight => Command::ScrollBy {
            dx: SCROLL_STEP,
            dy: 0,
        },
        Key::PageUp => Command::ZoomBy(-PAGE_ZOOM),
        Key::PageDown => Command::ZoomBy(PAGE_ZOOM),
        Key::Plus | Key::Equals => Command::AdjustMaxOrbit(ORBIT_STEP),
        Key::Minus => Command::AdjustMaxOrbit(-ORBIT_STEP),
        _ => return None,
    };
    Some(command)
}

/// Command for `notches` wheel steps (positive = away from the user).
pub fn wheel_command(notches: i32, modifiers: egui::Modifiers) -> Option<Command> {
    if notches == 0 {
        return None;
    }
    let command = if modifiers.shift {
        Command::Rotate(WHEEL_ROTATE * notches)
    } else if modifiers.ctrl {
        Command::AdjustMaxOrbit(notches)
    } else if modifiers.alt {
        Command::AdjustPaletteSize(notches)
    } else {
        Command::ZoomBy(-WHEEL_ZOOM * notches)
    };
    Some(command)
}

/// Turns wheel deltas of any unit into whole notches, carrying fractions
/// from smooth-scrolling devices over to later events.
#[derive(Debug, Default)]
pub struct WheelAccumulator {
    remainder: f32,
}

impl WheelAccumulator {
    pub fn feed(
        &mut self,
        unit: egui::MouseWheelUnit,
        delta: egui::Vec2,
        modifiers: egui::Modifiers,
    ) -> i32 {
        // Some platforms report Shift+wheel on the horizontal axis.
        let raw = if delta.y == 0.0 && modifiers.shift {
            delta.x
        } else {
            delta.y
        };
        let notches = match unit {
            egui::MouseWheelUnit::Line => raw,
            egui::MouseWheelUnit::Point => raw / POINTS_PER_NOTCH,
            egui::MouseWheelUnit::Page => raw * NOTCHES_PER_PAGE,
        };
        self.remainder += notches;
        let whole = self.remainder.trunc();
        self.remainder -= whole;
        whole as i32
    }
}

/// Collect this frame's commands from the keyboard and the canvas `response`.
pub fn collect_commands(
    ctx: &egui::Context,
    response: &egui::Response,
    wheel: &mut WheelAccumulator,
) -> Vec<Command> {
    let origin = response.rect.min;
    let to_pixel = |pos: egui::Pos2| {
        let p = pos - origin;
        (p.x.round() as i32, p.y.round() as i32)
    };

    let mut commands = Vec::new();
    let hovered = response.hovered();
    ctx.input(|i| {
        for event in &i.events {
            match event {
                egui::Event::Key {
                    key, pressed: true, ..
                } => commands.extend(key_command(*key)),
                egui::Event::MouseWheel {
                    unit,
                    delta,
                    modifiers,
                    ..
                } if hovered => {
                    let notches = wheel.feed(*unit, *delta, *modifiers);
                    commands.extend(wheel_command(notches, *modifiers));
                }
                _ => {}
            }
        }
    });

    if response.drag_started_by(egui::PointerButton::Primary) {
        if let Some(pos) = ctx.input(|i| i.pointer.press_origin()) {
            let (x, y) = to_pixel(pos);
            commands.push(Command::DragStart { x, y });
        }
    }
    if response.dragged_by(egui::PointerButton::Primary) && response.drag_delta() != egui::Vec2::ZERO {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = to_pixel(pos);
            commands.push(Command::DragMove { x, y });
        }
    }
    if response.drag_stopped_by(egui::PointerButton::Primary) {
        commands.push(Command::DragEnd);
    }
    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = to_pixel(pos);
            let zoom_factor = if ctx.input(|i| i.modifiers.shift) {
                0.5
            } else {
                2.0
            };
            commands.push(Command::Recenter { x, y, zoom_factor });
        }
    }
    commands
}
