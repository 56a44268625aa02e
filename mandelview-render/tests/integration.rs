use mandelview_core::{Viewport, Waypoint};
use mandelview_render::{
    create_palette, ColorWeights, Command, MemorySurface, Navigator, Outcome, PixelFormat, View,
    BLACK,
};

fn explorer(width: u32, height: u32) -> (Navigator, View<MemorySurface>) {
    let weights = ColorWeights::default();
    let home = Waypoint::from(Viewport::home(width));
    let mut view = View::mandelbrot(MemorySurface::new(width, height), create_palette(32, weights));
    view.goto_waypoint(home);
    (Navigator::new(home, 32, weights), view)
}

#[test]
fn end_to_end_home_render() {
    let (_, mut view) = explorer(800, 600);
    view.paint().unwrap();

    let shown = view.surface().frame().unwrap();
    assert_eq!(shown.size(), (800, 600));
    // Screen centre is the plane point (-0.75, 0), inside the set.
    assert_eq!(shown.pixel(400, 300), Some(BLACK));

    let rgba = shown.to_rgba();
    assert_eq!(rgba.len(), 800 * 600 * 4);
    assert!(rgba.chunks_exact(4).any(|px| px[1] > 0 || px[2] > 0));
}

#[test]
fn render_is_independent_of_worker_count() {
    let (_, view) = explorer(120, 90);
    let mut view = view.with_concurrency(1);
    view.paint().unwrap();
    let serial = view.frame().unwrap().clone();

    for workers in [2, 5, 16] {
        let (_, view) = explorer(120, 90);
        let mut view = view.with_concurrency(workers);
        view.paint().unwrap();
        assert_eq!(view.frame(), Some(&serial), "{workers} workers");
    }
}

#[test]
fn interactive_session() {
    let (mut nav, mut view) = explorer(160, 120);
    view.paint().unwrap();

    let commands = [
        Command::DragStart { x: 80, y: 60 },
        Command::DragMove { x: 70, y: 64 },
        Command::DragMove { x: 60, y: 70 },
        Command::DragEnd,
        Command::ScrollBy { dx: 10, dy: 0 },
        Command::ZoomBy(-50),
        Command::Rotate(8),
        Command::AdjustMaxOrbit(10),
        Command::AdjustPaletteSize(-1),
        Command::Recenter {
            x: 20,
            y: 30,
            zoom_factor: 0.5,
        },
    ];
    for command in commands {
        if nav.apply(&mut view, command) == Outcome::Repaint {
            view.paint().unwrap();
            assert!(view.is_valid());
        }
    }
    assert_eq!(view.max_orbit(), 110);
    assert_eq!(view.palette().len(), 31);
    assert_eq!(view.viewport().bearing, 8);

    assert_eq!(nav.apply(&mut view, Command::GotoHome), Outcome::Repaint);
    view.paint().unwrap();
    assert_eq!(view.current_waypoint(), nav.home());
    assert_eq!(nav.apply(&mut view, Command::Quit), Outcome::Quit);
}

#[test]
fn packed_bgr_surface_renders_identically() {
    let (_, mut padded) = explorer(64, 48);
    padded.paint().unwrap();

    let weights = ColorWeights::default();
    let surface = MemorySurface::with_format(64, 48, PixelFormat::BGR888);
    let mut packed = View::mandelbrot(surface, create_palette(32, weights));
    packed.goto_waypoint(Waypoint::from(Viewport::home(64)));
    packed.paint().unwrap();

    assert_eq!(packed.frame().unwrap().format(), PixelFormat::BGR888);
    assert_eq!(packed.frame().unwrap().to_rgba(), padded.frame().unwrap().to_rgba());
}

#[test]
fn independent_views_keep_independent_palettes() {
    let (_, mut a) = explorer(32, 32);
    let (_, mut b) = explorer(32, 32);
    b.set_palette(create_palette(7, ColorWeights::new(1.0, 0.0, 0.0)));
    a.paint().unwrap();
    b.paint().unwrap();
    assert_eq!(a.palette().len(), 32);
    assert_ne!(a.frame(), b.frame());
}
