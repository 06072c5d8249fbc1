use cairo::{Context, ImageSurface};
use scopemark::calibration::Resolution;
use scopemark::config::KeybindingsConfig;
use scopemark::draw::{Shape, ShapeKind, Style};
use scopemark::geometry::Point;
use scopemark::input::{EngineConfig, InputState, MouseButton, Tool};

fn make_input_state(width: u32, height: u32) -> InputState {
    let action_map = KeybindingsConfig::default().build_action_map().unwrap();
    let config = EngineConfig {
        resolution: Resolution { width, height },
        ..EngineConfig::default()
    };
    InputState::new(config, action_map)
}

/// Renders the engine's scene and returns `(stride, pixels)` in Cairo's
/// native ARGB32 layout (B, G, R, A on little-endian).
fn render_pixels(state: &InputState, background: Option<&ImageSurface>) -> (usize, Vec<u8>) {
    let resolution = state.config().resolution;
    let surface = ImageSurface::create(
        cairo::Format::ARgb32,
        resolution.width as i32,
        resolution.height as i32,
    )
    .unwrap();
    {
        let ctx = Context::new(&surface).unwrap();
        state.render(&ctx, background);
    }
    surface.flush();
    let stride = surface.stride() as usize;
    let data = surface.take_data().unwrap().to_vec();
    (stride, data)
}

fn rgb_at(pixels: &(usize, Vec<u8>), x: usize, y: usize) -> (u8, u8, u8) {
    let (stride, data) = pixels;
    let offset = y * stride + x * 4;
    (data[offset + 2], data[offset + 1], data[offset])
}

fn solid_image(width: i32, height: i32, rgb: (f64, f64, f64)) -> ImageSurface {
    let surface = ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
    {
        let ctx = Context::new(&surface).unwrap();
        ctx.set_source_rgb(rgb.0, rgb.1, rgb.2);
        ctx.paint().unwrap();
    }
    surface
}

fn is_placeholder((r, g, b): (u8, u8, u8)) -> bool {
    (28..=33).contains(&r) && r == g && g == b
}

#[test]
fn missing_background_uses_placeholder_fill() {
    let state = make_input_state(64, 32);
    let pixels = render_pixels(&state, None);

    for (x, y) in [(0, 0), (63, 0), (32, 16), (0, 31), (63, 31)] {
        let rgb = rgb_at(&pixels, x, y);
        assert!(is_placeholder(rgb), "pixel ({x},{y}) was {rgb:?}");
    }
}

#[test]
fn background_image_is_scaled_to_the_surface() {
    let state = make_input_state(40, 20);
    let image = solid_image(4, 4, (1.0, 0.0, 0.0));
    let pixels = render_pixels(&state, Some(&image));

    for (x, y) in [(10, 5), (20, 10), (30, 15)] {
        assert_eq!(rgb_at(&pixels, x, y), (255, 0, 0), "pixel ({x},{y})");
    }
}

#[test]
fn selected_shape_is_outlined_in_highlight_color() {
    let mut state = make_input_state(200, 200);
    state.set_shapes(vec![Shape::new(
        1,
        Style::default(),
        ShapeKind::Rectangle {
            start: Point::new(20.0, 20.0),
            end: Point::new(180.0, 180.0),
        },
    )]);

    // Unselected: just outside the 2px stroke is still background
    let before = render_pixels(&state, None);
    assert!(is_placeholder(rgb_at(&before, 21, 40)));

    state.set_tool(Tool::Pointer);
    state.on_mouse_press(MouseButton::Left, 20.0, 40.0);
    state.on_mouse_release(MouseButton::Left, 20.0, 40.0);
    assert_eq!(state.selected(), Some(1));

    let after = render_pixels(&state, None);
    let (r, g, b) = rgb_at(&after, 21, 40);
    assert!(r < 50 && g > 200 && b > 200, "expected cyan, got {r},{g},{b}");
    // The stroke itself stays green on top of the outline
    let (r, g, b) = rgb_at(&after, 20, 100);
    assert!(r < 50 && g > 200 && b < 50, "expected green, got {r},{g},{b}");
}

#[test]
fn eraser_cursor_follows_pointer_only_for_eraser() {
    let mut state = make_input_state(100, 100);
    state.set_tool(Tool::Pointer);
    state.on_mouse_motion(50.0, 50.0);
    assert!(is_placeholder(rgb_at(&render_pixels(&state, None), 50, 50)));

    state.set_tool(Tool::Eraser);
    state.on_mouse_motion(50.0, 50.0);
    let (r, g, b) = rgb_at(&render_pixels(&state, None), 50, 50);
    assert!(r > 40 && g > 40 && b > 40, "expected lightened fill, got {r},{g},{b}");
}

#[test]
fn provisional_line_is_drawn_while_dragging() {
    let mut state = make_input_state(200, 100);
    state.set_tool(Tool::Line);
    state.on_mouse_press(MouseButton::Left, 10.0, 70.0);
    state.on_mouse_motion(190.0, 70.0);

    assert!(state.shapes().is_empty());
    let (r, g, b) = rgb_at(&render_pixels(&state, None), 30, 70);
    assert!(r < 50 && g > 200 && b < 50, "expected green preview, got {r},{g},{b}");
}
