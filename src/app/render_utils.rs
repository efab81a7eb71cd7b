use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Category palette for concept groups, indexed modulo its length.
pub(super) const GROUP_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

pub(super) fn group_color(group: u8) -> Color32 {
    GROUP_PALETTE[group as usize % GROUP_PALETTE.len()]
}

/// Scales a color's alpha by `opacity` in [0, 1].
pub(super) fn fade(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            grid_stroke,
        );
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            grid_stroke,
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    #[test]
    fn screen_and_world_transforms_are_inverse() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(33.0, -12.0);
        let zoom = 1.7;

        let world = vec2(120.0, -45.0);
        let round_trip = screen_to_world(rect, pan, zoom, world_to_screen(rect, pan, zoom, world));
        assert!((round_trip - world).length() < 0.001);
    }

    #[test]
    fn palette_wraps_on_group_overflow() {
        assert_eq!(group_color(0), group_color(10));
        assert_eq!(group_color(3), group_color(13));
    }

    #[test]
    fn fade_scales_only_alpha() {
        let faded = fade(Color32::from_rgb(10, 20, 30), 0.1);
        assert_eq!((faded.r(), faded.g(), faded.b()), (10, 20, 30));
        assert_eq!(faded.a(), 25);
    }
}
