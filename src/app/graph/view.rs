use eframe::egui::{
    self, Align2, Color32, FontId, RichText, Sense, Stroke, Ui, vec2,
};

use super::super::render_utils::{
    circle_visible, draw_background, fade, group_color, world_to_screen,
};
use super::{ViewModel, ZOOM_STEP_IN, ZOOM_STEP_OUT};

const NODE_RADIUS: f32 = 5.0;

impl ViewModel {
    pub(super) fn show(&mut self, ui: &mut Ui) {
        self.draw_toolbar(ui);
        ui.add_space(4.0);
        self.draw_canvas(ui);
    }

    fn draw_toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui.button("Zoom in").clicked() {
                self.zoom_by(ZOOM_STEP_IN);
            }
            if ui.button("Zoom out").clicked() {
                self.zoom_by(ZOOM_STEP_OUT);
            }
            ui.label(format!("{:.0}%", self.zoom * 100.0));

            ui.separator();
            let search = ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Search nodes...")
                    .desired_width(220.0),
            );
            // A filter edit restarts the layout; positions are kept.
            if search.changed() {
                self.sim.restart();
            }
            if !self.search.is_empty() && ui.button("Clear").clicked() {
                self.search.clear();
                self.sim.restart();
            }
        });
    }

    fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_zoom(ui, rect, &response);

        let node_radius = (NODE_RADIUS * self.zoom).clamp(1.5, 24.0);
        let screen_positions = self
            .sim
            .nodes
            .iter()
            .map(|node| world_to_screen(rect, self.pan, self.zoom, node.world_pos))
            .collect::<Vec<_>>();

        // While a drag is in flight the grabbed node counts as hovered so the
        // pointer cannot "escape" a fast-moving circle.
        let hovered = self
            .drag
            .or_else(|| self.hovered_index(ui, &screen_positions, node_radius));

        self.handle_drag(rect, &response, hovered);
        self.handle_pan(&response);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            self.apply_selection(hovered);
        }

        let moving = self.sim.step();
        if moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        let matches = self.search_matches();
        let matches = matches.as_deref();

        for edge in &self.snapshot.edges {
            let (Some(source), Some(target)) = (
                self.snapshot.nodes.iter().position(|n| n.id == edge.source),
                self.snapshot.nodes.iter().position(|n| n.id == edge.target),
            ) else {
                continue;
            };

            let opacity = Self::edge_opacity(matches, source, target);
            let width = (edge.weight.max(0.0).sqrt() * self.zoom).clamp(0.3, 4.0);
            painter.line_segment(
                [screen_positions[source], screen_positions[target]],
                Stroke::new(width, fade(Color32::from_gray(153), opacity)),
            );
        }

        for (index, node) in self.snapshot.nodes.iter().enumerate() {
            let position = screen_positions[index];
            if !circle_visible(rect, position, node_radius + 3.0) {
                continue;
            }

            let opacity = Self::node_opacity(matches, index);
            let is_selected = self.selected == Some(node.id);

            if is_selected {
                painter.circle_stroke(
                    position,
                    node_radius + 3.5,
                    Stroke::new(1.5, Color32::from_rgb(245, 206, 93)),
                );
            }

            painter.circle_filled(position, node_radius, fade(group_color(node.group), opacity));
            painter.circle_stroke(
                position,
                node_radius,
                Stroke::new(1.5, fade(Color32::WHITE, opacity)),
            );
        }

        if let Some(node) = hovered.and_then(|index| self.snapshot.nodes.get(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                &node.name,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.draw_selection_details(ui);
    }

    /// Overlay card for the selected node: name, color group and degree.
    fn draw_selection_details(&mut self, ui: &mut Ui) {
        let Some(selected_id) = self.selected else {
            return;
        };
        let Some(node) = self.snapshot.node(selected_id) else {
            self.selected = None;
            return;
        };

        let name = node.name.clone();
        let group = node.group;
        let degree = self.snapshot.degree(selected_id);

        egui::Window::new("selection_details")
            .title_bar(false)
            .resizable(false)
            .anchor(Align2::LEFT_BOTTOM, vec2(16.0, -16.0))
            .show(ui.ctx(), |ui| {
                ui.label(RichText::new(name).strong());
                ui.label(format!("Group: {group}"));
                ui.label(format!("Connections: {degree}"));
                if ui.small_button("Dismiss").clicked() {
                    self.selected = None;
                }
            });
    }
}
