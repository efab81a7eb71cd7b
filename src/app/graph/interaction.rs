use eframe::egui::{self, Key, Pos2, Rect, Ui};

use super::super::render_utils::screen_to_world;
use super::{ViewModel, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP_IN, ZOOM_STEP_OUT};

impl ViewModel {
    /// Wheel zoom about the pointer: the world point under the cursor stays
    /// put while the scale changes. Scale is always clamped to the fixed
    /// zoom bounds.
    pub(super) fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() > f32::EPSILON {
            let pointer = ui
                .input(|input| input.pointer.hover_pos())
                .unwrap_or_else(|| rect.center());
            let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
            self.zoom_about(rect, pointer, zoom_factor);
        }

        let (zoom_in, zoom_out) = ui.input(|input| {
            (
                input.key_pressed(Key::ArrowUp),
                input.key_pressed(Key::ArrowDown),
            )
        });
        if zoom_in {
            self.zoom_by(ZOOM_STEP_IN);
        }
        if zoom_out {
            self.zoom_by(ZOOM_STEP_OUT);
        }
    }

    /// Pointer-anchored zoom: rescales, then re-derives pan so the world
    /// point under `pointer` projects to the same screen position.
    pub(super) fn zoom_about(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Button/keyboard zoom: multiplicative step about the viewport center.
    pub(super) fn zoom_by(&mut self, factor: f32) {
        let next = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        if self.zoom > 0.0 {
            self.pan *= next / self.zoom;
        }
        self.zoom = next;
    }

    pub(super) fn handle_pan(&mut self, response: &egui::Response) {
        let background_drag = response.dragged_by(egui::PointerButton::Primary)
            && self.drag.is_none();
        if background_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Drag-to-pin lifecycle. Press on a node pins it and reheats the
    /// layout; moves track the pointer in world space; release unpins and
    /// lets the simulation cool back down.
    pub(super) fn handle_drag(&mut self, rect: Rect, response: &egui::Response, hovered: Option<usize>) {
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(index) = hovered
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            self.drag = Some(index);
            self.sim.pin(index, world);
            self.sim.reheat();
        }

        if let Some(index) = self.drag {
            if response.dragged_by(egui::PointerButton::Primary) {
                if let Some(pointer) = response.interact_pointer_pos() {
                    let world = screen_to_world(rect, self.pan, self.zoom, pointer);
                    self.sim.move_pin(index, world);
                }
            }

            if response.drag_stopped_by(egui::PointerButton::Primary) {
                self.sim.release_pin(index);
                self.sim.cool();
                self.drag = None;
            }
        }
    }

    pub(super) fn hovered_index(
        &self,
        ui: &Ui,
        screen_positions: &[Pos2],
        radius: f32,
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        screen_positions
            .iter()
            .enumerate()
            .filter_map(|(index, position)| {
                let distance = position.distance(pointer);
                (distance <= radius + 2.0).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _distance)| index)
    }

    pub(super) fn apply_selection(&mut self, hovered: Option<usize>) {
        self.selected = hovered.and_then(|index| self.snapshot.nodes.get(index)).map(|node| node.id);
    }
}
