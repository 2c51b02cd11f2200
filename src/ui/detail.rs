use egui::{Align, Id, Layout, Modal, RichText, Vec2};

use crate::carpark::{NOT_AVAILABLE, display_or_na};

use super::{DashboardApp, map, table::status_color};

const MAP_VIEW_SIZE: Vec2 = Vec2::new(480., 300.);

impl DashboardApp {
    /// Modal with the selected carpark's details and map. Clicking the backdrop,
    /// pressing Escape or the close button clears the selection.
    pub(crate) fn detail_overlay(&mut self, ctx: &egui::Context) {
        let Some(record) = self.dashboard.selected() else {
            return;
        };
        let vacancy = self
            .dashboard
            .selected_vacancy()
            .map(|v| v.as_str())
            .unwrap_or(NOT_AVAILABLE);

        let modal = Modal::new(Id::new("carpark_detail")).show(ctx, |ui| {
            ui.set_width(MAP_VIEW_SIZE.x);
            let mut close_clicked = false;

            ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                ui.heading(display_or_na(&record.name));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    close_clicked = ui.button("×").on_hover_text("Close").clicked();
                });
            });
            ui.separator();

            map::show_map(ui, record.latitude, record.longitude, MAP_VIEW_SIZE);
            ui.hyperlink_to("Open in Google Maps", record.map_url());
            ui.add_space(8.);

            ui.horizontal(|ui| {
                ui.strong("📍 Address:");
                ui.label(display_or_na(&record.display_address));
            });
            ui.horizontal(|ui| {
                ui.strong("🕒 Status:");
                ui.label(
                    RichText::new(display_or_na(&record.opening_status))
                        .color(status_color(&record.opening_status)),
                );
            });
            ui.horizontal(|ui| {
                ui.strong("Vacancies:");
                ui.label(display_or_na(vacancy));
            });

            close_clicked
        });

        if modal.inner || modal.should_close() {
            self.dashboard.close_detail();
        }
    }
}
