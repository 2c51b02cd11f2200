use egui::{Align, Color32, CursorIcon, Label, Layout, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};

use crate::carpark::{CarparkRecord, display_or_na};
use crate::preferences::FavoriteSet;
use crate::view_model::{SortKey, SortState};

use super::{PALETTE_AMBER, PALETTE_GREEN, PALETTE_RED};

const HEADER_HEIGHT: f32 = 26.;
const ROW_HEIGHT: f32 = 24.;

/// What the user clicked while the table was drawn. Applied after rendering so the
/// table only needs read access to the dashboard.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TableAction {
    Sort(SortKey),
    ShowMap(CarparkRecord),
    ToggleFavorite(String),
}

pub(crate) fn status_color(status: &str) -> Color32 {
    match status.to_lowercase().as_str() {
        "open" => PALETTE_GREEN,
        "closed" => PALETTE_RED,
        _ => Color32::GRAY,
    }
}

/// Draws `records` with sortable headers and per-row map and favorite buttons.
pub(crate) fn carpark_table(
    ui: &mut Ui,
    id_salt: &str,
    records: &[&CarparkRecord],
    sort: &SortState,
    favorites: &FavoriteSet,
) -> Vec<TableAction> {
    let mut actions = Vec::new();

    let table = TableBuilder::new(ui)
        .id_salt(id_salt)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::initial(240.).at_least(120.).clip(true))
        .column(Column::initial(320.).at_least(120.).clip(true))
        .column(Column::initial(90.).at_least(60.))
        .column(Column::initial(80.).at_least(60.))
        .column(Column::remainder().at_least(100.));

    let table = table.header(HEADER_HEIGHT, |mut header| {
        for key in SortKey::ALL {
            header.col(|ui| {
                let text = format!("{} {}", key.label(), sort.indicator(key));
                let response = ui
                    .add(Label::new(RichText::new(text).strong()).sense(Sense::click()))
                    .on_hover_cursor(CursorIcon::PointingHand);
                if response.clicked() {
                    actions.push(TableAction::Sort(key));
                }
            });
        }
        header.col(|ui| {
            ui.strong("Actions");
        });
    });

    table.body(|mut body| {
        if records.is_empty() {
            body.row(ROW_HEIGHT, |mut row| {
                row.col(|ui| {
                    ui.label(RichText::new("No parking data available.").color(Color32::GRAY));
                });
                for _ in 0..SortKey::ALL.len() {
                    row.col(|_| {});
                }
            });
            return;
        }

        for record in records {
            body.row(ROW_HEIGHT, |mut row| {
                row.col(|ui| {
                    ui.label(display_or_na(&record.name));
                });
                row.col(|ui| {
                    ui.label(display_or_na(&record.display_address));
                });
                row.col(|ui| {
                    ui.label(
                        RichText::new(display_or_na(&record.opening_status))
                            .color(status_color(&record.opening_status)),
                    );
                });
                row.col(|ui| {
                    ui.label(record.vacancy.as_str());
                });
                row.col(|ui| {
                    if ui.button("Map").on_hover_text("Show on Map").clicked() {
                        actions.push(TableAction::ShowMap((*record).clone()));
                    }
                    let (star, hint) = if favorites.contains(&record.park_id) {
                        ("★", "Remove from favorites")
                    } else {
                        ("☆", "Add to favorites")
                    };
                    let star = RichText::new(star).color(PALETTE_AMBER);
                    if ui.button(star).on_hover_text(hint).clicked() {
                        actions.push(TableAction::ToggleFavorite(record.park_id.clone()));
                    }
                });
            });
        }
    });

    actions
}
