mod detail;
mod map;
mod table;

use egui::{Color32, ComboBox, RichText, ScrollArea, TextEdit, Ui, Visuals};
use log::{error, info};

use crate::EaseParkError;
use crate::carpark::{FetchWorker, HttpProvider, VehicleType};
use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::preferences::{KeyValueStore, Preferences};

use table::TableAction;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(18, 18, 22);
pub(crate) const PALETTE_SLATE: Color32 = Color32::from_rgb(44, 62, 80);
pub(crate) const PALETTE_AMBER: Color32 = Color32::from_rgb(243, 156, 18);
pub(crate) const PALETTE_GREEN: Color32 = Color32::from_rgb(46, 204, 113);
pub(crate) const PALETTE_RED: Color32 = Color32::from_rgb(231, 76, 60);

/// `DashboardApp` renders the carpark dashboard and forwards user input to a
/// [`Dashboard`].
///
/// Fetches run on a [`FetchWorker`]; finished fetches are drained at the start of
/// every frame and the worker requests a repaint when one lands.
pub struct DashboardApp {
    dashboard: Dashboard<Box<dyn KeyValueStore>>,
    worker: FetchWorker,
    app_config: AppConfig,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        app_config: AppConfig,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, EaseParkError> {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_visuals(Visuals {
            hyperlink_color: PALETTE_AMBER,
            panel_fill: PALETTE_BLACK,
            faint_bg_color: PALETTE_SLATE,
            striped: true,
            ..Visuals::dark()
        });

        let provider = HttpProvider::new(
            app_config.info_url.clone(),
            app_config.vacancy_url.clone(),
            app_config.request_timeout(),
        )?;
        let repaint_ctx = cc.egui_ctx.clone();
        let worker = FetchWorker::spawn(provider, move || repaint_ctx.request_repaint())?;

        let mut dashboard = Dashboard::new(Preferences::new(store));
        worker.request(dashboard.refresh());

        Ok(Self {
            dashboard,
            worker,
            app_config,
        })
    }

    fn header(&mut self, ui: &mut Ui) {
        ui.add_space(6.);
        ui.heading(RichText::new("🚗 EasePark").color(Color32::WHITE).size(26.));
        ui.label(
            RichText::new("Find Real-Time Parking Availability in Hong Kong").color(Color32::GRAY),
        );
        ui.add_space(6.);

        let mut vehicle_type = self.dashboard.filter().vehicle_type;
        let mut search = self.dashboard.filter().search.clone();
        let mut search_changed = false;

        ui.horizontal(|ui| {
            ui.label("Vehicle Type:");
            ComboBox::from_id_salt("vehicle_type")
                .selected_text(vehicle_type.label())
                .show_ui(ui, |ui| {
                    for vt in VehicleType::ALL {
                        ui.selectable_value(&mut vehicle_type, vt, vt.label());
                    }
                });

            ui.separator();
            ui.label("Search:");
            search_changed = ui
                .add(
                    TextEdit::singleline(&mut search)
                        .hint_text("Search by name or address")
                        .desired_width(280.),
                )
                .changed();
        });
        ui.add_space(6.);

        if search_changed {
            self.dashboard.set_search(search);
        }
        if let Some(request) = self.dashboard.set_vehicle_type(vehicle_type) {
            info!("Vehicle type changed to {}", vehicle_type);
            self.worker.request(request);
        }
    }

    fn content(&mut self, ui: &mut Ui) {
        let mut actions = Vec::new();

        ScrollArea::vertical()
            .id_salt("dashboard_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let lists = self.dashboard.lists();
                let sort = self.dashboard.sort();
                let favorites = self.dashboard.favorites();

                if !lists.favorites.is_empty() {
                    ui.heading(RichText::new("★ Favourite Car Parks").color(PALETTE_AMBER));
                    actions.extend(table::carpark_table(
                        ui,
                        "favorites_table",
                        &lists.favorites,
                        sort,
                        favorites,
                    ));
                    ui.add_space(16.);
                }

                ui.heading("All Parking Lots");
                if self.dashboard.is_loading() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading parking data...");
                    });
                } else {
                    actions.extend(table::carpark_table(
                        ui,
                        "carparks_table",
                        &lists.available,
                        sort,
                        favorites,
                    ));
                }
            });

        for action in actions {
            match action {
                TableAction::Sort(key) => self.dashboard.sort_by(key),
                TableAction::ShowMap(record) => self.dashboard.select(&record),
                TableAction::ToggleFavorite(park_id) => {
                    self.dashboard.toggle_favorite(&park_id);
                }
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Some(outcome) = self.worker.try_recv() {
            self.dashboard.apply(outcome);
        }

        if let Some(inner_rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.app_config.window_size = inner_rect.size().into();
        }

        egui::TopBottomPanel::top("dashboard_controls").show(ctx, |ui| self.header(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.content(ui));
        if !self.dashboard.is_loading() {
            self.detail_overlay(ctx);
        }
    }
}
