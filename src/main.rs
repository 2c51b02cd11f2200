use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, warn};

use easepark::carpark::{HttpProvider, fetch_carparks};
use easepark::config::AppConfig;
use easepark::listing::render_table;
use easepark::ui::DashboardApp;
use easepark::view_model::{self, SortDirection};
use easepark::{
    EaseParkError, FileStore, FilterState, KeyValueStore, MemoryStore, Preferences, SortKey,
    SortState, VehicleType,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Preference file to use instead of the one in the config directory
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,

    /// Override the carpark metadata endpoint
    #[arg(long, global = true)]
    info_url: Option<String>,

    /// Override the live vacancy endpoint
    #[arg(long, global = true)]
    vacancy_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_s: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the dashboard window (default)
    Dashboard,
    /// Fetch once and print the available carparks
    List {
        #[arg(short, long)]
        vehicle_type: Option<VehicleType>,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        sort: Option<SortKey>,

        #[arg(long)]
        descending: bool,
    },
}

impl Args {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(info_url) = &self.info_url {
            config.info_url = info_url.clone();
        }
        if let Some(vacancy_url) = &self.vacancy_url {
            config.vacancy_url = vacancy_url.clone();
        }
        if let Some(timeout_s) = self.timeout_s {
            config.request_timeout_s = timeout_s;
        }
    }
}

fn open_store(path: Option<PathBuf>) -> Box<dyn KeyValueStore> {
    let store = match path {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default(),
    };
    match store {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Preferences will not be saved: {}", e);
            Box::new(MemoryStore::new())
        }
    }
}

fn dashboard(app_config: AppConfig, store: Box<dyn KeyValueStore>) -> Result<(), EaseParkError> {
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title("EasePark")
        .with_inner_size(app_config.window_size);

    eframe::run_native(
        "EasePark",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, app_config, store)?))),
    )
    .map_err(|e| EaseParkError::GuiStartError {
        reason: e.to_string(),
    })
}

fn list(
    app_config: &AppConfig,
    store: Box<dyn KeyValueStore>,
    vehicle_type: Option<VehicleType>,
    search: Option<String>,
    sort: Option<SortKey>,
    descending: bool,
) -> Result<(), EaseParkError> {
    let preferences = Preferences::new(store);
    let favorites = preferences.favorites();
    let vehicle_type = vehicle_type.unwrap_or_else(|| preferences.vehicle_type());

    let provider = HttpProvider::new(
        app_config.info_url.clone(),
        app_config.vacancy_url.clone(),
        app_config.request_timeout(),
    )?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| EaseParkError::RuntimeStart { source: e })?;
    let records = runtime
        .block_on(fetch_carparks(&provider, vehicle_type))
        .unwrap_or_else(|e| {
            error!("Error fetching data: {}", e);
            Vec::new()
        });

    let filter = FilterState {
        vehicle_type,
        search: search.unwrap_or_default(),
    };
    let sort = match sort {
        Some(key) if descending => SortState::new(key, SortDirection::Descending),
        Some(key) => SortState::new(key, SortDirection::Ascending),
        None => SortState::default(),
    };

    let available = view_model::available_list(&records, &filter, &sort, &favorites);
    println!("{}", render_table(&available, &favorites));
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let mut app_config = AppConfig::from_local_file().unwrap_or_default();
    cli.apply_overrides(&mut app_config);
    let store = open_store(cli.preferences.clone());

    let result = match cli.command {
        None | Some(Commands::Dashboard) => dashboard(app_config, store),
        Some(Commands::List {
            vehicle_type,
            search,
            sort,
            descending,
        }) => list(&app_config, store, vehicle_type, search, sort, descending),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("easepark: {}", e);
        std::process::exit(1);
    }
}
