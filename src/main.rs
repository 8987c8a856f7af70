//! IPTV Catalog - Rust Edition
//! Browse the public iptv-org channel directory and play its streams

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

mod api;
mod batch;
mod catalog;
mod config;
mod debounce;
mod error;
mod ffmpeg_player;
mod filter;
mod logger;
mod models;
mod playback;
mod state;

use api::CatalogClient;
use catalog::{Catalog, FAILED_LOGO_AVATAR};
use config::*;
use debounce::Debouncer;
use filter::FilterCriteria;
use ffmpeg_player::PlayerWindow;
use logger::ConsoleBuffer;
use models::*;
use playback::{
    Backend, EngineEvent, Launcher, PlaybackController, PlaybackEnv, PlaybackStatus, PlayerSettings, ProcessLauncher,
    MAX_RECOVERIES,
};
use state::CatalogView;

/// Search input is applied once typing pauses this long
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

const CARD_WIDTH: f32 = 170.0;
const LOGO_SIZE: egui::Vec2 = egui::vec2(120.0, 68.0);

/// Application icon: slate tile with a TV screen and play button
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            let corner = 0.125;
            let dx = (corner - nx).max(nx - (1.0 - corner)).max(0.0);
            let dy = (corner - ny).max(ny - (1.0 - corner)).max(0.0);
            if dx * dx + dy * dy > corner * corner {
                continue; // transparent corner
            }

            // #1e293b background
            let mut px = [30u8, 41, 59, 255];

            let in_screen = (0.14..=0.86).contains(&nx) && (0.2..=0.7).contains(&ny);
            let in_stand = (0.38..=0.62).contains(&nx) && (0.76..=0.82).contains(&ny);
            let (tx, ty) = (nx - 0.42, ny - 0.45);
            let in_play = (0.0..=0.18).contains(&tx) && ty.abs() <= (0.18 - tx) * 0.7;

            if in_play {
                px = [255, 255, 255, 255];
            } else if in_screen {
                // #3b82f6 to #6366f1
                let t = nx;
                px = [
                    (59.0 + (99.0 - 59.0) * t) as u8,
                    (130.0 + (102.0 - 130.0) * t) as u8,
                    (246.0 + (241.0 - 246.0) * t) as u8,
                    255,
                ];
            } else if in_stand {
                px = [148, 163, 184, 255];
            }

            rgba[idx..idx + 4].copy_from_slice(&px);
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

/// System emoji fonts, needed to render country flags
fn emoji_fonts() -> egui::FontDefinitions {
    let mut fonts = egui::FontDefinitions::default();

    #[cfg(target_os = "windows")]
    let candidates: &[&str] = &["C:\\Windows\\Fonts\\seguiemj.ttf"];
    #[cfg(target_os = "linux")]
    let candidates: &[&str] = &[
        "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
        "/usr/share/fonts/noto-emoji/NotoColorEmoji.ttf",
        "/usr/share/fonts/google-noto-emoji/NotoColorEmoji.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ];
    #[cfg(target_os = "macos")]
    let candidates: &[&str] = &["/System/Library/Fonts/Apple Color Emoji.ttc"];
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    let candidates: &[&str] = &[];

    for path in candidates {
        if let Ok(font_data) = std::fs::read(path) {
            fonts.font_data.insert(
                "emoji".to_owned(),
                egui::FontData::from_owned(font_data).into(),
            );
            fonts.families
                .entry(egui::FontFamily::Proportional)
                .or_default()
                .push("emoji".to_owned());
            log::debug!("Loaded emoji font {}", path);
            break;
        }
    }

    fonts
}

fn main() -> Result<(), eframe::Error> {
    let console = logger::init(logger::level_from_env());
    log::info!("IPTV Catalog v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1250.0, 760.0])
            .with_min_inner_size([900.0, 550.0])
            .with_icon(load_icon()),
        vsync: true,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        ..Default::default()
    };

    eframe::run_native(
        "IPTV Catalog",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_fonts(emoji_fonts());
            egui_extras::install_image_loaders(&cc.egui_ctx);
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(IptvApp::new(config, console)))
        }),
    )
}

/// Results from background tasks
enum TaskResult {
    CatalogLoaded(Box<Catalog>),
    Error(String),
}

struct IptvApp {
    config: AppConfig,
    console: ConsoleBuffer,

    // State
    current_tab: Tab,
    status_message: String,
    loading: bool,
    load_error: Option<String>,

    // Background task channel
    task_receiver: Receiver<TaskResult>,
    task_sender: Sender<TaskResult>,

    // Catalog
    view: Option<CatalogView>,
    search_query: String,
    search_debounce: Debouncer<String>,
    failed_logos: HashSet<String>,

    // Playback
    controller: PlaybackController,
    launcher: ProcessLauncher,
    engine: PlayerWindow,
    selected: Option<ChannelRecord>,
    playback_status: Option<PlaybackStatus>,
}

impl IptvApp {
    fn new(config: AppConfig, console: ConsoleBuffer) -> Self {
        let (task_sender, task_receiver) = channel();
        let launcher = ProcessLauncher::new(config.single_window_mode);
        let engine = PlayerWindow::new(config.use_internal_player);

        let mut app = Self {
            config,
            console,
            current_tab: Tab::Channels,
            status_message: String::new(),
            loading: false,
            load_error: None,
            task_receiver,
            task_sender,
            view: None,
            search_query: String::new(),
            search_debounce: Debouncer::new(SEARCH_DEBOUNCE),
            failed_logos: HashSet::new(),
            controller: PlaybackController::default(),
            launcher,
            engine,
            selected: None,
            playback_status: None,
        };
        app.load_catalog();
        app
    }

    /// Fetch and join the catalog on a background thread
    fn load_catalog(&mut self) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.load_error = None;
        self.status_message = "Loading channel catalog...".to_string();
        log::info!("Loading catalog from {}", self.config.api_base);

        let client = CatalogClient::new(&self.config.api_base, self.config.request_timeout_secs)
            .with_user_agent(&self.config.user_agent);
        let sender = self.task_sender.clone();

        thread::spawn(move || {
            let result = match client.fetch_all() {
                Ok(raw) => TaskResult::CatalogLoaded(Box::new(Catalog::build(raw))),
                Err(e) => {
                    log::error!("Catalog load failed ({}): {}", e.resource(), e);
                    TaskResult::Error(e.to_string())
                }
            };
            let _ = sender.send(result);
        });
    }

    fn process_tasks(&mut self) {
        while let Ok(result) = self.task_receiver.try_recv() {
            match result {
                TaskResult::CatalogLoaded(catalog) => {
                    self.loading = false;
                    self.status_message = format!("Loaded {} channels", catalog.len());
                    if catalog.is_empty() {
                        log::warn!("Catalog loaded but no channel has a playable stream");
                    }

                    // Keep whatever the user typed while loading
                    let mut view = CatalogView::new(*catalog);
                    self.search_debounce.cancel();
                    view.set_search(&self.search_query);
                    self.view = Some(view);
                }
                TaskResult::Error(message) => {
                    self.loading = false;
                    self.status_message = "Error loading catalog".to_string();
                    self.load_error = Some(message);
                }
            }
        }
    }

    fn player_settings(&self) -> PlayerSettings {
        PlayerSettings::from_config(&self.config)
    }

    fn play(&mut self, channel: ChannelRecord) {
        let settings = self.player_settings();
        let mut env = PlaybackEnv {
            launcher: &mut self.launcher,
            engine: &mut self.engine,
            settings: &settings,
        };
        let status = self.controller.play(&channel, &mut env);
        self.status_message = status.status_line(&channel.name);
        self.selected = Some(channel);
        self.playback_status = Some(status);
    }

    /// Forward engine events and player exits to the controller
    fn poll_playback(&mut self) {
        let events = self.engine.poll();
        let exit = self.launcher.poll_exit();
        if events.is_empty() && exit.is_none() {
            return;
        }

        let settings = self.player_settings();
        let mut env = PlaybackEnv {
            launcher: &mut self.launcher,
            engine: &mut self.engine,
            settings: &settings,
        };

        let mut updates = Vec::new();
        for event in events {
            let status = match event {
                EngineEvent::Started => self.controller.handle_engine_started(),
                EngineEvent::Fault(fault) => self.controller.handle_engine_fault(fault, &mut env),
            };
            updates.extend(status);
        }
        if let Some(exit) = exit {
            updates.extend(self.controller.handle_process_exit(exit, &mut env));
        }

        if let Some(status) = updates.pop() {
            if let Some(channel) = &self.selected {
                self.status_message = status.status_line(&channel.name);
            }
            self.playback_status = Some(status);
        }
    }

    /// Explicit close: the external player goes too, whatever the window mode
    fn close_player(&mut self) {
        if self.launcher.terminate() {
            log::info!("[PLAY] Player closed from the player window");
        }
        let settings = self.player_settings();
        let mut env = PlaybackEnv {
            launcher: &mut self.launcher,
            engine: &mut self.engine,
            settings: &settings,
        };
        self.controller.stop(&mut env);
        self.selected = None;
        self.playback_status = None;
    }

    fn save_config(&mut self) {
        match self.config.save() {
            Ok(path) => {
                log::info!("Settings saved to {}", path.display());
                self.status_message = "Settings saved".to_string();
            }
            Err(e) => {
                log::error!("Failed to save settings: {}", e);
                self.status_message = format!("Failed to save settings: {}", e);
            }
        }
    }

    fn browse_player(&mut self) {
        let dialog = rfd::FileDialog::new().set_title("Select Media Player");
        #[cfg(target_os = "windows")]
        let dialog = dialog
            .add_filter("Executables", &["exe", "com", "bat", "cmd"])
            .add_filter("All Files", &["*"]);
        #[cfg(target_os = "macos")]
        let dialog = dialog
            .add_filter("Applications", &["app"])
            .add_filter("All Files", &["*"]);

        if let Some(path) = dialog.pick_file() {
            self.config.external_player = path.display().to_string();
        }
    }

    /// Card image: the channel logo unless it already failed to load
    fn card_logo(&self, record: &ChannelRecord) -> String {
        let uri = catalog::logo_url(record);
        if self.failed_logos.contains(&uri) {
            FAILED_LOGO_AVATAR.to_string()
        } else {
            uri
        }
    }
}

impl eframe::App for IptvApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_tasks();
        self.poll_playback();

        // Debounced search
        let now = Instant::now();
        if let Some(query) = self.search_debounce.poll(now) {
            if let Some(view) = self.view.as_mut() {
                view.set_search(&query);
            }
        }
        if let Some(remaining) = self.search_debounce.time_remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        // Player exit is only noticed when polled
        if self.loading || self.launcher.is_running() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        if self.config.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // Top panel - Settings
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(5.0);
            self.show_settings_bar(ui);
            ui.add_space(5.0);
        });

        // Bottom panel - Status
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.loading {
                    ui.spinner();
                }
                ui.label(&self.status_message);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.current_tab, Tab::Channels, "📺 Channels");
                ui.selectable_value(&mut self.current_tab, Tab::Console, "🖥 Console");
            });
            ui.separator();

            match self.current_tab {
                Tab::Channels => self.show_channels_tab(ui),
                Tab::Console => self.show_console_tab(ui),
            }
        });

        self.show_player_window(ctx);
    }
}

impl IptvApp {
    fn show_settings_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("🎬 Player:");
            ui.add(egui::TextEdit::singleline(&mut self.config.external_player)
                .hint_text("mpv, vlc, ffplay...")
                .desired_width(220.0))
                .on_hover_text("Player command or path.\nLeave empty to use the first of mpv, vlc, ffplay found on PATH");

            if ui.button("📁").on_hover_text("Browse for player executable").clicked() {
                self.browse_player();
            }

            ui.separator();

            ui.label("📶 Connection:");
            egui::ComboBox::from_id_salt("connection_quality")
                .selected_text(self.config.connection_quality.label())
                .show_ui(ui, |ui| {
                    for quality in ConnectionQuality::ALL {
                        let text = match quality {
                            ConnectionQuality::Custom => quality.label().to_string(),
                            _ => format!("{} ({}s)", quality.label(), quality.buffer_seconds(0)),
                        };
                        ui.selectable_value(&mut self.config.connection_quality, quality, text);
                    }
                });

            if self.config.connection_quality == ConnectionQuality::Custom {
                ui.label("Buffer:");
                ui.add(egui::DragValue::new(&mut self.config.buffer_seconds)
                    .range(1..=120)
                    .suffix("s"));
            }
            ui.label(format!("({}s)", self.config.effective_buffer()));

            ui.separator();

            ui.checkbox(&mut self.config.hw_accel, "HW Acceleration")
                .on_hover_text("GPU decoding in external players.\nDisable if you experience playback issues");
        });

        ui.horizontal(|ui| {
            if ui.checkbox(&mut self.config.use_internal_player, "Built-in engine")
                .on_hover_text("Try the built-in FFmpeg engine before external players")
                .changed()
            {
                self.engine.set_enabled(self.config.use_internal_player);
            }

            if ui.checkbox(&mut self.config.single_window_mode, "Single Window")
                .on_hover_text("Close previous player when opening new stream")
                .changed()
            {
                self.launcher.set_single_window(self.config.single_window_mode);
            }

            ui.checkbox(&mut self.config.pass_user_agent_to_player, "Send User Agent")
                .on_hover_text("Pass the user agent to external players");

            ui.checkbox(&mut self.config.dark_mode, "🌙 Dark");

            ui.separator();

            if ui.button("💾 Save").on_hover_text("Save current settings").clicked() {
                self.save_config();
            }

            if ui.add_enabled(!self.loading, egui::Button::new("🔄 Reload"))
                .on_hover_text("Fetch the catalog again")
                .clicked()
            {
                self.load_catalog();
            }
        });
    }

    fn show_channels_tab(&mut self, ui: &mut egui::Ui) {
        // Search and filters
        let mut country_change: Option<Option<String>> = None;
        let mut category_change: Option<Option<String>> = None;

        ui.horizontal(|ui| {
            ui.label("🔍");
            let search = ui.add(egui::TextEdit::singleline(&mut self.search_query)
                .hint_text("Search channels...")
                .desired_width(260.0));
            if search.changed() {
                self.search_debounce.push(self.search_query.clone(), Instant::now());
            }

            let Some(view) = self.view.as_ref() else {
                return;
            };
            let catalog = view.catalog();
            let criteria = view.criteria();

            let country_text = criteria
                .country
                .as_deref()
                .and_then(|code| catalog.countries.iter().find(|o| o.value == code))
                .map(|o| o.label.as_str())
                .unwrap_or("All countries");
            egui::ComboBox::from_id_salt("country_filter")
                .selected_text(country_text)
                .width(200.0)
                .height(400.0)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(criteria.country.is_none(), "All countries").clicked() {
                        country_change = Some(None);
                    }
                    for option in &catalog.countries {
                        let selected = criteria.country.as_deref() == Some(option.value.as_str());
                        if ui.selectable_label(selected, &option.label).clicked() {
                            country_change = Some(Some(option.value.clone()));
                        }
                    }
                });

            let category_text = criteria
                .category
                .as_deref()
                .map(|id| catalog.category_name(id))
                .unwrap_or("All categories");
            egui::ComboBox::from_id_salt("category_filter")
                .selected_text(category_text)
                .width(180.0)
                .height(400.0)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(criteria.category.is_none(), "All categories").clicked() {
                        category_change = Some(None);
                    }
                    for option in &catalog.categories {
                        let selected = criteria.category.as_deref() == Some(option.value.as_str());
                        if ui.selectable_label(selected, &option.label).clicked() {
                            category_change = Some(Some(option.value.clone()));
                        }
                    }
                });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(view.count_label()).strong());
            });
        });
        ui.separator();

        if let Some(view) = self.view.as_mut() {
            if let Some(country) = country_change {
                view.set_country(country);
            }
            if let Some(category) = category_change {
                view.set_category(category);
            }
        }

        let Some(view) = self.view.as_ref() else {
            ui.vertical_centered(|ui| {
                ui.add_space(100.0);
                if let Some(error) = &self.load_error {
                    ui.colored_label(egui::Color32::RED, "Error loading data. Check the Console tab.");
                    ui.label(egui::RichText::new(error).weak());
                    ui.add_space(10.0);
                    if ui.button("🔄 Retry").clicked() {
                        self.load_catalog();
                    }
                } else {
                    ui.spinner();
                    ui.label("Loading channels...");
                }
            });
            return;
        };

        if view.no_results() {
            let mut clear = false;
            ui.vertical_centered(|ui| {
                ui.add_space(100.0);
                ui.heading("No channels found");
                ui.label(egui::RichText::new("Try another search or filter").weak());
                if !view.criteria().is_empty() {
                    ui.add_space(10.0);
                    clear = ui.button("✖ Clear filters").clicked();
                }
            });
            if clear {
                self.search_query.clear();
                self.search_debounce.cancel();
                if let Some(view) = self.view.as_mut() {
                    view.set_criteria(FilterCriteria::default());
                }
            }
            return;
        }

        let mut clicked: Option<ChannelRecord> = None;
        let mut load_more = false;
        let mut failed: Vec<String> = Vec::new();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(10.0, 10.0);
                    for record in view.painted() {
                        let logo = self.card_logo(record);
                        let response = egui::Frame::group(ui.style())
                            .show(ui, |ui| {
                                ui.set_width(CARD_WIDTH);
                                ui.vertical_centered(|ui| {
                                    ui.add(egui::Image::new(logo.clone())
                                        .fit_to_exact_size(LOGO_SIZE)
                                        .maintain_aspect_ratio(true));
                                    ui.label(egui::RichText::new(&record.name).strong());
                                    ui.label(format!("{} {}", record.flag, view.catalog().category_name(&record.category)));
                                });
                            })
                            .response
                            .interact(egui::Sense::click())
                            .on_hover_cursor(egui::CursorIcon::PointingHand);

                        if response.clicked() {
                            clicked = Some(record.clone());
                        }

                        if logo != FAILED_LOGO_AVATAR
                            && ui.ctx().try_load_image(&logo, egui::load::SizeHint::default()).is_err()
                        {
                            failed.push(logo);
                        }
                    }
                });

                // Load-more trigger after the last card
                if view.has_more() {
                    ui.add_space(10.0);
                    let trigger = ui.vertical_centered(|ui| ui.spinner()).inner;
                    if ui.is_rect_visible(trigger.rect) {
                        load_more = true;
                    }
                }
            });

        for uri in failed {
            log::debug!("Logo failed to load: {}", uri);
            self.failed_logos.insert(uri);
        }

        if load_more {
            if let Some(view) = self.view.as_mut() {
                let added = view.load_more();
                log::debug!("Painted {} more cards ({}/{})", added, view.painted_count(), view.filtered_count());
                ui.ctx().request_repaint();
            }
        }

        if let Some(channel) = clicked {
            self.play(channel);
        }
    }

    fn show_console_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Console Log");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.console.clear();
                    log::info!("Console cleared");
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in self.console.snapshot() {
                    let color = match line.level {
                        log::Level::Error => egui::Color32::RED,
                        log::Level::Warn => egui::Color32::YELLOW,
                        _ if line.text.contains("[PLAY]") => egui::Color32::GREEN,
                        log::Level::Info => egui::Color32::LIGHT_BLUE,
                        _ => egui::Color32::GRAY,
                    };
                    ui.label(egui::RichText::new(line.text).monospace().color(color));
                }
            });
    }

    fn show_player_window(&mut self, ctx: &egui::Context) {
        let Some(channel) = self.selected.clone() else {
            return;
        };

        let mut open = true;
        let mut close = false;
        let mut retry = false;
        let engine_active = matches!(
            self.controller.active(),
            Some(playing) if playing.backend == Backend::Engine
        );

        egui::Window::new(format!("📺 {}", channel.name))
            .id(egui::Id::new("player_window"))
            .open(&mut open)
            .resizable(true)
            .default_size([860.0, 540.0])
            .show(ctx, |ui| {
                ui.heading(&channel.name);
                ui.label(egui::RichText::new(format!(
                    "{} • {}",
                    channel.country_name,
                    self.view
                        .as_ref()
                        .map(|v| v.catalog().category_name(&channel.category))
                        .unwrap_or(channel.category.as_str())
                )).weak());
                ui.separator();

                match &self.playback_status {
                    Some(PlaybackStatus::Playing(playing)) => {
                        ui.colored_label(egui::Color32::GREEN, format!("▶ {}", playing.describe()));
                    }
                    Some(PlaybackStatus::Recovering { attempt, detail }) => {
                        ui.colored_label(
                            egui::Color32::YELLOW,
                            format!("⟳ Recovering ({}/{}): {}", attempt, MAX_RECOVERIES, detail),
                        );
                    }
                    Some(PlaybackStatus::Failed(diagnostic)) => {
                        ui.colored_label(egui::Color32::RED, "⚠ No playback method worked for this stream");
                        egui::ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                            ui.label(egui::RichText::new(diagnostic.to_string()).monospace());
                        });
                        if ui.button("🔄 Retry").clicked() {
                            retry = true;
                        }
                    }
                    Some(PlaybackStatus::Ended) => {
                        ui.label("Player closed");
                        if ui.button("▶ Play again").clicked() {
                            retry = true;
                        }
                    }
                    None => {}
                }

                if engine_active {
                    ui.separator();
                    self.engine.show(ctx, ui);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("📋 Copy link").clicked() {
                        ui.ctx().copy_text(channel.stream_url.clone());
                        log::info!("Copied stream URL for {}", channel.name);
                    }
                    if let Some(website) = &channel.website {
                        ui.hyperlink_to("🌐 Open website", website);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✖ Close")
                            .on_hover_text("Stop playback, including any external player")
                            .clicked()
                        {
                            close = true;
                        }
                    });
                });
            });

        if !open || close {
            self.close_player();
        } else if retry {
            self.play(channel);
        }
    }
}
