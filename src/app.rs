use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui::{self, Color32, RichText};
use image::ImageReader;

use repkg_common::toolchain::EXECUTABLE_NAME;
use repkg_common::{
    absolutize, collect_targets, copy_assets, run_batch, run_streaming, scan_wallpapers,
    strip_recursive, validate_input, with_input, ExtractOptions, HelpTopic, RunLog, SortKey,
    Toolchain, WallpaperEntry,
};

use crate::model::{BatchEntry, RunStatus, RunView, SessionState, WorkerMsg};
use crate::picker::{default_picker, PickerService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Extract,
    Info,
    Help,
}

struct ThumbData {
    path: String,
    size: [usize; 2],
    pixels: Vec<u8>,
}

pub struct RepkgApp {
    toolchain: Option<Toolchain>,
    /// Startup error: shown as a persistent banner, all controls hidden.
    fatal: Option<String>,
    /// Non-fatal startup warning (e.g. execute bit could not be set).
    startup_warning: Option<String>,
    picker: Box<dyn PickerService>,
    tab: Tab,
    session: SessionState,
    view: RunView,
    /// Validation warnings and picker errors for the current tab.
    status_line: Option<String>,
    rx: Option<Receiver<WorkerMsg>>,
    running: bool,
    /// Wallpaper folders with previews found under the extract input path.
    wallpapers: Vec<WallpaperEntry>,
    /// Input path the current `wallpapers` list was scanned from.
    wallpapers_scanned_for: String,
    /// Names of grid-selected wallpapers; when non-empty, Run extract
    /// processes the selection instead of the raw input path.
    selected: HashSet<String>,
    thumbs: HashMap<String, egui::TextureHandle>,
    thumb_rx: Receiver<ThumbData>,
    thumb_tx: mpsc::Sender<ThumbData>,
    thumb_inflight: HashSet<String>,
    pending_thumbs: Vec<ThumbData>,
}

impl RepkgApp {
    pub fn new() -> Self {
        let (toolchain, fatal) = match Toolchain::locate() {
            Ok(toolchain) => (Some(toolchain), None),
            Err(err) => (None, Some(err.to_string())),
        };
        let startup_warning = toolchain.as_ref().and_then(|t| t.ensure_executable());
        let default_output_dir = toolchain
            .as_ref()
            .map(|t| t.default_output_dir.display().to_string())
            .unwrap_or_default();
        let (thumb_tx, thumb_rx) = mpsc::channel();

        Self {
            toolchain,
            fatal,
            startup_warning,
            picker: default_picker(),
            tab: Tab::Extract,
            session: SessionState::new(default_output_dir),
            view: RunView::default(),
            status_line: None,
            rx: None,
            running: false,
            wallpapers: Vec::new(),
            wallpapers_scanned_for: String::new(),
            selected: HashSet::new(),
            thumbs: HashMap::new(),
            thumb_rx,
            thumb_tx,
            thumb_inflight: HashSet::new(),
            pending_thumbs: Vec::new(),
        }
    }

    fn pick_folder(&mut self, title: &str) -> Option<String> {
        match self.picker.select_folder(title) {
            Ok(Some(path)) => Some(path.display().to_string()),
            Ok(None) => None,
            Err(err) => {
                self.status_line = Some(format!("Folder dialog failed: {err}"));
                None
            }
        }
    }

    fn pick_file(&mut self, title: &str) -> Option<String> {
        match self.picker.select_file(title, &["pkg", "tex"]) {
            Ok(Some(path)) => Some(path.display().to_string()),
            Ok(None) => None,
            Err(err) => {
                self.status_line = Some(format!("File dialog failed: {err}"));
                None
            }
        }
    }

    /// Rescans the extract input path for wallpaper folders whenever the
    /// field changes. Partial or invalid paths yield an empty grid.
    fn refresh_wallpapers(&mut self) {
        if self.session.extract.input_path == self.wallpapers_scanned_for {
            return;
        }
        self.wallpapers_scanned_for = self.session.extract.input_path.clone();
        self.wallpapers = match validate_input(&self.wallpapers_scanned_for) {
            // Entries carry absolute paths so the worker's fixed working
            // directory cannot change what they refer to.
            Some(trimmed) => match absolutize(trimmed) {
                Ok(path) => scan_wallpapers(&path),
                Err(_) => Vec::new(),
            },
            None => Vec::new(),
        };
        self.selected.clear();
    }

    fn request_thumbnail(&mut self, path: &str) {
        if self.thumbs.contains_key(path) || self.thumb_inflight.contains(path) {
            return;
        }
        self.thumb_inflight.insert(path.to_string());
        let sender = self.thumb_tx.clone();
        let path_owned = path.to_string();

        thread::spawn(move || {
            let image = ImageReader::open(&path_owned).ok().and_then(|r| r.decode().ok());
            if let Some(image) = image {
                let thumb = image.thumbnail(220, 160);
                let size = [thumb.width() as usize, thumb.height() as usize];
                let pixels = thumb.to_rgba8().into_raw();
                let _ = sender.send(ThumbData {
                    path: path_owned,
                    size,
                    pixels,
                });
            } else {
                let _ = sender.send(ThumbData {
                    path: path_owned,
                    size: [0, 0],
                    pixels: Vec::new(),
                });
            }
        });
    }

    fn process_pending_thumbs(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.thumb_rx.try_recv() {
            self.thumb_inflight.remove(&msg.path);
            self.pending_thumbs.push(msg);
        }
        let pending = std::mem::take(&mut self.pending_thumbs);
        for msg in pending {
            if msg.size[0] == 0 || msg.size[1] == 0 {
                continue;
            }
            let color_image = egui::ColorImage::from_rgba_unmultiplied(msg.size, &msg.pixels);
            let texture = ctx.load_texture(&msg.path, color_image, egui::TextureOptions::default());
            self.thumbs.insert(msg.path, texture);
        }
    }

    fn reset_view(&mut self, args: &[String]) {
        let prefix = if cfg!(windows) { "" } else { "./" };
        self.view = RunView::default();
        self.view.command_line = format!("{prefix}{EXECUTABLE_NAME} {}", args.join(" "));
        self.status_line = None;
    }

    fn spawn_worker<F>(&mut self, job: F)
    where
        F: FnOnce(Sender<WorkerMsg>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.rx = Some(rx);
        self.running = true;
        thread::spawn(move || job(tx));
    }

    /// Runs one invocation on a worker thread, streaming lines back.
    fn start_single(&mut self, args: Vec<String>) {
        let Some(toolchain) = self.toolchain.clone() else {
            return;
        };
        self.reset_view(&args);
        self.spawn_worker(move |tx| {
            let result = run_streaming(
                &toolchain.executable,
                &toolchain.working_dir,
                &args,
                |line| {
                    let _ = tx.send(WorkerMsg::Line(line));
                },
            );
            let status = match result {
                Ok(0) => RunStatus::Success,
                Ok(code) => RunStatus::Failed(code),
                Err(err) => RunStatus::Error(err.to_string()),
            };
            let _ = tx.send(WorkerMsg::Finished(status));
        });
    }

    fn start_extract(&mut self) {
        let Some(raw_input) = validate_input(&self.session.extract.input_path) else {
            self.status_line = Some("Please provide an input path first.".to_string());
            return;
        };

        // Snapshot the option set and resolve every path to absolute form
        // now; the invocation must not observe later edits to the form.
        let input = match absolutize(raw_input) {
            Ok(path) => path,
            Err(err) => {
                self.status_line = Some(format!("Invalid input path: {err}"));
                return;
            }
        };
        let mut options = self.session.extract.options.clone();
        if !options.output_dir.is_empty() {
            match absolutize(&options.output_dir) {
                Ok(path) => options.output_dir = path.display().to_string(),
                Err(err) => {
                    self.status_line = Some(format!("Invalid output directory: {err}"));
                    return;
                }
            }
        }

        let base_args = options.to_args();

        let selection = self.selected_wallpapers();
        if !selection.is_empty() {
            self.start_selection(base_args, &options, selection);
        } else if self.session.extract.fault_tolerant && input.is_dir() {
            let Some(toolchain) = self.toolchain.clone() else {
                return;
            };
            let recursive = options.recursive;
            self.reset_view(&batch_echo_args(&base_args));
            self.spawn_worker(move |tx| {
                let targets = match collect_targets(&input, recursive) {
                    Ok(targets) => targets,
                    Err(err) => {
                        let _ = tx.send(WorkerMsg::Finished(RunStatus::Error(err.to_string())));
                        return;
                    }
                };
                if targets.is_empty() {
                    let _ = tx.send(WorkerMsg::Notice(
                        "No .pkg or .tex files found under the directory.".to_string(),
                    ));
                    return;
                }

                let _ = tx.send(WorkerMsg::BatchPlanned {
                    total: targets.len(),
                });
                let reports = run_batch(
                    &toolchain.executable,
                    &toolchain.working_dir,
                    &base_args,
                    &targets,
                    |index, total, path| {
                        let _ = tx.send(WorkerMsg::FileStarted {
                            index,
                            total,
                            path: path.display().to_string(),
                        });
                    },
                    |index, line| {
                        let _ = tx.send(WorkerMsg::FileLine { index, line });
                    },
                    |report| {
                        let status = match &report.outcome {
                            Ok(0) => RunStatus::Success,
                            Ok(code) => RunStatus::Failed(*code),
                            Err(err) => RunStatus::Error(err.to_string()),
                        };
                        let _ = tx.send(WorkerMsg::FileFinished {
                            index: report.index,
                            status,
                        });
                    },
                );
                let failed = reports.iter().filter(|r| !r.succeeded()).count();
                let _ = tx.send(WorkerMsg::BatchDone {
                    failed,
                    total: reports.len(),
                });
            });
        } else {
            self.start_single(with_input(base_args, &input));
        }
    }

    fn selected_wallpapers(&self) -> Vec<WallpaperEntry> {
        self.wallpapers
            .iter()
            .filter(|wp| self.selected.contains(&wp.name))
            .cloned()
            .collect()
    }

    /// Processes grid-selected wallpapers one after another: PKG-backed
    /// ones go through RePKG with the folder path appended, the rest get
    /// their image and video assets copied out directly.
    fn start_selection(
        &mut self,
        base_args: Vec<String>,
        options: &ExtractOptions,
        selection: Vec<WallpaperEntry>,
    ) {
        let Some(toolchain) = self.toolchain.clone() else {
            return;
        };
        let output_dir = options.output_dir.clone();
        let single_dir = options.single_dir;
        self.reset_view(&with_input(base_args.clone(), Path::new("<wallpaper>")));
        self.spawn_worker(move |tx| {
            let total = selection.len();
            let _ = tx.send(WorkerMsg::BatchPlanned { total });
            let mut failed = 0;
            for (index, wp) in selection.iter().enumerate() {
                let _ = tx.send(WorkerMsg::FileStarted {
                    index,
                    total,
                    path: wp.path.display().to_string(),
                });
                let status = if wp.has_pkg {
                    let args = with_input(base_args.clone(), &wp.path);
                    let result = run_streaming(
                        &toolchain.executable,
                        &toolchain.working_dir,
                        &args,
                        |line| {
                            let _ = tx.send(WorkerMsg::FileLine { index, line });
                        },
                    );
                    match result {
                        Ok(0) => RunStatus::Success,
                        Ok(code) => RunStatus::Failed(code),
                        Err(err) => RunStatus::Error(err.to_string()),
                    }
                } else {
                    let dest = asset_copy_dest(&output_dir, single_dir, wp);
                    match copy_assets(&wp.path, &dest) {
                        Ok(count) => {
                            let _ = tx.send(WorkerMsg::FileLine {
                                index,
                                line: format!(
                                    "No PKG found, copied {count} asset files to {}",
                                    dest.display()
                                ),
                            });
                            RunStatus::Success
                        }
                        Err(err) => RunStatus::Error(err.to_string()),
                    }
                };
                if status != RunStatus::Success {
                    failed += 1;
                }
                let _ = tx.send(WorkerMsg::FileFinished { index, status });
            }
            let _ = tx.send(WorkerMsg::BatchDone { failed, total });
        });
    }

    fn start_info(&mut self) {
        let Some(raw_input) = validate_input(&self.session.info.input_path) else {
            self.status_line = Some("Please provide an input path first.".to_string());
            return;
        };
        let input = match absolutize(raw_input) {
            Ok(path) => path,
            Err(err) => {
                self.status_line = Some(format!("Invalid input path: {err}"));
                return;
            }
        };
        let args = with_input(self.session.info.options.to_args(), &input);
        self.start_single(args);
    }

    fn start_help(&mut self) {
        let args = self.session.help_topic.to_args();
        self.start_single(args);
    }

    fn poll_messages(&mut self) {
        let Some(rx) = &self.rx else {
            return;
        };
        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok(WorkerMsg::Line(line)) => self.view.log.push(line),
                Ok(WorkerMsg::Finished(status)) => {
                    self.view.status = Some(status);
                    finished = true;
                }
                Ok(WorkerMsg::BatchPlanned { total }) => {
                    self.view.progress = Some((0, total));
                }
                Ok(WorkerMsg::FileStarted { path, .. }) => {
                    self.view.batch.push(BatchEntry {
                        path,
                        log: RunLog::default(),
                        status: None,
                    });
                }
                Ok(WorkerMsg::FileLine { index, line }) => {
                    if let Some(entry) = self.view.batch.get_mut(index) {
                        entry.log.push(line);
                    }
                }
                Ok(WorkerMsg::FileFinished { index, status }) => {
                    if let Some(entry) = self.view.batch.get_mut(index) {
                        entry.status = Some(status);
                    }
                    if let Some((_, total)) = self.view.progress {
                        self.view.progress = Some((index + 1, total));
                    }
                }
                Ok(WorkerMsg::BatchDone { failed, total }) => {
                    self.view.status = Some(if failed == 0 {
                        RunStatus::Success
                    } else {
                        RunStatus::Error(format!("{failed} of {total} files failed"))
                    });
                    finished = true;
                }
                Ok(WorkerMsg::Notice(notice)) => {
                    self.view.notice = Some(notice);
                    finished = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }
        if finished {
            self.running = false;
            self.rx = None;
        }
    }

    fn render_extract(&mut self, ui: &mut egui::Ui) {
        ui.heading("Extract");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("Input path");
            ui.add(
                egui::TextEdit::singleline(&mut self.session.extract.input_path)
                    .hint_text("PKG/TEX file, or a directory containing them")
                    .desired_width(420.0),
            );
            if ui.button("File…").clicked() {
                if let Some(path) = self.pick_file("Select a PKG or TEX file") {
                    self.session.extract.input_path = path;
                }
            }
            if ui.button("Folder…").clicked() {
                if let Some(path) = self.pick_folder("Select a directory with PKG/TEX files") {
                    self.session.extract.input_path = path;
                }
            }
        });

        self.refresh_wallpapers();
        self.render_wallpaper_grid(ui);

        ui.horizontal(|ui| {
            ui.label("Output dir (-o)");
            ui.add(
                egui::TextEdit::singleline(&mut self.session.extract.options.output_dir)
                    .desired_width(420.0),
            );
            if ui.button("Choose…").clicked() {
                if let Some(path) = self.pick_folder("Select the output directory") {
                    self.session.extract.options.output_dir = path;
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Ignore extensions (-i)");
            ui.add(
                egui::TextEdit::singleline(&mut self.session.extract.options.ignore_exts)
                    .hint_text("e.g. txt,log")
                    .desired_width(160.0),
            );
            ui.label("Only extensions (-e)");
            ui.add(
                egui::TextEdit::singleline(&mut self.session.extract.options.only_exts)
                    .hint_text("e.g. tex,json")
                    .desired_width(160.0),
            );
        });

        ui.checkbox(
            &mut self.session.extract.options.convert_tex,
            "Convert TEX to images (-t)",
        );
        ui.checkbox(
            &mut self.session.extract.options.no_tex_convert,
            "Don't convert TEX while extracting PKG (--no-tex-convert)",
        );
        ui.checkbox(
            &mut self.session.extract.options.overwrite,
            "Overwrite existing files (--overwrite)",
        );

        ui.collapsing("Advanced options", |ui| {
            ui.checkbox(
                &mut self.session.extract.options.debug_info,
                "Print debug info (-d)",
            );
            ui.checkbox(
                &mut self.session.extract.options.recursive,
                "Search directories recursively (-r)",
            );
            ui.checkbox(
                &mut self.session.extract.options.single_dir,
                "Extract into a single directory (-s)",
            );
            ui.checkbox(
                &mut self.session.extract.options.copy_project,
                "Copy project.json and preview (-c)",
            );
            ui.checkbox(
                &mut self.session.extract.options.use_project_name,
                "Use project name for subfolders (-n)",
            );
            ui.checkbox(
                &mut self.session.extract.fault_tolerant,
                "Fault-tolerant batch mode (process directory one file at a time)",
            );
        });

        ui.add_space(6.0);
        if ui
            .add_enabled(!self.running, egui::Button::new("Run extract"))
            .clicked()
        {
            self.start_extract();
        }
    }

    /// Thumbnail grid of the wallpaper folders found under the input path.
    /// Clicking toggles selection; a non-empty selection changes what Run
    /// extract operates on.
    fn render_wallpaper_grid(&mut self, ui: &mut egui::Ui) {
        if self.wallpapers.is_empty() {
            return;
        }
        let wallpapers = self.wallpapers.clone();
        let all_selected = self.selected.len() == wallpapers.len();

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("Wallpapers found: {}", wallpapers.len())).strong());
            if ui
                .button(if all_selected { "Clear selection" } else { "Select all" })
                .clicked()
            {
                if all_selected {
                    self.selected.clear();
                } else {
                    self.selected = wallpapers.iter().map(|wp| wp.name.clone()).collect();
                }
            }
            if !self.selected.is_empty() {
                ui.label(format!("{} selected", self.selected.len()));
            }
        });

        egui::ScrollArea::vertical()
            .id_source("wallpaper_grid")
            .max_height(280.0)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for wp in &wallpapers {
                        self.render_wallpaper_thumb(ui, wp);
                    }
                });
            });
    }

    fn render_wallpaper_thumb(&mut self, ui: &mut egui::Ui, wp: &WallpaperEntry) {
        let preview_key = wp.preview.display().to_string();
        let thumb_size = egui::vec2(110.0, 80.0);
        let is_selected = self.selected.contains(&wp.name);

        let response = ui.vertical(|ui| {
            ui.set_width(thumb_size.x + 8.0);
            let response = if let Some(texture) = self.thumbs.get(&preview_key) {
                ui.add(
                    egui::ImageButton::new(
                        egui::Image::new(texture).fit_to_exact_size(thumb_size),
                    )
                    .selected(is_selected),
                )
            } else {
                self.request_thumbnail(&preview_key);
                ui.add_sized(thumb_size, egui::Button::new("Loading…").selected(is_selected))
            };
            let label = if wp.has_pkg {
                wp.name.clone()
            } else {
                format!("{} (no PKG)", wp.name)
            };
            ui.label(RichText::new(label).small());
            response
        });

        let response = response.inner.on_hover_text(wp.path.display().to_string());
        if response.clicked() {
            if is_selected {
                self.selected.remove(&wp.name);
            } else {
                self.selected.insert(wp.name.clone());
            }
        }
    }

    fn render_info(&mut self, ui: &mut egui::Ui) {
        ui.heading("Info");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("Input path");
            ui.add(
                egui::TextEdit::singleline(&mut self.session.info.input_path)
                    .hint_text("PKG/TEX file, or a directory containing them")
                    .desired_width(420.0),
            );
            if ui.button("File…").clicked() {
                if let Some(path) = self.pick_file("Select a PKG or TEX file") {
                    self.session.info.input_path = path;
                }
            }
            if ui.button("Folder…").clicked() {
                if let Some(path) = self.pick_folder("Select a directory with PKG/TEX files") {
                    self.session.info.input_path = path;
                }
            }
        });

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.session.info.options.sort_enabled, "Sort (-s)");
            let sort_by = &mut self.session.info.options.sort_by;
            egui::ComboBox::from_label("Sort by (-b)")
                .selected_text(sort_by.as_str())
                .show_ui(ui, |ui| {
                    ui.selectable_value(sort_by, SortKey::Name, "name");
                    ui.selectable_value(sort_by, SortKey::Extension, "extension");
                    ui.selectable_value(sort_by, SortKey::Size, "size");
                });
        });

        ui.checkbox(
            &mut self.session.info.options.print_entries,
            "List package entries (-e)",
        );
        ui.checkbox(
            &mut self.session.info.options.tex_info,
            "Show TEX details (-t)",
        );

        ui.horizontal(|ui| {
            ui.label("Project info fields (-p)");
            ui.add(
                egui::TextEdit::singleline(&mut self.session.info.options.project_info)
                    .hint_text("e.g. *, title, description")
                    .desired_width(200.0),
            );
            ui.label("Title filter (--title-filter)");
            ui.add(
                egui::TextEdit::singleline(&mut self.session.info.options.title_filter)
                    .desired_width(160.0),
            );
        });

        ui.add_space(6.0);
        if ui
            .add_enabled(!self.running, egui::Button::new("Get info"))
            .clicked()
        {
            self.start_info();
        }
    }

    fn render_help(&mut self, ui: &mut egui::Ui) {
        ui.heading("Help");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.session.help_topic, HelpTopic::General, "General");
            ui.radio_value(&mut self.session.help_topic, HelpTopic::Extract, "Extract");
            ui.radio_value(&mut self.session.help_topic, HelpTopic::Info, "Info");
        });

        ui.add_space(6.0);
        if ui
            .add_enabled(!self.running, egui::Button::new("Show help"))
            .clicked()
        {
            self.start_help();
        }
    }

    fn render_status(&self, ui: &mut egui::Ui, status: &RunStatus) {
        match status {
            RunStatus::Success => {
                ui.label(RichText::new("✅ Command succeeded").color(Color32::from_rgb(80, 200, 120)));
            }
            RunStatus::Failed(code) => {
                ui.label(
                    RichText::new(format!("❌ Command failed with exit code {code}"))
                        .color(Color32::from_rgb(230, 90, 90)),
                );
            }
            RunStatus::Error(message) => {
                ui.label(
                    RichText::new(format!("❌ {message}")).color(Color32::from_rgb(230, 90, 90)),
                );
            }
        }
    }

    fn render_run_view(&mut self, ui: &mut egui::Ui) {
        if self.view.command_line.is_empty() {
            return;
        }

        ui.separator();
        ui.label(RichText::new("Command").strong());
        ui.code(&self.view.command_line);

        if let Some(notice) = &self.view.notice {
            ui.label(RichText::new(notice).color(Color32::from_rgb(246, 196, 69)));
        }

        if let Some((done, total)) = self.view.progress {
            ui.add(
                egui::ProgressBar::new(done as f32 / total.max(1) as f32)
                    .text(format!("{done}/{total}")),
            );
        }

        if !self.view.batch.is_empty() {
            let total = self
                .view
                .progress
                .map(|(_, total)| total)
                .unwrap_or(self.view.batch.len());
            for (index, entry) in self.view.batch.iter().enumerate() {
                ui.group(|ui| {
                    ui.label(RichText::new(format!("({}/{total}) {}", index + 1, entry.path)).strong());
                    egui::ScrollArea::vertical()
                        .id_source(format!("batch_log_{index}"))
                        .max_height(140.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            ui.monospace(entry.log.visible());
                        });
                    if let Some(status) = &entry.status {
                        self.render_status(ui, status);
                    }
                });
            }
        } else if !self.view.log.is_empty() {
            ui.label(RichText::new("Output log").strong());
            egui::ScrollArea::vertical()
                .id_source("run_log")
                .max_height(320.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.monospace(self.view.log.visible());
                });
        }

        if self.running {
            ui.label(RichText::new("Running…").color(Color32::from_gray(170)));
        } else if let Some(status) = self.view.status.clone() {
            self.render_status(ui, &status);
        }
    }
}

/// Batch mode runs RePKG once per file with -r stripped and the file path
/// appended, so the echoed command shows that shape with a placeholder.
fn batch_echo_args(base_args: &[String]) -> Vec<String> {
    with_input(strip_recursive(base_args), Path::new("<file>"))
}

/// Where a non-PKG wallpaper's assets land, mirroring the -o / -s flags:
/// a per-wallpaper subfolder of the output dir, the output dir itself when
/// single-dir is set, or an `extracted` folder next to the wallpaper.
fn asset_copy_dest(output_dir: &str, single_dir: bool, wp: &WallpaperEntry) -> PathBuf {
    if output_dir.is_empty() {
        wp.path.join("extracted")
    } else if single_dir {
        PathBuf::from(output_dir)
    } else {
        Path::new(output_dir).join(&wp.name)
    }
}

impl eframe::App for RepkgApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.running || !self.thumb_inflight.is_empty() || !self.pending_thumbs.is_empty() {
            ctx.request_repaint();
        }
        self.poll_messages();
        self.process_pending_thumbs(ctx);

        if let Some(fatal) = &self.fatal {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("RePKG GUI");
                ui.add_space(8.0);
                ui.label(
                    RichText::new(format!("⚠ {fatal}"))
                        .color(Color32::from_rgb(230, 90, 90))
                        .size(16.0),
                );
                ui.label("Place the RePKG executable under resources/ and restart.");
            });
            return;
        }

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("📦 RePKG GUI");
                ui.separator();
                ui.selectable_value(&mut self.tab, Tab::Extract, "Extract");
                ui.selectable_value(&mut self.tab, Tab::Info, "Info");
                ui.selectable_value(&mut self.tab, Tab::Help, "Help");
            });
            if let Some(warning) = &self.startup_warning {
                ui.label(RichText::new(warning).color(Color32::from_rgb(246, 196, 69)));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                match self.tab {
                    Tab::Extract => self.render_extract(ui),
                    Tab::Info => self.render_info(ui),
                    Tab::Help => self.render_help(ui),
                }

                if let Some(status_line) = &self.status_line {
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(format!("⚠ {status_line}"))
                            .color(Color32::from_rgb(246, 196, 69)),
                    );
                }

                self.render_run_view(ui);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_echo_matches_per_file_invocation_shape() {
        let base_args: Vec<String> = ["extract", "-o", "/out", "-t", "-r", "-c"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let echoed = batch_echo_args(&base_args);
        // run_batch also drops -r and puts the file path last
        assert!(!echoed.contains(&"-r".to_string()));
        assert_eq!(
            echoed,
            vec!["extract", "-o", "/out", "-t", "-c", "<file>"]
        );
    }

    #[test]
    fn test_asset_copy_dest_mirrors_output_flags() {
        let wp = WallpaperEntry {
            name: "123456".to_string(),
            path: PathBuf::from("/workshop/123456"),
            preview: PathBuf::from("/workshop/123456/preview.jpg"),
            has_pkg: false,
        };
        assert_eq!(
            asset_copy_dest("/out", false, &wp),
            PathBuf::from("/out/123456")
        );
        assert_eq!(asset_copy_dest("/out", true, &wp), PathBuf::from("/out"));
        assert_eq!(
            asset_copy_dest("", false, &wp),
            PathBuf::from("/workshop/123456/extracted")
        );
    }
}
