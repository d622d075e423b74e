use maplabel::prelude::*;
use maplabel::session::PendingRequest;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    maplabel::init_logging();

    let config = ClientConfig::from_env()?;
    log::info!("using map service at {}", config.base_url);
    let service = Arc::new(HttpLabelService::new(config.clone())?);
    let tasks = TaskRuntime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_title("maplabel - route poster labels"),
        ..Default::default()
    };

    eframe::run_native(
        "maplabel-app",
        options,
        Box::new(move |_cc| Box::new(PosterApp::new(config, service, tasks))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))?;

    Ok(())
}

type Reply = maplabel::Result<MapReply>;

/// Work running on the task runtime
enum InFlight {
    Generate(PendingRequest<GenerateRequest>, TaskHandle<Reply>),
    Apply(PendingRequest<ApplyLabelsRequest>, TaskHandle<Reply>),
    Image(String, TaskHandle<maplabel::Result<Vec<u8>>>),
    Download(TaskHandle<maplabel::Result<PathBuf>>),
}

enum Status {
    Idle,
    Info(String),
    Warning(String),
    Error(String),
}

struct PosterApp {
    editor: LabelEditor<LabelOverlayWidget>,
    service: Arc<HttpLabelService>,
    tasks: TaskRuntime,
    in_flight: Vec<InFlight>,
    route: String,
    title: String,
    paper: PaperFormat,
    download_dir: PathBuf,
    status: Status,
}

impl PosterApp {
    fn new(config: ClientConfig, service: Arc<HttpLabelService>, tasks: TaskRuntime) -> Self {
        let session = MapSession::new().with_download_filename(config.download_filename.clone());
        Self {
            editor: LabelEditor::with_tolerance(session, LabelOverlayWidget::new(), config.snap_tolerance),
            service,
            tasks,
            in_flight: Vec::new(),
            route: String::new(),
            title: String::new(),
            paper: PaperFormat::Poster50x70,
            download_dir: PathBuf::from("."),
            status: Status::Idle,
        }
    }

    fn report(&mut self, err: MapLabelError) {
        self.status = if err.is_warning() {
            Status::Warning(err.user_message())
        } else {
            Status::Error(err.user_message())
        };
    }

    fn generate(&mut self) {
        let mut request = GenerateRequest::new(self.route.clone()).with_paper(self.paper, None);
        if !self.title.trim().is_empty() {
            request = request.with_title(self.title.trim());
        }
        match self.editor.session_mut().begin_generate(request) {
            Ok(pending) => {
                let service = Arc::clone(&self.service);
                let request = pending.request.clone();
                let handle = self
                    .tasks
                    .spawn_task(async move { service.generate(&request).await });
                self.in_flight.push(InFlight::Generate(pending, handle));
                self.status = Status::Info("Generating map...".to_string());
            }
            Err(err) => self.report(err),
        }
    }

    fn apply(&mut self, finalize: bool) {
        match self.editor.session_mut().begin_apply(finalize) {
            Ok(pending) => {
                let service = Arc::clone(&self.service);
                let request = pending.request.clone();
                let handle = self
                    .tasks
                    .spawn_task(async move { service.apply_labels(&request).await });
                self.in_flight.push(InFlight::Apply(pending, handle));
                self.status = Status::Info(if finalize {
                    "Rendering final poster...".to_string()
                } else {
                    "Applying label changes...".to_string()
                });
            }
            Err(err) => self.report(err),
        }
    }

    fn fetch_image(&mut self, map_url: String) {
        let service = Arc::clone(&self.service);
        let url = map_url.clone();
        let handle = self
            .tasks
            .spawn_task(async move { service.fetch_raster(&url).await });
        self.in_flight.push(InFlight::Image(map_url, handle));
    }

    fn download(&mut self, artifact: MapArtifact) {
        let controller = SyncController::from_shared(Arc::clone(&self.service));
        let dir = self.download_dir.clone();
        let handle = self
            .tasks
            .spawn_task(async move { controller.download(&artifact, dir).await });
        self.in_flight.push(InFlight::Download(handle));
    }

    /// Feeds finished tasks back into the session.
    fn poll_tasks(&mut self, ctx: &egui::Context) {
        let mut still_running = Vec::new();
        for task in std::mem::take(&mut self.in_flight) {
            match task {
                InFlight::Generate(pending, mut handle) => match handle.poll() {
                    Some(result) => {
                        let outcome = self.editor.session_mut().complete_generate(pending, result);
                        self.on_outcome(outcome);
                    }
                    None if handle.is_done() => {}
                    None => still_running.push(InFlight::Generate(pending, handle)),
                },
                InFlight::Apply(pending, mut handle) => match handle.poll() {
                    Some(result) => {
                        let outcome = self.editor.session_mut().complete_apply(pending, result);
                        self.on_outcome(outcome);
                    }
                    None if handle.is_done() => {}
                    None => still_running.push(InFlight::Apply(pending, handle)),
                },
                InFlight::Image(map_url, mut handle) => match handle.poll() {
                    Some(result) => self.on_image(ctx, &map_url, result),
                    None if handle.is_done() => {}
                    None => still_running.push(InFlight::Image(map_url, handle)),
                },
                InFlight::Download(mut handle) => match handle.poll() {
                    Some(Ok(path)) => self.status = Status::Info(format!("Saved {}", path.display())),
                    Some(Err(err)) => self.report(err),
                    None if handle.is_done() => {}
                    None => still_running.push(InFlight::Download(handle)),
                },
            }
        }
        // Tasks queued while handling results
        still_running.append(&mut self.in_flight);
        self.in_flight = still_running;
    }

    fn on_outcome(&mut self, outcome: maplabel::Result<SyncOutcome>) {
        match outcome {
            Ok(SyncOutcome::Generated) | Ok(SyncOutcome::Applied) => {
                self.editor.cancel_drag();
                let session = self.editor.session();
                let map_url = session.snapshot().map(|snapshot| snapshot.map_url.clone());
                self.status = match session.warnings().first() {
                    Some(warning) => Status::Warning(warning.clone()),
                    None => Status::Idle,
                };
                self.editor.render();
                if let Some(map_url) = map_url {
                    self.fetch_image(map_url);
                }
            }
            Ok(SyncOutcome::Finalized(artifact)) => {
                self.status = Status::Info("Final poster ready, downloading...".to_string());
                self.download(artifact);
            }
            Ok(SyncOutcome::Stale) => {}
            Err(err) => self.report(err),
        }
    }

    fn on_image(&mut self, ctx: &egui::Context, map_url: &str, result: maplabel::Result<Vec<u8>>) {
        let current = self.editor.session().snapshot().map(|snapshot| snapshot.map_url.as_str());
        if current != Some(map_url) {
            log::debug!("ignoring image for superseded map {map_url}");
            return;
        }
        match result.and_then(|bytes| RasterImage::decode(&bytes)) {
            Ok(raster) => self.editor.surface_mut().set_image(ctx, map_url, &raster),
            Err(err) => self.report(err),
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Route");
        ui.add(
            egui::TextEdit::multiline(&mut self.route)
                .hint_text("One city per line, or separated by commas")
                .desired_rows(6),
        );
        ui.horizontal(|ui| {
            ui.label("Title");
            ui.text_edit_singleline(&mut self.title);
        });
        egui::ComboBox::from_label("Paper")
            .selected_text(format!("{:?}", self.paper))
            .show_ui(ui, |ui| {
                for format in [
                    PaperFormat::Postcard,
                    PaperFormat::Poster50x70,
                    PaperFormat::Poster70x50,
                    PaperFormat::Poster60x100,
                    PaperFormat::Poster100x60,
                ] {
                    ui.selectable_value(&mut self.paper, format, format!("{format:?}"));
                }
            });

        let busy = self.editor.session().is_busy();
        if ui.add_enabled(!busy, egui::Button::new("Generate")).clicked() {
            self.generate();
        }

        ui.separator();
        ui.heading("Labels");
        let session = self.editor.session();
        ui.label(format!(
            "{} labels, {} moved, {} hidden",
            session.labels().len(),
            session.labels().override_count(),
            session.labels().hidden_names().len()
        ));
        let finalizing = session.is_finalizing();
        if ui.add_enabled(!busy, egui::Button::new("Apply labels")).clicked() {
            self.apply(false);
        }
        if ui.add_enabled(!finalizing, egui::Button::new("Download poster")).clicked() {
            self.apply(true);
        }
        if let Some(artifact) = self.editor.session().latest_download().cloned() {
            if ui.button(format!("Save {}", artifact.filename)).clicked() {
                self.download(artifact);
            }
        }

        ui.separator();
        if busy || finalizing {
            ui.spinner();
        }
        match &self.status {
            Status::Idle => {}
            Status::Info(text) => {
                ui.label(text);
            }
            Status::Warning(text) => {
                ui.colored_label(egui::Color32::from_rgb(220, 160, 0), text);
            }
            Status::Error(text) => {
                ui.colored_label(egui::Color32::from_rgb(210, 50, 50), text);
            }
        }
    }
}

impl eframe::App for PosterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_tasks(ctx);

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let events = self.editor.surface_mut().show(ui);
                for event in events {
                    self.editor.handle_event(event);
                }
            });
        });

        if !self.in_flight.is_empty() || self.editor.is_dragging() {
            ctx.request_repaint();
        }
    }
}
