mod worker;

use std::time::{Duration, Instant};

use codegenius_catalog::{CATALOG, DEFAULT_CODE_PLACEHOLDER, SUGGESTIONS};
use codegenius_controller::AppController;
use codegenius_generation::{CodeGenerator, GeminiService};
use codegenius_preview::{OutputTab, RunTicket};
use codegenius_settings::{default_preferences_path, Preferences, PreferencesStore};
use eframe::{egui, App, Frame, NativeOptions};
use egui::{Align, Color32, Layout, RichText, TextEdit};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::worker::GenerationWorker;

const APP_TITLE: &str = "CodeGenius";
const ERROR_COLOR: Color32 = Color32::from_rgb(239, 68, 68);
const MUTED_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

struct CodeGeniusApp {
    controller: AppController,
    worker: Option<GenerationWorker<GeminiService>>,
    /// Problem found while wiring up the generation client.
    setup_warning: Option<String>,
    run_ticket: Option<RunTicket>,
    copied_at: Option<Instant>,
}

impl CodeGeniusApp {
    fn new(preferences: &Preferences) -> Self {
        let controller = AppController::new(
            preferences.preview.default_language,
            preferences.preview.settle_delay(),
        );
        let generation = &preferences.generation;
        let (worker, setup_warning) =
            match GeminiService::from_env(generation.endpoint.clone(), &generation.api_key_vars())
            {
                Ok(service) => {
                    let worker =
                        GenerationWorker::new(CodeGenerator::new(service, generation.model.clone()));
                    let warning = (!worker.generator().service().has_api_key()).then(|| {
                        format!(
                            "No API key found. Set {} before generating.",
                            generation.api_key_vars().join(" or ")
                        )
                    });
                    (Some(worker), warning)
                }
                Err(err) => {
                    error!("failed to create generation client: {err}");
                    (None, Some(err.to_string()))
                }
            };
        Self {
            controller,
            worker,
            setup_warning,
            run_ticket: None,
            copied_at: None,
        }
    }

    fn start_generation(&mut self, ctx: &egui::Context) {
        let Some(worker) = self.worker.as_ref() else {
            return;
        };
        match self.controller.request_generation() {
            Ok(request) => {
                let ctx = ctx.clone();
                worker.spawn(request, move || ctx.request_repaint());
            }
            Err(err) => warn!("generation not started: {err}"),
        }
    }

    fn start_run(&mut self) {
        match self.controller.request_run() {
            Ok(ticket) => self.run_ticket = Some(ticket),
            Err(err) => warn!("run not started: {err}"),
        }
    }

    /// Drains finished work and schedules the next repaint while anything is pending.
    fn poll_background(&mut self, ctx: &egui::Context) {
        if let Some(worker) = self.worker.as_ref() {
            while let Some((id, outcome)) = worker.poll() {
                self.controller.finish_generation(id, outcome);
            }
        }

        if let Some(ticket) = self.run_ticket {
            let now = Instant::now();
            if ticket.is_ready(now) {
                self.run_ticket = None;
                if let Err(err) = self.controller.complete_run(ticket) {
                    // a language switch superseded the run
                    info!("run dropped: {err}");
                }
            } else {
                ctx.request_repaint_after(ticket.remaining(now));
            }
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .resizable(false)
            .exact_height(40.0)
            .show(ctx, |ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    ui.label(RichText::new(APP_TITLE).strong().size(18.0));
                    ui.separator();

                    let current = self.controller.state().language;
                    let mut selected = current;
                    egui::ComboBox::from_id_source("language_selector")
                        .selected_text(selected.display_name())
                        .show_ui(ui, |ui| {
                            for info in CATALOG.iter() {
                                let label =
                                    format!("{}  ·  {}", info.display_name, info.icon.as_str());
                                ui.selectable_value(&mut selected, info.id, label);
                            }
                        });
                    if selected != current {
                        self.run_ticket = None;
                        self.controller.select_language(selected);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let state = self.controller.state();
                        if state.generating {
                            ui.spinner();
                        }
                        ui.label(RichText::new(state.status_label()).color(MUTED_COLOR));
                        if let Some(worker) = self.worker.as_ref() {
                            ui.separator();
                            ui.label(
                                RichText::new(worker.generator().model())
                                    .small()
                                    .color(MUTED_COLOR),
                            );
                        }
                    });
                });
            });
    }

    fn show_prompt_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("prompt_panel")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("Describe your code");
                ui.add_space(4.0);

                let mut prompt = self.controller.state().prompt.clone();
                let placeholder = self.controller.state().prompt_placeholder();
                let response = ui.add(
                    TextEdit::multiline(&mut prompt)
                        .hint_text(placeholder)
                        .desired_rows(6)
                        .desired_width(f32::INFINITY),
                );
                if response.changed() {
                    self.controller.set_prompt(prompt);
                }

                ui.add_space(6.0);
                ui.label(RichText::new("Try one of these").small().color(MUTED_COLOR));
                for (idx, suggestion) in SUGGESTIONS.iter().enumerate() {
                    if ui.small_button(*suggestion).clicked() {
                        self.controller.apply_suggestion(idx);
                    }
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let can_generate = self.worker.is_some() && self.controller.can_generate();
                    let label = if self.controller.state().generating {
                        "Generating..."
                    } else {
                        "Generate"
                    };
                    if ui
                        .add_enabled(can_generate, egui::Button::new(label))
                        .clicked()
                    {
                        self.start_generation(ctx);
                    }
                    let can_reset = !self.controller.state().generating;
                    if ui
                        .add_enabled(can_reset, egui::Button::new("Reset"))
                        .clicked()
                    {
                        self.controller.reset();
                    }
                });

                if let Some(message) = self.controller.state().error.as_deref() {
                    ui.add_space(6.0);
                    ui.colored_label(ERROR_COLOR, message);
                }
                if let Some(warning) = self.setup_warning.as_deref() {
                    ui.add_space(6.0);
                    ui.colored_label(ERROR_COLOR, warning);
                }
            });
    }

    fn show_output_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("output_panel")
            .resizable(true)
            .min_height(180.0)
            .default_height(280.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let active = self.controller.preview().active_tab();
                    for tab in [OutputTab::Output, OutputTab::Console] {
                        if ui
                            .selectable_label(active == tab, RichText::new(tab.label()).strong())
                            .clicked()
                        {
                            self.controller.preview_mut().select_tab(tab);
                        }
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let running = self.controller.preview().is_running();
                        let label = if running { "Running..." } else { "Run" };
                        if ui
                            .add_enabled(self.controller.can_run(), egui::Button::new(label))
                            .clicked()
                        {
                            self.start_run();
                        }
                    });
                });
                ui.separator();

                match self.controller.preview().active_tab() {
                    OutputTab::Output => self.render_output_tab(ui),
                    OutputTab::Console => self.render_console_tab(ui),
                }
            });
    }

    fn render_output_tab(&self, ui: &mut egui::Ui) {
        let preview = self.controller.preview();
        let language = preview.language();
        if preview.is_running() {
            ui.label(RichText::new("Preparing preview...").italics());
            return;
        }
        let Some(session) = preview.session() else {
            ui.label(RichText::new("Run the code to see a preview.").color(MUTED_COLOR));
            return;
        };
        if !session.language().is_web_renderable() {
            ui.label(format!(
                "Live preview is available for HTML, CSS and JavaScript. {} output is on the Console tab.",
                language
            ));
            return;
        }

        if let Some(tag) = preview.surface_tag() {
            ui.label(RichText::new(tag).monospace().small().color(MUTED_COLOR));
        }
        egui::ScrollArea::vertical()
            .id_source("document_source")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let mut source = preview.document_source().unwrap_or_default();
                ui.add(
                    TextEdit::multiline(&mut source)
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
    }

    fn render_console_tab(&self, ui: &mut egui::Ui) {
        let console = self.controller.preview().console();
        egui::ScrollArea::vertical()
            .id_source("console_lines")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if console.is_empty() {
                    ui.label(RichText::new("No console output.").color(MUTED_COLOR));
                }
                for line in console {
                    let text = RichText::new(line.text()).monospace();
                    if line.is_error() {
                        ui.label(text.color(ERROR_COLOR));
                    } else {
                        ui.label(text);
                    }
                }
            });
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                let language = self.controller.state().language;
                ui.label(RichText::new(format!("main.{}", language.info().extension)).strong());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let copied = self
                        .copied_at
                        .is_some_and(|at| at.elapsed() < COPIED_FEEDBACK);
                    let label = if copied { "Copied!" } else { "Copy" };
                    let has_code = !self.controller.state().code.is_empty();
                    if ui.add_enabled(has_code, egui::Button::new(label)).clicked() {
                        let code = self.controller.state().code.clone();
                        ui.output_mut(|output| output.copied_text = code);
                        self.copied_at = Some(Instant::now());
                        ctx.request_repaint_after(COPIED_FEEDBACK);
                    }
                });
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .id_source("code_editor")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let mut code = self.controller.state().code.clone();
                    let response = ui.add(
                        TextEdit::multiline(&mut code)
                            .code_editor()
                            .hint_text(DEFAULT_CODE_PLACEHOLDER)
                            .desired_rows(24)
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        self.controller.edit_code(code);
                    }
                });
        });
    }
}

impl App for CodeGeniusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_background(ctx);

        self.show_header(ctx);
        self.show_prompt_panel(ctx);
        self.show_output_panel(ctx);
        self.show_editor(ctx);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_preferences() -> Preferences {
    let path = default_preferences_path();
    match PreferencesStore::load(&path) {
        Ok(store) => store.preferences().clone(),
        Err(err) => {
            warn!("{err}; using default preferences");
            Preferences::default()
        }
    }
}

fn main() -> eframe::Result<()> {
    init_logging();
    let preferences = load_preferences();
    info!(
        language = %preferences.preview.default_language,
        model = %preferences.generation.model,
        "starting"
    );
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Box::new(CodeGeniusApp::new(&preferences))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegenius_catalog::LanguageId;

    #[test]
    fn app_starts_from_preferred_language() {
        let mut preferences = Preferences::default();
        preferences.preview.default_language = LanguageId::Python;
        preferences.preview.settle_delay_ms = 0;

        let app = CodeGeniusApp::new(&preferences);
        assert_eq!(app.controller.state().language, LanguageId::Python);
        assert_eq!(app.controller.preview().active_tab(), OutputTab::Console);
        assert!(app.run_ticket.is_none());
    }

    #[test]
    fn worker_uses_configured_model() {
        let mut preferences = Preferences::default();
        preferences.generation.model = "gemini-2.5-flash".to_string();
        let app = CodeGeniusApp::new(&preferences);
        let worker = app.worker.as_ref().expect("client builds offline");
        assert_eq!(worker.generator().model(), "gemini-2.5-flash");
        assert_eq!(
            app.setup_warning.is_some(),
            !worker.generator().service().has_api_key()
        );
    }

    #[test]
    fn zero_delay_run_completes_on_next_poll() {
        let mut preferences = Preferences::default();
        preferences.preview.settle_delay_ms = 0;
        let mut app = CodeGeniusApp::new(&preferences);
        app.controller.edit_code("<p>hi</p>");
        app.start_run();
        assert!(app.controller.preview().is_running());

        let ctx = egui::Context::default();
        app.poll_background(&ctx);
        assert!(app.run_ticket.is_none());
        assert!(!app.controller.preview().is_running());
        assert!(app
            .controller
            .preview()
            .document_source()
            .is_some_and(|doc| doc.contains("<p>hi</p>")));
    }
}
