// src/gui.rs
use anyhow::Result;
use eframe::egui;
use egui::{Color32, RichText, ScrollArea, Ui};
use log::{error, info};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

#[cfg(feature = "clipboard")]
use arboard::Clipboard;

use crate::config::Settings;
#[cfg(feature = "clipboard")]
use crate::error::AppError;
use crate::render::export::{write_export, EXPORT_FILE_NAME};
use crate::render::plan::{Block, RenderPlan};
use crate::render::text::TEXT_HEADING;
use crate::session::{Phase, Session};
use crate::transport::connector::ImageProcessor;
use crate::upload::image::{UploadedImage, ACCEPTED_EXTENSIONS};

const WINDOW_WIDTH: f32 = 1100.0;
const WINDOW_HEIGHT: f32 = 820.0;
const PREVIEW_MAX_HEIGHT: f32 = 360.0;
const TEXT_AREA_HEIGHT: f32 = 300.0;

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 50, 50);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(0, 180, 0);
const ACCENT_COLOR: Color32 = Color32::from_rgb(42, 90, 170);

/// Things the user asked for during a frame, applied once drawing is done
enum Action {
    PickImage,
    Submit,
    Download,
    #[cfg_attr(not(feature = "clipboard"), allow(dead_code))]
    CopyJson,
    Reset,
}

struct Preview {
    texture: egui::TextureHandle,
    width: u32,
    height: u32,
}

pub struct TaskShotApp {
    settings: Settings,
    processor: Arc<dyn ImageProcessor>,
    session: Arc<Mutex<Session>>,
    preview: Option<Preview>,
    notice: Option<String>,
    was_style_initialized: bool,
}

impl TaskShotApp {
    pub fn new(settings: Settings, processor: Arc<dyn ImageProcessor>) -> Self {
        Self {
            settings,
            processor,
            session: Arc::new(Mutex::new(Session::new())),
            preview: None,
            notice: None,
            was_style_initialized: false,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        lock_session(&self.session)
    }

    fn init_style(&mut self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        style.visuals.widgets.inactive.rounding = egui::Rounding::same(6.0);
        style.visuals.widgets.hovered.rounding = egui::Rounding::same(6.0);
        style.visuals.widgets.active.rounding = egui::Rounding::same(6.0);
        style.visuals.selection.bg_fill = ACCENT_COLOR;
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(15.0, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(24.0, egui::FontFamily::Proportional),
        );
        ctx.set_style(style);
        self.was_style_initialized = true;
    }

    fn draw_header(&self, ui: &mut Ui) {
        ui.heading("📋 Image Task Uploader");
        ui.label("Upload images containing tasks and have them processed automatically.");
        ui.separator();
    }

    fn draw_upload_section(&self, ui: &mut Ui, actions: &mut Vec<Action>) {
        let (phase, captions, last_error) = {
            let session = self.session();
            let captions = session.image().map(|image| {
                let dims = self.preview.as_ref().map(|p| (p.width, p.height));
                image.captions(dims)
            });
            (session.phase(), captions, session.last_error().cloned())
        };
        let submitting = phase == Phase::Submitting;

        ui.label(RichText::new("📤 Upload image").size(18.0));
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!submitting, egui::Button::new("📁 Choose an image (PNG, JPG, JPEG)"))
                .clicked()
            {
                actions.push(Action::PickImage);
            }
        });
        ui.add_space(8.0);

        let Some(captions) = captions else {
            if let Some(err) = &last_error {
                ui.colored_label(ERROR_COLOR, format!("❌ {}", err));
            }
            return;
        };

        ui.columns(2, |columns| {
            let left = &mut columns[0];
            left.label(RichText::new("🖼️ Image preview").size(18.0));
            if let Some(preview) = &self.preview {
                let size = preview.texture.size_vec2();
                let mut width = left.available_width().min(size.x);
                let mut height = if size.x > 0.0 { width * size.y / size.x } else { width };
                if height > PREVIEW_MAX_HEIGHT {
                    width *= PREVIEW_MAX_HEIGHT / height;
                    height = PREVIEW_MAX_HEIGHT;
                }
                left.image((preview.texture.id(), egui::vec2(width, height)));
            }
            for caption in &captions {
                left.label(RichText::new(caption).small().color(Color32::GRAY));
            }

            let right = &mut columns[1];
            right.label(RichText::new("⚙️ Processing").size(18.0));
            if submitting {
                right.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Processing image...");
                });
            } else if right
                .add(
                    egui::Button::new(RichText::new("🚀 Process image").color(Color32::WHITE))
                        .fill(ACCENT_COLOR)
                        .min_size(egui::vec2(right.available_width(), 32.0)),
                )
                .clicked()
            {
                actions.push(Action::Submit);
            }

            right.add_space(6.0);
            match (&phase, &last_error) {
                (_, Some(err)) => {
                    right.colored_label(ERROR_COLOR, format!("❌ {}", err));
                    if err.is_transport() {
                        right.label(RichText::new("The image is still selected, you can try again.").small());
                    }
                }
                (Phase::ResultAvailable, None) => {
                    right.colored_label(SUCCESS_COLOR, "✅ Image processed successfully!");
                }
                _ => {}
            }
        });
    }

    fn draw_result_section(&self, ui: &mut Ui, actions: &mut Vec<Action>) {
        let session = self.session();
        let Some(result) = session.result() else {
            return;
        };

        ui.separator();
        ui.label(RichText::new("📊 Processed tasks").size(20.0));
        ui.label(
            RichText::new(format!("Received at {}", result.received_at.format("%H:%M:%S")))
                .small()
                .color(Color32::GRAY),
        );
        ui.add_space(6.0);

        draw_plan(ui, &result.plan);

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("💾 Download result as JSON").clicked() {
                actions.push(Action::Download);
            }
            #[cfg(feature = "clipboard")]
            {
                if ui.button("📋 Copy JSON").clicked() {
                    actions.push(Action::CopyJson);
                }
            }
            if ui.button("🔄 Upload new image").clicked() {
                actions.push(Action::Reset);
            }
        });
        if let Some(notice) = &self.notice {
            ui.label(RichText::new(notice).small().color(SUCCESS_COLOR));
        }
    }

    fn draw_help(&self, ui: &mut Ui) {
        ui.separator();
        egui::CollapsingHeader::new("ℹ️ Instructions & help").show(ui, |ui| {
            ui.label(RichText::new("How to use this app:").strong());
            ui.label("1. Select an image with the file picker");
            ui.label("2. Check the image preview on the left");
            ui.label("3. Click \"Process image\"");
            ui.label("4. The extracted tasks are shown below, ready to download");
            ui.add_space(6.0);
            ui.label(RichText::new("Supported formats:").strong());
            ui.label("PNG (.png), JPEG (.jpg, .jpeg)");
            ui.add_space(6.0);
            ui.label(RichText::new("Configuration:").strong());
            ui.label("The webhook URL is read from --webhook-url or the WEBHOOK_URL environment variable.");
            ui.monospace("WEBHOOK_URL=https://your-n8n-host/webhook/xyz");
        });
    }

    fn draw_debug(&self, ui: &mut Ui) {
        if !self.settings.debug_mode {
            return;
        }
        egui::CollapsingHeader::new("🔧 Debug information").show(ui, |ui| {
            ui.label(format!("Webhook URL: {}", self.settings.endpoint_preview()));
            ui.label(format!("Timeout: {}s", self.settings.timeout.as_secs()));
            let state = format!("{:#?}", *self.session());
            ui.monospace(state);
        });
    }

    fn apply(&mut self, action: Action, ctx: &egui::Context) {
        match action {
            Action::PickImage => self.pick_image(ctx),
            Action::Submit => self.submit(ctx),
            Action::Download => self.download(),
            Action::CopyJson => self.copy_json(),
            Action::Reset => {
                self.session().reset();
                self.preview = None;
                self.notice = None;
            }
        }
    }

    fn pick_image(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &ACCEPTED_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        let image = match UploadedImage::from_path(&path) {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                self.session().report(e);
                return;
            }
        };

        // An undecodable file is still the one the user picked; it stays selectable
        let decoded = image.decode();
        let selected = self.session().select_image(image);
        if let Err(e) = selected {
            error!("Could not select image: {}", e);
            return;
        }
        self.notice = None;
        self.preview = match decoded {
            Ok(decoded) => {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [decoded.width as usize, decoded.height as usize],
                    &decoded.rgba,
                );
                let texture = ctx.load_texture("upload_preview", color_image, egui::TextureOptions::LINEAR);
                Some(Preview {
                    texture,
                    width: decoded.width,
                    height: decoded.height,
                })
            }
            Err(e) => {
                self.session().report(e);
                None
            }
        };
    }

    fn submit(&mut self, ctx: &egui::Context) {
        let started = self.session().begin_submit();
        let image = match started {
            Ok(image) => image,
            Err(e) => {
                self.session().report(e);
                return;
            }
        };
        self.notice = None;

        let processor = Arc::clone(&self.processor);
        let session = Arc::clone(&self.session);
        let ctx = ctx.clone();
        info!("Starting webhook submission for {}", image.filename());
        thread::spawn(move || {
            let outcome = processor.submit(&image);
            lock_session(&session).finish_submit(outcome);
            ctx.request_repaint();
        });
    }

    fn download(&mut self) {
        let Some(value) = self.session().result().map(|r| r.value.clone()) else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        else {
            return;
        };
        match write_export(&value, &path) {
            Ok(()) => self.notice = Some(format!("Saved to {}", path.display())),
            Err(e) => {
                error!("Export failed: {}", e);
                self.session().report(e);
            }
        }
    }

    fn copy_json(&mut self) {
        #[cfg(feature = "clipboard")]
        {
            let Some(json) = self.session().export() else {
                return;
            };
            let copied = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(json));
            match copied {
                Ok(()) => {
                    info!("Result JSON copied to clipboard");
                    self.notice = Some("JSON copied to clipboard".to_string());
                }
                Err(e) => {
                    error!("Failed to copy to clipboard: {}", e);
                    self.session().report(AppError::Export(format!("clipboard unavailable: {}", e)));
                }
            }
        }
        #[cfg(not(feature = "clipboard"))]
        {
            error!("Clipboard feature not enabled. Enable the 'clipboard' feature in Cargo.toml");
        }
    }
}

impl eframe::App for TaskShotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.was_style_initialized {
            self.init_style(ctx);
        }

        if self.session().is_submitting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                self.draw_header(ui);
                self.draw_upload_section(ui, &mut actions);
                self.draw_result_section(ui, &mut actions);
                self.draw_help(ui);
                self.draw_debug(ui);
            });
        });

        for action in actions {
            self.apply(action, ctx);
        }
    }
}

fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn draw_plan(ui: &mut Ui, plan: &RenderPlan) {
    match plan {
        RenderPlan::TaskList(blocks) | RenderPlan::ItemList(blocks) => {
            for (idx, block) in blocks.iter().enumerate() {
                draw_block(ui, idx, block);
            }
        }
        RenderPlan::TextBlock(text) => {
            ui.heading(TEXT_HEADING);
            let mut text = text.as_str();
            ScrollArea::vertical()
                .id_source("extracted_text")
                .max_height(TEXT_AREA_HEIGHT)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut text)
                            .desired_width(f32::INFINITY)
                            .desired_rows(12),
                    );
                });
        }
        RenderPlan::RawJson(json) => {
            let mut json = json.as_str();
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ScrollArea::vertical()
                    .id_source("raw_json")
                    .max_height(TEXT_AREA_HEIGHT * 1.5)
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut json)
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                    });
            });
        }
        RenderPlan::PlainValue(value) => {
            ui.label(value);
        }
    }
}

fn draw_block(ui: &mut Ui, idx: usize, block: &Block) {
    egui::CollapsingHeader::new(RichText::new(&block.title).strong())
        .id_source(("result_block", idx))
        .default_open(block.expanded)
        .show(ui, |ui| {
            for line in &block.lines {
                match &line.key {
                    Some(key) => {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(RichText::new(format!("{}:", key)).strong());
                            ui.label(&line.value);
                        });
                    }
                    None => {
                        ui.label(&line.value);
                    }
                }
            }
        });
}

pub fn run_gui(settings: Settings, processor: Arc<dyn ImageProcessor>) -> Result<()> {
    info!("Image Task Uploader GUI starting up...");

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(WINDOW_WIDTH, WINDOW_HEIGHT)),
        ..eframe::NativeOptions::default()
    };

    eframe::run_native(
        "Image Task Uploader",
        native_options,
        Box::new(move |_cc| Box::new(TaskShotApp::new(settings, processor))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start GUI: {}", e))?;

    Ok(())
}
