use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;

use crate::annotations::classes::find_class_file;
use crate::dataset::find_label_file;
use crate::debounce::ResizeDebouncer;
use crate::error::{Error, Result};
use crate::render::{box_color, label_anchor};
use crate::session::{InteractionMode, Session};
use crate::settings::Settings;
use crate::viewport::ZoomDirection;

const LABEL_FONT_SIZE: f32 = 14.0;

/// What to open once the window is up.
#[derive(Debug)]
pub enum Startup {
    Empty,
    Pair {
        image: PathBuf,
        labels: Option<PathBuf>,
        classes: Option<PathBuf>,
    },
    Folder(PathBuf),
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct InspectApp {
    session: Session,
    texture: Option<(u64, egui::TextureHandle)>,
    debouncer: ResizeDebouncer,

    // manual selection
    image_field: String,
    labels_field: String,
    classes_field: String,
    // folder mode
    folder_field: String,
    position_field: String,

    fullscreen: bool,
}

impl InspectApp {
    pub fn new(settings: Settings, startup: Startup) -> Self {
        let debouncer = ResizeDebouncer::new(Duration::from_millis(settings.resize_debounce_ms));
        let mut app = Self {
            session: Session::new(settings),
            texture: None,
            debouncer,
            image_field: String::new(),
            labels_field: String::new(),
            classes_field: String::new(),
            folder_field: String::new(),
            position_field: String::new(),
            fullscreen: false,
        };

        match startup {
            Startup::Empty => {}
            Startup::Pair {
                image,
                labels,
                classes,
            } => {
                let dir = image.parent().unwrap_or(Path::new("."));
                let labels = labels.or_else(|| find_label_file(&image, dir));
                let classes = classes.or_else(|| find_class_file(dir));
                app.image_field = display(&image);
                app.labels_field = labels.as_deref().map(display).unwrap_or_default();
                app.classes_field = classes.as_deref().map(display).unwrap_or_default();
                app.process_single_image();
            }
            Startup::Folder(root) => {
                app.folder_field = display(&root);
                app.start_folder();
            }
        }
        app
    }

    fn apply(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.session.report(&err);
        }
    }

    fn process_single_image(&mut self) {
        let image = PathBuf::from(self.image_field.trim());
        let labels = PathBuf::from(self.labels_field.trim());
        let classes = Some(self.classes_field.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let result = self.session.load_pair(&image, &labels, classes.as_deref());
        self.apply(result);
    }

    fn start_folder(&mut self) {
        let root = PathBuf::from(self.folder_field.trim());
        let result = self.session.open_folder(&root);
        self.apply(result);
        self.sync_position_field();
    }

    fn sync_position_field(&mut self) {
        if let Some(dataset) = self.session.dataset() {
            self.position_field = (dataset.current_index() + 1).to_string();
        }
    }

    fn save_current_image(&mut self) {
        if self.session.image().is_none() {
            self.session.report(&Error::NoImageLoaded);
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save Annotated Image")
            .add_filter("PNG files", &["png"])
            .add_filter("JPEG files", &["jpg", "jpeg"])
            .set_file_name("annotated.png")
            .save_file()
        else {
            return;
        };
        let result = self.session.save_to(&path).map(|_| ());
        self.apply(result);
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let Some(loaded) = self.session.image() else {
            self.texture = None;
            return;
        };
        if matches!(self.texture, Some((rev, _)) if rev == loaded.revision) {
            return;
        }
        let img = &loaded.pixels;
        let size = [img.width() as usize, img.height() as usize];
        let pixels = img.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        let handle = ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR);
        self.texture = Some((loaded.revision, handle));
    }

    fn toggle_fullscreen(&mut self, ctx: &egui::Context) {
        self.fullscreen = !self.fullscreen;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.fullscreen));
    }

    // ── Panels ──────────────────────────────────────────────────────────────

    fn manual_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Manual File Selection");
        egui::Grid::new("manual_selection")
            .num_columns(3)
            .show(ui, |ui| {
                ui.label("Image File (JPG/PNG/JPEG):");
                ui.text_edit_singleline(&mut self.image_field);
                if ui.button("Browse").clicked() {
                    pick_into(&mut self.image_field, "Image Files", &["jpg", "jpeg", "png"]);
                }
                ui.end_row();

                ui.label("Label File (XML/JSON/TXT):");
                ui.text_edit_singleline(&mut self.labels_field);
                if ui.button("Browse").clicked() {
                    pick_into(&mut self.labels_field, "Annotation Files", &["xml", "json", "txt"]);
                }
                ui.end_row();

                ui.label("Classes File (Optional - for YOLO):");
                ui.text_edit_singleline(&mut self.classes_field);
                if ui.button("Browse").clicked() {
                    pick_into(&mut self.classes_field, "Text Files", &["txt", "names"]);
                }
                ui.end_row();
            });
        if ui.button("Process Single Image").clicked() {
            self.process_single_image();
        }
    }

    fn folder_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Automated Folder Processing");
        ui.horizontal(|ui| {
            ui.label("Select Root Folder:");
            ui.text_edit_singleline(&mut self.folder_field);
            if ui.button("Browse Folder").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    self.folder_field = display(&dir);
                }
            }
            if ui.button("Start Automated Processing").clicked() {
                self.start_folder();
            }
        });
    }

    fn navigation_bar(&mut self, ui: &mut egui::Ui) {
        let can_navigate = self.session.dataset().is_some_and(|d| d.len() > 1);
        let counter = self
            .session
            .dataset()
            .map(|d| d.position_label())
            .unwrap_or_else(|| "0/0".to_string());

        ui.horizontal(|ui| {
            if ui.add_enabled(can_navigate, egui::Button::new("Previous")).clicked() {
                let result = self.session.previous_item();
                self.apply(result);
                self.sync_position_field();
            }
            ui.label(counter);
            let entry = ui.add_enabled(
                can_navigate,
                egui::TextEdit::singleline(&mut self.position_field).desired_width(48.0),
            );
            let submitted = entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.add_enabled(can_navigate, egui::Button::new("Go")).clicked() || submitted {
                let text = self.position_field.clone();
                let result = self.session.go_to_position(&text);
                self.apply(result);
                self.sync_position_field();
            }
            if ui.add_enabled(can_navigate, egui::Button::new("Next")).clicked() {
                let result = self.session.next_item();
                self.apply(result);
                self.sync_position_field();
            }
        });
    }

    fn tool_bar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            let mut mode = self.session.mode();
            for candidate in InteractionMode::ALL {
                ui.selectable_value(&mut mode, candidate, format!("{} Tool", candidate.label()));
            }
            if mode != self.session.mode() {
                self.session.set_mode(mode);
            }
            ui.separator();
            if ui.button("Fullscreen (F11)").clicked() {
                self.toggle_fullscreen(ctx);
            }
            ui.separator();
            let mut bake = self.session.bake_boxes();
            if ui.checkbox(&mut bake, "Bake boxes into saved image").changed() {
                self.session.set_bake_boxes(bake);
            }
            if ui.button("Save Annotated Image").clicked() {
                self.save_current_image();
            }
            ui.separator();
            if ui.button("Fit").clicked() {
                self.session.fit_to_window();
            }
            if ui.button("1:1").clicked() {
                self.session.actual_size();
            }
            ui.label(format!("Zoom: {:.0}%", self.session.viewport().zoom() * 100.0));
            if let Some(loaded) = self.session.image() {
                ui.separator();
                ui.label(display_name(&loaded.path))
                    .on_hover_text(display(&loaded.path));
            }
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.session.status());
            let diagnostics = self.session.diagnostics();
            if !diagnostics.is_empty() {
                ui.separator();
                ui.colored_label(
                    egui::Color32::YELLOW,
                    format!("{} label warnings", diagnostics.len()),
                )
                .on_hover_text(diagnostics.join("\n"));
            }
        });
    }

    // ── Canvas ──────────────────────────────────────────────────────────────

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;

        let now = Instant::now();
        self.debouncer
            .note((canvas_rect.width(), canvas_rect.height()), now);
        if let Some(size) = self.debouncer.poll(now) {
            self.session.resize_viewport(size);
        }
        if let Some(wait) = self.debouncer.remaining(now) {
            ctx.request_repaint_after(wait);
        }

        painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
        self.paint_image(&painter, canvas_rect);
        self.paint_boxes(&painter, canvas_rect);
        self.paint_strokes(&painter, canvas_rect);
        self.handle_pointer(ctx, &response, canvas_rect);
    }

    fn paint_image(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let (Some((_, tex)), Some(loaded)) = (&self.texture, self.session.image()) else {
            return;
        };
        let vp = self.session.viewport();
        let (w, h) = loaded.pixels.dimensions();
        let img_rect = egui::Rect::from_min_max(
            to_pos(canvas_rect, vp.to_screen_space((0.0, 0.0))),
            to_pos(canvas_rect, vp.to_screen_space((w as f32, h as f32))),
        );
        painter.image(
            tex.id(),
            img_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    fn paint_boxes(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.session.image().is_none() {
            return;
        }
        let vp = self.session.viewport();
        let width = self.session.settings().box_outline_width * vp.zoom();
        for bbox in self.session.boxes() {
            let color = box_color(&bbox.label).to_egui();
            let min = vp.to_screen_space((bbox.x_min as f32, bbox.y_min as f32));
            let max = vp.to_screen_space((bbox.x_max as f32, bbox.y_max as f32));
            let rect = egui::Rect::from_two_pos(to_pos(canvas_rect, min), to_pos(canvas_rect, max));
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(width, color),
                egui::StrokeKind::Inside,
            );

            let (ax, ay) = label_anchor(bbox);
            let anchor = vp.to_screen_space((ax as f32, ay as f32));
            painter.text(
                to_pos(canvas_rect, anchor),
                egui::Align2::LEFT_TOP,
                &bbox.label,
                egui::FontId::proportional(LABEL_FONT_SIZE),
                color,
            );
        }
    }

    fn paint_strokes(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let vp = self.session.viewport();
        let layer = self.session.strokes();
        let preview = self.session.settings().preview_color;
        let committed = layer.strokes().iter().map(|s| (s, s.color));
        let active = layer.active().map(|s| (s, preview));

        for (stroke, color) in committed.chain(active) {
            let points: Vec<egui::Pos2> = stroke
                .points
                .iter()
                .map(|&p| to_pos(canvas_rect, vp.to_screen_space(p)))
                .collect();
            let line = egui::Stroke::new(stroke.width * vp.zoom(), color.to_egui());
            if let [only] = points.as_slice() {
                painter.circle_filled(*only, line.width / 2.0, line.color);
            } else {
                painter.add(egui::Shape::line(points, line));
            }
        }
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response, canvas_rect: egui::Rect) {
        // Ctrl+scroll and pinch arrive as a zoom factor
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            if let Some(pos) = response.hover_pos() {
                let direction = if zoom_delta > 1.0 {
                    ZoomDirection::In
                } else {
                    ZoomDirection::Out
                };
                self.session.zoom_at(to_local(canvas_rect, pos), direction);
            }
        }

        // Middle button pans in every mode
        if response.dragged_by(egui::PointerButton::Middle) {
            let delta = response.drag_delta();
            self.session.pan_by((delta.x, delta.y));
        }

        if response.drag_started_by(egui::PointerButton::Primary) {
            let origin = ctx
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(origin) = origin {
                self.session.pointer_pressed(to_local(canvas_rect, origin));
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let delta = response.drag_delta();
                self.session
                    .pointer_dragged(to_local(canvas_rect, pos), (delta.x, delta.y));
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            self.session.pointer_released();
        }

        let cursor = match self.session.mode() {
            InteractionMode::Pan => egui::CursorIcon::Grab,
            InteractionMode::Draw => egui::CursorIcon::Crosshair,
            InteractionMode::Erase => egui::CursorIcon::Cell,
        };
        if response.hovered() {
            ctx.set_cursor_icon(cursor);
        }
    }
}

fn to_local(canvas_rect: egui::Rect, pos: egui::Pos2) -> (f32, f32) {
    let rel = pos - canvas_rect.min;
    (rel.x, rel.y)
}

fn to_pos(canvas_rect: egui::Rect, (x, y): (f32, f32)) -> egui::Pos2 {
    canvas_rect.min + egui::vec2(x, y)
}

fn pick_into(field: &mut String, filter: &str, extensions: &[&str]) {
    if let Some(path) = rfd::FileDialog::new()
        .add_filter(filter, extensions)
        .pick_file()
    {
        *field = display(&path);
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for InspectApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        let (f11, escape) = ctx.input(|i| (i.key_pressed(egui::Key::F11), i.key_pressed(egui::Key::Escape)));
        if f11 || (escape && self.fullscreen) {
            self.toggle_fullscreen(ctx);
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            if !self.fullscreen {
                self.manual_panel(ui);
                ui.separator();
                self.folder_panel(ui);
                ui.separator();
                self.navigation_bar(ui);
                ui.separator();
            }
            self.tool_bar(ui, ctx);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas(ui, ctx);
        });
    }
}
