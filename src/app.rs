use std::path::PathBuf;

use crate::background::{self, Background};
use crate::config::EditorConfig;
use crate::coords::ViewportSize;
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::renderer::Renderer;
use crate::state::EditorSession;

/// The editor window: a tool panel beside the drawing canvas
#[derive(Debug)]
pub struct DrawApp {
    session: EditorSession,
    renderer: Renderer,
    background: Background,
    input_handler: InputHandler,
    /// Path typed into the tool panel's import field
    background_input: String,
    /// Last export/import outcome shown in the tool panel
    status: Option<String>,
}

impl DrawApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut config: EditorConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        if let Some(arg) = std::env::args().nth(1) {
            config.background_path = Some(PathBuf::from(arg));
        }

        let mut app = Self {
            session: EditorSession::new(ViewportSize::default(), config.clone()),
            renderer: Renderer::new(cc),
            background: Background::new(),
            input_handler: InputHandler::new(),
            background_input: String::new(),
            status: None,
        };

        if let Some(path) = &config.background_path {
            app.background_input = path.display().to_string();
            app.load_background(&cc.egui_ctx);
        }
        app
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn background_input_mut(&mut self) -> &mut String {
        &mut self.background_input
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Writes the drawing summary to the configured export path
    pub fn export(&mut self) {
        let path = self.session.config().export_path.clone();
        self.status = Some(match self.session.export_to_file(&path) {
            Ok(()) => format!("Exported to {}", path.display()),
            Err(err) => {
                log::warn!("{}", err);
                err.to_string()
            }
        });
    }

    /// Loads the image named in the import field and resizes the window to it
    pub fn load_background(&mut self, ctx: &egui::Context) {
        let path = PathBuf::from(self.background_input.trim());
        match self.background.load(ctx, &path) {
            Ok(()) => {
                self.status = Some(format!("Background {}", path.display()));
                if let Some(size) = self.background.size() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(size));
                }
            }
            Err(err) => {
                log::warn!("{}", err);
                self.status = Some(err.to_string());
            }
        }
    }

    /// Feeds this frame's canvas input to the session and paints the canvas
    pub fn update_canvas(&mut self, ctx: &egui::Context, painter: &egui::Painter, canvas_rect: egui::Rect) {
        for event in self.input_handler.process_input(ctx, canvas_rect) {
            self.session.handle_event(&event);
        }

        self.renderer.render(painter, canvas_rect, &self.session, &self.background);

        if self.session.take_redraw_request() || self.session.is_tracking() {
            ctx.request_repaint();
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if self.background.handle_dropped_files(ctx) {
            if let Some(source) = self.background.source() {
                self.background_input = source.display().to_string();
            }
            self.status = Some("Background replaced".to_owned());
        }
    }
}

impl eframe::App for DrawApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let mut config = self.session.config().clone();
        config.initial_shape = self.session.active_shape_type();
        config.background_path = self.background.source().map(|p| p.to_path_buf());
        eframe::set_value(storage, eframe::APP_KEY, &config);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        tools_panel(self, ctx);
        central_panel(self, ctx);

        background::preview_files_being_dropped(ctx);
        self.handle_dropped_files(ctx);
    }
}
