use crate::DrawApp;
use crate::shape::ShapeKind;
use crate::state::ShapeTypeChange;

pub fn tools_panel(app: &mut DrawApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Shape");

            let mut selected = app.session().active_shape_type();
            egui::ComboBox::from_id_salt("shape_type")
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for kind in ShapeKind::ALL {
                        ui.selectable_value(&mut selected, kind, kind.label());
                    }
                });
            if selected != app.session().active_shape_type() {
                log::info!("Shape type selected from UI: {}", selected);
                if app.session_mut().set_active_shape_type(selected) == ShapeTypeChange::Deferred {
                    log::info!("{} applies after the current shape", selected);
                }
            }

            let mut marquee = app.session().marquee_mode();
            if ui.checkbox(&mut marquee, "Marquee select").changed() {
                app.session_mut().set_marquee_mode(marquee);
            }

            ui.separator();

            let session = app.session();
            ui.label(format!("State: {}", session.phase().name()));
            egui::Grid::new("shape_counts_grid")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for kind in ShapeKind::ALL {
                        ui.label(kind.label());
                        ui.label(session.registry().shapes_of(kind).count().to_string());
                        ui.end_row();
                    }
                    ui.label("Selected");
                    ui.label(session.selection().len().to_string());
                    ui.end_row();
                });
            let has_selection = !session.selection().is_empty();

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(has_selection, egui::Button::new("Delete"))
                    .clicked()
                {
                    app.session_mut().delete_selection();
                }
                if ui.button("Cancel").clicked() {
                    app.session_mut().cancel_gesture();
                }
            });

            ui.separator();
            ui.heading("File");

            if ui.button("Export").clicked() {
                app.export();
            }

            ui.label("Background image:");
            ui.text_edit_singleline(app.background_input_mut());
            if ui.button("Import").clicked() {
                app.load_background(ctx);
            }

            if let Some(status) = app.status() {
                ui.separator();
                ui.label(status);
            }
        });
}
