use crate::DrawApp;

pub fn central_panel(app: &mut DrawApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            // Create a painting area that fills the remaining space
            let available_size = ui.available_size();
            let (response, painter) = ui.allocate_painter(available_size, egui::Sense::click());

            app.update_canvas(ctx, &painter, response.rect);
        });
}
