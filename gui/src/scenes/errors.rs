use crate::app::DgSyncGui;
use crate::scenes::Scene;
use eframe::egui;
use eframe::egui::Color32;

pub struct ErrorsScene {}
impl ErrorsScene {
    pub fn new() -> Self {
        ErrorsScene {}
    }
}

impl Scene for ErrorsScene {
    fn update(&mut self, gui: &mut DgSyncGui, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let errors = gui.state.status.snapshot().recent_errors;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Recent Errors");
            ui.separator();
            if errors.is_empty() {
                ui.label("None");
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for err in &errors {
                    ui.colored_label(Color32::LIGHT_RED, err.as_str());
                }
            });
        });
    }
}
