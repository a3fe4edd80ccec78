use crate::app::DgSyncGui;
use eframe::egui;

pub mod errors;
pub mod wallet;

pub trait Scene {
    fn update(&mut self, gui: &mut DgSyncGui, ctx: &egui::Context, frame: &mut eframe::Frame);
}
