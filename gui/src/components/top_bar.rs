use crate::app::DgSyncGui;
use crate::scenes::Scene;
use crate::state::SelectedTab;
use eframe::egui;
use eframe::egui::Color32;

pub struct StatusBar {
    pub tabs: [(String, SelectedTab); 2],
}
impl StatusBar {
    pub fn new(_gui: &DgSyncGui) -> Self {
        StatusBar {
            tabs: [
                (String::from("Wallet"), SelectedTab::Wallet),
                (String::from("Errors"), SelectedTab::Errors),
            ],
        }
    }
}

impl Scene for StatusBar {
    fn update(&mut self, gui: &mut DgSyncGui, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot = gui.state.status.snapshot();
        let chain = snapshot.chain;
        egui::TopBottomPanel::top("Tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (label, tab) in &self.tabs {
                    if ui
                        .selectable_label(gui.state.selected_tab == *tab, label)
                        .clicked()
                    {
                        gui.state.selected_tab = *tab;
                    }
                }
                ui.separator();
                let (color, text) = if !chain.connected {
                    (Color32::RED, "Not Connected")
                } else if chain.is_synced() {
                    (Color32::GREEN, "Synced")
                } else {
                    (Color32::YELLOW, "Syncing")
                };
                ui.colored_label(color, text);
                ui.separator();
                ui.label(format!(
                    "Height {} / {}",
                    chain.local_height, chain.network_height
                ));
                ui.label(format!("{} behind", snapshot.view.blocks_behind));
                ui.separator();
                ui.label(format!("Peers {}", chain.peer_count));
                if snapshot.chain_failures > 0 {
                    ui.separator();
                    ui.colored_label(
                        Color32::RED,
                        format!("{} failed updates", snapshot.chain_failures),
                    );
                }
            });
        });
    }
}
