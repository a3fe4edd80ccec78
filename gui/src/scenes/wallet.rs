use crate::app::DgSyncGui;
use crate::scenes::Scene;
use eframe::egui;
use eframe::egui::Color32;
use log::error;

pub struct WalletScene {
    pub wallet_input: String,
}
impl WalletScene {
    pub fn new(gui: &DgSyncGui) -> Self {
        WalletScene {
            wallet_input: gui.config.last_wallet_id.clone().unwrap_or_default(),
        }
    }
}

impl Scene for WalletScene {
    fn update(&mut self, gui: &mut DgSyncGui, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot = gui.state.status.snapshot();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Wallet");
            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Wallet Id");
                ui.text_edit_singleline(&mut self.wallet_input);
                let wallet_id = self.wallet_input.trim().to_string();
                if ui
                    .add_enabled(!wallet_id.is_empty(), egui::Button::new("Open"))
                    .clicked()
                {
                    match gui.state.status.open_wallet(&wallet_id) {
                        Ok(()) => gui.remember_wallet(Some(wallet_id)),
                        Err(e) => error!("Failed to open wallet: {e}"),
                    }
                }
                if ui
                    .add_enabled(snapshot.active_wallet.is_some(), egui::Button::new("Close"))
                    .clicked()
                {
                    match gui.state.status.close_wallet() {
                        Ok(()) => gui.remember_wallet(None),
                        Err(e) => error!("Failed to close wallet: {e}"),
                    }
                }
            });
            ui.add_space(10.0);
            let Some(active_wallet) = &snapshot.active_wallet else {
                ui.label("No wallet open");
                return;
            };
            let Some(wallet) = &snapshot.wallet else {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Waiting for sync status of {active_wallet}"));
                });
                return;
            };
            ui.add(
                egui::ProgressBar::new(wallet.progress_clamped() as f32)
                    .show_percentage()
                    .animate(wallet.syncing),
            );
            ui.add_space(10.0);
            egui::Grid::new("wallet_status")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Wallet");
                    ui.label(wallet.wallet_id.as_str());
                    ui.end_row();
                    ui.label("Syncing");
                    ui.label(format!("{}", wallet.syncing));
                    ui.end_row();
                    ui.label("Last Synced Block");
                    ui.label(format!("{}", wallet.last_synced_block));
                    ui.end_row();
                    ui.label("Blocks Behind");
                    ui.label(format!(
                        "{}",
                        snapshot.view.wallet_blocks_behind.unwrap_or_default()
                    ));
                    ui.end_row();
                    ui.label("Balance");
                    ui.label(format!("{}", wallet.balance));
                    ui.end_row();
                    ui.label("Transactions");
                    ui.label(format!("{}", wallet.tx_count));
                    ui.end_row();
                    ui.label("UTXOs");
                    ui.label(format!("{}", wallet.utxo_count));
                    ui.end_row();
                });
            if snapshot.wallet_failures > 0 {
                ui.add_space(10.0);
                ui.colored_label(
                    Color32::RED,
                    format!(
                        "{} failed updates, showing last known status",
                        snapshot.wallet_failures
                    ),
                );
            }
        });
    }
}
