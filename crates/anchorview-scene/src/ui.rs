//! UI overlays using bevy_egui

use anchorview_core::{ControlCommand, ModelSlot, SessionPhase};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use crate::types::{ControlMessage, RetryLoadRequested, Session, StartRequested, UiLayout};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update_ui_layout)
            // Main UI system runs in EguiPrimaryContextPass for input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Control pad rows, top to bottom
const CONTROL_ROWS: [&[ControlCommand]; 4] = [
    &[
        ControlCommand::MoveLeft,
        ControlCommand::MoveUp,
        ControlCommand::MoveDown,
        ControlCommand::MoveRight,
    ],
    &[ControlCommand::MoveForward, ControlCommand::MoveBack],
    &[
        ControlCommand::RotateLeft,
        ControlCommand::RotateRight,
        ControlCommand::TiltUp,
        ControlCommand::TiltDown,
    ],
    &[ControlCommand::ScaleDown, ControlCommand::ScaleUp],
];

fn update_ui_layout(windows: Query<&Window>, mut ui_layout: ResMut<UiLayout>) {
    if let Ok(window) = windows.single() {
        let width = window.width();
        let height = window.height();

        // Only update if dimensions changed significantly
        if (ui_layout.screen_width - width).abs() > 1.0
            || (ui_layout.screen_height - height).abs() > 1.0
        {
            ui_layout.update_for_screen(width, height);
        }
    }
}

fn overlay_frame() -> egui::Frame {
    egui::Frame::NONE
        .fill(egui::Color32::from_black_alpha(150))
        .inner_margin(egui::Margin::same(8))
}

fn ui_system(
    mut contexts: EguiContexts,
    mut session: ResMut<Session>,
    mut ui_layout: ResMut<UiLayout>,
    mut controls: MessageWriter<ControlMessage>,
    mut start_requests: MessageWriter<StartRequested>,
    mut retry_requests: MessageWriter<RetryLoadRequested>,
) {
    let ui_scale = ui_layout.ui_scale;

    // Get the egui context - early return if not available
    let Ok(ctx) = contexts.ctx_mut() else { return };

    // Larger touch targets on mobile
    if ui_layout.is_mobile {
        let mut style = (*ctx.style()).clone();
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
    }

    // Status bar
    egui::TopBottomPanel::top("status_bar")
        .frame(overlay_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(session.status())
                        .size(15.0 * ui_scale)
                        .color(egui::Color32::WHITE),
                );
                if matches!(session.model(), ModelSlot::Failed(_))
                    && ui.button(egui::RichText::new("Retry").size(14.0 * ui_scale)).clicked()
                    && session.retry_load()
                {
                    retry_requests.write(RetryLoadRequested);
                }
            });
        });

    // Start overlay until the camera runs
    let phase = session.phase().clone();
    if matches!(phase, SessionPhase::Idle | SessionPhase::Failed(_) | SessionPhase::Starting) {
        egui::Area::new(egui::Id::new("start_overlay"))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                overlay_frame().show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading(egui::RichText::new("AR Viewer").size(22.0 * ui_scale));
                        ui.label("Point your camera at the printed target.");
                        ui.add_space(8.0);
                        let starting = phase == SessionPhase::Starting;
                        let label = if starting { "Starting…" } else { "Start AR" };
                        let text = egui::RichText::new(label).size(18.0 * ui_scale);
                        let button = egui::Button::new(text);
                        if ui.add_enabled(!starting, button).clicked() && session.request_start() {
                            start_requests.write(StartRequested);
                        }
                        if let SessionPhase::Failed(reason) = &phase {
                            ui.add_space(4.0);
                            ui.label(
                                egui::RichText::new(reason)
                                    .small()
                                    .color(egui::Color32::from_rgb(255, 120, 120)),
                            );
                        }
                    });
                });
            });
        return;
    }

    // Info panel, shown when a target is found
    if session.info_panel_visible() {
        egui::Window::new("About this model")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 50.0])
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .frame(overlay_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.strong("About this model");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(ControlCommand::HideInfo.label()).clicked() {
                            controls.write(ControlMessage(ControlCommand::HideInfo));
                        }
                    });
                });
                ui.label(session.config().model.url.as_str());
                let visible = session.anchors().iter().filter(|a| a.is_visible()).count();
                ui.label(format!("Tracking {visible} of {} targets", session.anchors().len()));
            });
    }

    // Control pad
    if *session.model() != ModelSlot::Loaded {
        return;
    }
    egui::TopBottomPanel::bottom("control_pad")
        .frame(overlay_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let toggle = if ui_layout.show_controls { "Hide controls" } else { "Controls" };
                if ui.button(toggle).clicked() {
                    ui_layout.show_controls = !ui_layout.show_controls;
                }
                if ui.button(session.spin_label()).clicked() {
                    controls.write(ControlMessage(ControlCommand::ToggleSpin));
                }
                if ui.button(ControlCommand::Reset.label()).clicked() {
                    controls.write(ControlMessage(ControlCommand::Reset));
                }
                if !session.info_panel_visible()
                    && ui.button(ControlCommand::ShowInfo.label()).clicked()
                {
                    controls.write(ControlMessage(ControlCommand::ShowInfo));
                }
            });
            if !ui_layout.show_controls {
                return;
            }
            ui.separator();
            for row in CONTROL_ROWS {
                ui.horizontal(|ui| {
                    for &command in row {
                        let text = egui::RichText::new(command.label()).size(16.0 * ui_scale);
                        if ui.button(text).clicked() {
                            controls.write(ControlMessage(command));
                        }
                    }
                });
            }
        });
}
