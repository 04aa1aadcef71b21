use egui::Context;

use crate::controller::{FrameStats, FrameUniforms, Quality};

/// Build the HUD and return egui output together with a quality level the
/// user picked this frame, if any.
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    uniforms: &FrameUniforms,
    stats: &FrameStats,
) -> (egui::FullOutput, Option<Quality>) {
    let current = Quality::from_index(uniforms.quality).unwrap_or_default();
    let mut selected = current;

    let output = egui_ctx.run(raw_input, |ctx| {
        draw_stats_window(ctx, uniforms, stats, &mut selected);
    });

    let changed = (selected != current).then_some(selected);
    (output, changed)
}

fn draw_stats_window(ctx: &Context, uniforms: &FrameUniforms, stats: &FrameStats, quality: &mut Quality) {
    let pos = uniforms.camera_position;

    egui::Window::new("Room")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {}", stats.fps)).small());
            ui.label(
                egui::RichText::new(format!(
                    "{}x{}",
                    uniforms.resolution.0, uniforms.resolution.1
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Pos: x: {:.2} y: {:.2} z: {:.2}", pos.x, pos.y, pos.z)).small());
            ui.label(
                egui::RichText::new(format!(
                    "Yaw: {:.1} Pitch: {:.1}",
                    uniforms.camera_yaw.to_degrees(),
                    uniforms.camera_pitch.to_degrees()
                ))
                .small(),
            );
            ui.separator();

            egui::ComboBox::from_label("Quality")
                .selected_text(quality.label())
                .show_ui(ui, |ui| {
                    for level in Quality::ALL {
                        ui.selectable_value(quality, level, level.label());
                    }
                });

            ui.separator();
            ui.label(egui::RichText::new("Drag - Look around").small());
            ui.label(egui::RichText::new("WASD / Arrows - Walk").small());
        });
}
