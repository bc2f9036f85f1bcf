//! Debug/performance tooling for native dev builds.
//!
//! Perf overlay plus gizmos for the trigger volumes, the ground probe and the
//! chase camera's steering direction.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;
use shared::TriggerDef;

use crate::{
    ball::BallPoses,
    convert,
    race::Race,
    track::{ActiveTrack, Simulation},
};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, (draw_triggers, draw_ball_state));
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn trigger_transform(def: &TriggerDef) -> Transform {
    convert::transform(&def.pose()).with_scale(convert::vec3(&def.half_extents) * 2.0)
}

/// Gate in yellow; the next expected checkpoint green, the rest grey.
fn draw_triggers(mut gizmos: Gizmos, track: Res<ActiveTrack>, race: Res<Race>) {
    gizmos.cuboid(
        trigger_transform(&track.0.gate),
        Color::srgb(1.0, 0.85, 0.2),
    );

    let next = race.0.current_checkpoint_index();
    for def in &track.0.checkpoints {
        let color = if race.0.is_lap_active() && def.index == next {
            Color::srgb(0.2, 1.0, 0.3)
        } else {
            Color::srgb(0.5, 0.5, 0.5)
        };
        gizmos.cuboid(trigger_transform(&def.trigger), color);
    }
}

fn draw_ball_state(mut gizmos: Gizmos, sim: Res<Simulation>, poses: Res<BallPoses>) {
    let center = convert::vec3(&poses.current.translation.vector);

    if let Some(hit) = sim.ball.grounding().last_hit() {
        let point = convert::vec3(&hit.point);
        let color = if sim.ball.is_grounded() {
            Color::srgb(0.2, 1.0, 0.3)
        } else {
            Color::srgb(1.0, 0.3, 0.2)
        };
        gizmos.line(center, point, color);
        gizmos.arrow(point, point + convert::vec3(&hit.normal), color);
    }

    let steer = convert::vec3(&sim.ball.camera().move_direction());
    gizmos.arrow(center, center + steer * 1.5, Color::srgb(0.3, 0.6, 1.0));
}
