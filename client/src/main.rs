// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod audio;
mod ball;
mod camera;
mod config;
mod convert;
mod hud;
mod input;
mod race;
mod track;

use bevy::prelude::*;

/// Physics and the race clock advance at this rate.
const FIXED_HZ: f64 = 60.0;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "Marble Trial".to_string(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.insert_resource(Time::<Fixed>::from_hz(FIXED_HZ));

        app.add_plugins((
            config::plugin,
            input::plugin,
            track::plugin,
            race::plugin,
            ball::plugin,
            camera::plugin,
            hud::plugin,
            audio::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
