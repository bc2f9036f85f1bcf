use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use shared::{RaceEvent, RaceState, TrackEvent, race::Checkpoint};

use crate::{
    ball::{TrackMessage, step_simulation},
    config::GameConfig,
    track::{Simulation, build_simulation},
};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<RaceNotification>();

    app.add_systems(Startup, init_race.after(build_simulation));
    app.add_systems(
        FixedUpdate,
        (apply_track_events, tick_lap_timer, forward_race_events)
            .chain()
            .after(step_simulation),
    );
}

#[derive(Resource, Debug)]
pub struct Race(pub RaceState);

/// Race notifications, re-published for the HUD and audio.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct RaceNotification(pub RaceEvent);

/// Listener output collected between fixed steps.
#[derive(Resource, Clone, Default)]
pub struct RaceInbox(Arc<Mutex<Vec<RaceEvent>>>);

impl RaceInbox {
    fn push(&self, event: RaceEvent) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event);
        }
    }

    pub fn drain(&self) -> Vec<RaceEvent> {
        self.0
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

fn init_race(mut commands: Commands, config: Res<GameConfig>, sim: Res<Simulation>) {
    let mut race = RaceState::new(config.race.clone());
    race.cache_checkpoints(
        sim.world
            .checkpoints()
            .into_iter()
            .map(|cp| cp as Arc<dyn Checkpoint>),
    );

    let inbox = RaceInbox::default();
    let sink = inbox.clone();
    race.subscribe(move |event| sink.push(*event));

    commands.insert_resource(Race(race));
    commands.insert_resource(inbox);
}

/// Feed one track trigger into the race. Outcomes are logged by the race itself.
pub(crate) fn route_track_event(race: &mut RaceState, event: &TrackEvent, now: f32) {
    match event {
        TrackEvent::GateCrossed => {
            race.handle_gate_cross(now);
        }
        TrackEvent::CheckpointReached { index, pose } => {
            race.register_checkpoint_hit(*index, *pose, now);
        }
        TrackEvent::BallImpact(_) => {}
    }
}

fn apply_track_events(
    mut race: ResMut<Race>,
    mut track_events: MessageReader<TrackMessage>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    for TrackMessage(event) in track_events.read() {
        route_track_event(&mut race.0, event, now);
    }
}

fn tick_lap_timer(mut race: ResMut<Race>, time: Res<Time>) {
    race.0.update_lap_timer(time.elapsed_secs(), time.delta_secs());
}

fn forward_race_events(inbox: Res<RaceInbox>, mut writer: MessageWriter<RaceNotification>) {
    for event in inbox.drain() {
        writer.write(RaceNotification(event));
    }
}
