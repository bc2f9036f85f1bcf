use bevy::prelude::*;
use shared::{OneShotTimer, RaceEvent, ball::CountdownDisplay};

use crate::{
    ball::CountdownChanged,
    race::RaceNotification,
    track::Simulation,
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<HudState>();

    app.add_systems(Startup, spawn_hud);
    app.add_systems(
        Update,
        (collect_race_events, pulse_countdown, update_hud_text).chain(),
    );
}

/// Seconds a split delta stays on screen.
const SPLIT_DISPLAY_S: f32 = 2.5;
const COUNTDOWN_FONT_SIZE: f32 = 96.0;
const COUNTDOWN_PULSE_SCALE: f32 = 0.5;
const COUNTDOWN_PULSE_DECAY: f32 = 6.0;

const AHEAD_COLOR: Color = Color::srgb(0.3, 0.95, 0.4);
const BEHIND_COLOR: Color = Color::srgb(1.0, 0.35, 0.3);

/// `M:SS:CC` with floor semantics; negative times show as zero.
pub fn format_lap_time(seconds: f32) -> String {
    let time = f64::from(seconds.max(0.0));
    let whole = time.floor();
    let minutes = (time / 60.0).floor() as u64;
    let secs = whole as u64 % 60;
    let centis = ((time - whole) * 100.0).floor() as u64;
    format!("{minutes}:{secs:02}:{centis:02}")
}

/// Signed split delta, `+S.CC` when behind the best lap and `-S.CC` when ahead.
pub fn format_split_delta(delta: f32) -> String {
    let sign = if delta < 0.0 { '-' } else { '+' };
    let magnitude = f64::from(delta.abs());
    let whole = magnitude.floor();
    let centis = ((magnitude - whole) * 100.0).floor() as u64;
    format!("{sign}{}.{centis:02}", whole as u64)
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudField {
    Lap,
    LapTime,
    Best,
    Split,
    Countdown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitDisplay {
    pub delta: f32,
    pub is_ahead: bool,
}

#[derive(Resource, Debug, Default)]
pub struct HudState {
    pub lap: u32,
    pub lap_time: f32,
    pub best: Option<f32>,
    pub split: Option<SplitDisplay>,
    split_timer: OneShotTimer,
    /// Extra countdown scale, decays to zero after each tick.
    countdown_pulse: f32,
}

impl HudState {
    pub fn apply(&mut self, event: &RaceEvent, now: f32) {
        match *event {
            RaceEvent::LapNumberChanged(lap) => self.lap = lap,
            RaceEvent::LapTimeUpdated(time) => self.lap_time = time,
            RaceEvent::BestTimeUpdated(best) => self.best = Some(best),
            RaceEvent::SplitUpdated {
                delta, is_ahead, ..
            } => {
                self.split = Some(SplitDisplay { delta, is_ahead });
                self.split_timer.schedule(now, SPLIT_DISPLAY_S);
            }
        }
    }

    /// Hide the split once its display time ran out.
    pub fn expire(&mut self, now: f32) {
        if self.split_timer.poll(now).is_some() {
            self.split = None;
        }
    }
}

fn spawn_hud(mut commands: Commands) {
    let label = |field: HudField, text: &str, size: f32| {
        (
            field,
            Text::new(text),
            TextFont {
                font_size: size,
                ..default()
            },
            TextColor(Color::WHITE),
        )
    };

    commands.spawn((
        Name::new("Race HUD"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(16.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        },
        children![
            label(HudField::Lap, "Lap 0", 28.0),
            label(HudField::LapTime, &format_lap_time(0.0), 40.0),
            label(HudField::Best, "Best --:--:--", 24.0),
            label(HudField::Split, "", 24.0),
        ],
    ));

    commands.spawn((
        Name::new("Countdown"),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        children![label(HudField::Countdown, "", COUNTDOWN_FONT_SIZE)],
    ));
}

fn collect_race_events(
    mut notifications: MessageReader<RaceNotification>,
    mut hud: ResMut<HudState>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    for RaceNotification(event) in notifications.read() {
        hud.apply(event, now);
    }
    hud.expire(now);
}

fn pulse_countdown(
    mut ticks: MessageReader<CountdownChanged>,
    mut hud: ResMut<HudState>,
    time: Res<Time>,
) {
    if ticks.read().last().is_some() {
        hud.countdown_pulse = COUNTDOWN_PULSE_SCALE;
    }
    let decay = (-COUNTDOWN_PULSE_DECAY * time.delta_secs()).exp();
    hud.countdown_pulse *= decay;
}

fn update_hud_text(
    hud: Res<HudState>,
    sim: Res<Simulation>,
    mut fields: Query<(&HudField, &mut Text, &mut TextColor, &mut TextFont)>,
) {
    for (field, mut text, mut color, mut font) in &mut fields {
        match field {
            HudField::Lap => text.0 = format!("Lap {}", hud.lap),
            HudField::LapTime => text.0 = format_lap_time(hud.lap_time),
            HudField::Best => {
                text.0 = match hud.best {
                    Some(best) => format!("Best {}", format_lap_time(best)),
                    None => "Best --:--:--".to_string(),
                };
            }
            HudField::Split => match hud.split {
                Some(split) => {
                    text.0 = format_split_delta(split.delta);
                    color.0 = if split.is_ahead {
                        AHEAD_COLOR
                    } else {
                        BEHIND_COLOR
                    };
                }
                None => text.0.clear(),
            },
            HudField::Countdown => {
                text.0 = match sim.ball.countdown_display() {
                    CountdownDisplay::Count(n) => n.to_string(),
                    CountdownDisplay::Go => "GO!".to_string(),
                    CountdownDisplay::Hidden => String::new(),
                };
                font.font_size = COUNTDOWN_FONT_SIZE * (1.0 + hud.countdown_pulse);
            }
        }
    }
}
