use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use shared::BallInput;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    #[actionlike(Axis)]
    MoveForward,
    #[actionlike(Axis)]
    MoveRight,
    Hop,
    ResetRun,
    Respawn,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    app.insert_resource(default_input_map());
    app.insert_resource(ActionState::<InputAction>::default());
    app.init_resource::<PendingInput>();

    app.add_systems(Update, latch_presses);
}

fn default_input_map() -> InputMap<InputAction> {
    InputMap::default()
        .with_axis(InputAction::MoveForward, VirtualAxis::ws())
        .with_axis(InputAction::MoveForward, VirtualAxis::vertical_arrow_keys())
        .with_axis(InputAction::MoveForward, GamepadControlAxis::LEFT_Y)
        .with_axis(InputAction::MoveRight, VirtualAxis::ad())
        .with_axis(InputAction::MoveRight, VirtualAxis::horizontal_arrow_keys())
        .with_axis(InputAction::MoveRight, GamepadControlAxis::LEFT_X)
        .with(InputAction::Hop, KeyCode::Space)
        .with(InputAction::Hop, GamepadButton::South)
        .with(InputAction::ResetRun, KeyCode::KeyR)
        .with(InputAction::ResetRun, GamepadButton::Select)
        .with(InputAction::Respawn, KeyCode::KeyT)
        .with(InputAction::Respawn, GamepadButton::North)
}

/// Presses seen in `Update`, held until the next fixed step consumes them.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingInput {
    pub hop: bool,
    pub reset_run: bool,
    pub respawn: bool,
}

impl PendingInput {
    /// Return the latched presses and clear them.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

fn latch_presses(actions: Res<ActionState<InputAction>>, mut pending: ResMut<PendingInput>) {
    pending.hop |= actions.just_pressed(&InputAction::Hop);
    pending.reset_run |= actions.just_pressed(&InputAction::ResetRun);
    pending.respawn |= actions.just_pressed(&InputAction::Respawn);
}

/// Controller input for one fixed step.
pub(crate) fn ball_input(actions: &ActionState<InputAction>, pending: &PendingInput) -> BallInput {
    BallInput {
        forward: actions.value(&InputAction::MoveForward).clamp(-1.0, 1.0),
        right: actions.value(&InputAction::MoveRight).clamp(-1.0, 1.0),
        hop: pending.hop,
    }
}
