//! Character state machine: Intent + текущее состояние → новое состояние и state-velocity
//!
//! Free состояния (Idle/Walk/Sprint/Jump/Fall) читают Intent напрямую.
//! Action состояния ведутся `StateTable`: фаза по таймеру задаёт политику скорости,
//! ExitRule задаёт единственный разрешённый выход.

use bevy::prelude::*;

use crate::combat::catalog::AttackCatalog;
use crate::combat::table::{ExitRule, HeldInput, StateTable, VelocityPolicy};
use crate::components::{ActionState, Buffs, FighterData, FighterState, Intent, Motion, Stamina, Vitals};
use crate::config::FighterTuning;
use crate::tick::SimClock;

/// Read-only контекст шага (общий для всех бойцов)
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub tuning: &'a FighterTuning,
    pub catalog: &'a AttackCatalog,
    pub table: &'a StateTable,
    pub dt: f32,
}

/// Изменяемое состояние одного бойца на время шага
pub struct FighterStep<'a> {
    pub state: &'a mut FighterState,
    pub motion: &'a mut Motion,
    pub stamina: &'a mut Stamina,
    pub vitals: &'a Vitals,
    pub buffs: &'a Buffs,
    pub intent: &'a Intent,
}

/// Система: продвинуть state machine каждого бойца
///
/// Бойцы независимы друг от друга в этой фазе, порядок обхода не важен.
/// Захват (hold/slam) обрабатывается следом в `process_grabs`.
pub fn update_state_machines(
    clock: Res<SimClock>,
    tuning: Res<FighterTuning>,
    catalog: Res<AttackCatalog>,
    table: Res<StateTable>,
    mut fighters: Query<FighterData>,
) {
    let ctx = StepContext {
        tuning: &tuning,
        catalog: &catalog,
        table: &table,
        dt: clock.dt,
    };

    for mut fighter in fighters.iter_mut() {
        step_fighter(
            &ctx,
            FighterStep {
                state: &mut *fighter.state,
                motion: &mut *fighter.motion,
                stamina: &mut *fighter.stamina,
                vitals: &*fighter.vitals,
                buffs: &*fighter.buffs,
                intent: fighter.intent,
            },
        );
    }
}

/// Один шаг state machine для одного бойца
pub fn step_fighter(ctx: &StepContext, fighter: FighterStep) {
    let FighterStep {
        state,
        motion,
        stamina,
        vitals,
        buffs,
        intent,
    } = fighter;

    // Выбывшие: только таймер терминального состояния
    if !vitals.is_alive() {
        if state.action.is_terminal() {
            state.timer += ctx.dt;
        }
        return;
    }

    // Захваченный полностью ведётся грабером
    if state.action == ActionState::Grabbed {
        state.timer += ctx.dt;
        motion.velocity = Vec3::ZERO;
        return;
    }

    if state.in_hitstop() {
        return;
    }

    state.timer += ctx.dt;
    state.combo_timer = (state.combo_timer - ctx.dt).max(0.0);

    if state.action.is_free() {
        step_free(ctx, state, motion, stamina, buffs, intent);
    } else {
        step_action(ctx, state, motion, intent);
    }
}

/// Смена free состояния без сброса таймера, если состояние не меняется
fn switch_free(state: &mut FighterState, action: ActionState) {
    if state.action != action {
        state.enter(action);
    }
}

fn step_free(
    ctx: &StepContext,
    state: &mut FighterState,
    motion: &mut Motion,
    stamina: &mut Stamina,
    buffs: &Buffs,
    intent: &Intent,
) {
    let tuning = ctx.tuning;

    if !motion.grounded {
        step_airborne(ctx, state, motion, intent);
        return;
    }

    if intent.jump {
        motion.velocity.y = tuning.jump_speed;
        motion.grounded = false;
        state.enter(ActionState::Jump);
        return;
    }

    if intent.light_attack {
        // Со спринта — сразу финишер с усиленным выпадом
        if state.action == ActionState::Sprint {
            state.enter(ActionState::Light3);
            state.sprint_attack = true;
            state.combo = 3;
        } else {
            state.enter(ActionState::Light1);
            state.sprint_attack = false;
            state.combo = 1;
        }
        state.combo_timer = 0.0;
        return;
    }

    if intent.heavy_charge {
        state.enter(ActionState::HeavyCharge);
        state.charge_time = 0.0;
        motion.stop_planar();
        return;
    }

    if intent.dodge && stamina.consume(tuning.dodge_cost, tuning.action_regen_delay) {
        if intent.is_moving() {
            motion.facing = intent.movement.x.atan2(intent.movement.y);
        }
        state.enter(ActionState::Dodge);
        return;
    }

    if intent.grab
        && stamina.consume(tuning.grab_cost_for(buffs.throw_up), tuning.action_regen_delay)
    {
        state.enter(ActionState::Grab);
        return;
    }

    if intent.block {
        state.enter(ActionState::Block);
        motion.stop_planar();
        return;
    }

    if intent.is_moving() {
        let direction = intent.movement.clamp_length_max(1.0);
        motion.facing = direction.x.atan2(direction.y);

        let sprinting = intent.sprint && stamina.current > 0.0;
        let speed = if sprinting {
            stamina.drain(tuning.sprint_drain * ctx.dt, tuning.sprint_regen_delay);
            tuning.sprint_speed
        } else {
            tuning.walk_speed
        };

        motion.velocity.x = direction.x * speed;
        motion.velocity.z = direction.y * speed;
        switch_free(
            state,
            if sprinting {
                ActionState::Sprint
            } else {
                ActionState::Walk
            },
        );
        return;
    }

    motion.damp_planar(tuning.idle_friction, ctx.dt);
    switch_free(state, ActionState::Idle);
}

/// В воздухе: ограниченный air control, dive strike на падении
fn step_airborne(ctx: &StepContext, state: &mut FighterState, motion: &mut Motion, intent: &Intent) {
    let tuning = ctx.tuning;

    if intent.is_moving() {
        let direction = intent.movement.clamp_length_max(1.0);
        motion.velocity.x += direction.x * tuning.air_accel * ctx.dt;
        motion.velocity.z += direction.y * tuning.air_accel * ctx.dt;

        let planar = Vec2::new(motion.velocity.x, motion.velocity.z);
        if planar.length() > tuning.max_air_speed {
            let capped = planar.normalize() * tuning.max_air_speed;
            motion.velocity.x = capped.x;
            motion.velocity.z = capped.y;
        }
    }

    if intent.light_attack && motion.velocity.y < 0.0 {
        state.enter(ActionState::DiveStrike);
        state.combo = 0;
        motion.velocity.y = -tuning.dive_speed;
        return;
    }

    switch_free(
        state,
        if motion.velocity.y > 0.0 {
            ActionState::Jump
        } else {
            ActionState::Fall
        },
    );
}

fn step_action(ctx: &StepContext, state: &mut FighterState, motion: &mut Motion, intent: &Intent) {
    let Some(spec) = ctx.table.get(state.action) else {
        // Таблица проверяется на старте; сюда попасть не должны
        crate::logger::log_warning(&format!("⚠️ No state spec for {:?}, back to Idle", state.action));
        state.exit_to_idle(motion);
        return;
    };

    if state.action == ActionState::HeavyCharge {
        state.charge_time += ctx.dt;
    }

    // Буфер комбо: повторное нажатие во время light атаки
    if state.action.is_light() && intent.light_attack {
        state.combo_timer = ctx.tuning.combo_window;
    }

    if let Some(phase) = spec.phase_at(state.timer).copied() {
        state.invulnerable = phase.invulnerable;
        apply_velocity(ctx, state, motion, phase.velocity);
    }

    let finished = match spec.exit {
        ExitRule::AttackFinished => ctx
            .catalog
            .get(state.action)
            .map_or(true, |def| state.timer >= def.duration),
        ExitRule::Elapsed { after } => state.timer >= after,
        ExitRule::ElapsedGrounded { after } => state.timer >= after && motion.grounded,
        ExitRule::Released(HeldInput::Block) => !intent.block,
        ExitRule::Released(HeldInput::HeavyCharge) => !intent.heavy_charge,
        ExitRule::Landed { after } => state.timer >= after && motion.grounded,
        ExitRule::Scripted => false,
    };

    if !finished {
        return;
    }

    // Продолжение комбо, если окно открыто
    if let Some(combo_next) = spec.combo_next {
        if state.combo_timer > 0.0 {
            state.enter(combo_next);
            state.combo = state.combo.saturating_add(1);
            state.combo_timer = 0.0;
            return;
        }
    }

    if matches!(spec.exit, ExitRule::Landed { .. }) {
        state.bounce_count = state
            .bounce_count
            .saturating_add(1)
            .min(ctx.tuning.bounce_cap);
    }

    if state.action.is_light() {
        state.combo = 0;
    }

    match spec.next {
        ActionState::Idle => state.exit_to_idle(motion),
        next => state.enter(next),
    }
}

fn apply_velocity(ctx: &StepContext, state: &FighterState, motion: &mut Motion, policy: VelocityPolicy) {
    match policy {
        VelocityPolicy::Keep => {}
        VelocityPolicy::Stop => motion.stop_planar(),
        VelocityPolicy::Freeze => motion.velocity = Vec3::ZERO,
        VelocityPolicy::Lunge { speed } => {
            let speed = if state.sprint_attack {
                speed * ctx.tuning.sprint_lunge_multiplier
            } else {
                speed
            };
            motion.lunge(speed);
        }
        VelocityPolicy::Damp { factor } => motion.damp_planar(factor, ctx.dt),
        VelocityPolicy::StopWhenGrounded => {
            if motion.grounded {
                motion.stop_planar();
            }
        }
    }
}
