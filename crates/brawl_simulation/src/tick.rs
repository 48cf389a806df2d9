//! Тик симуляции: расписание, порядок фаз, отчёт тика
//!
//! Порядок внутри тика фиксирован:
//! Prepare → StateMachine → HitResolution → Physics → Elimination → Pickups
//!
//! Удар, зарегистрированный в этом тике, сразу влияет на physics этого же тика.

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

use crate::components::{ActionState, BuffKind};
use crate::config::SimConfig;

/// Расписание одного шага симуляции (запускается через `advance_tick`)
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationTick;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Prepare,
    StateMachine,
    HitResolution,
    Physics,
    Elimination,
    Pickups,
}

/// Время текущего тика (dt уже ограничен `SimConfig::max_dt`)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub dt: f32,
    pub tick: u64,
    pub elapsed: f32,
}

/// Запись об успешном попадании (удар, захват или бросок)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub attacker: Entity,
    pub target: Entity,
    pub attack: ActionState,
    pub damage: f32,
    pub knockback: f32,
    pub is_ko: bool,
    pub is_grab: bool,
    pub blocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationCause {
    KnockedOut,
    RingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elimination {
    pub entity: Entity,
    pub cause: EliminationCause,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub fighter: Entity,
    pub kind: BuffKind,
}

/// Всё, что произошло за тик (для audio/VFX/scoring снаружи)
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub hits: Vec<HitResult>,
    pub eliminations: Vec<Elimination>,
    pub pickups: Vec<Pickup>,
}

impl TickReport {
    pub fn clear(&mut self) {
        self.hits.clear();
        self.eliminations.clear();
        self.pickups.clear();
    }
}

/// Prepare: отчёт прошлого тика больше не нужен
pub fn begin_tick(clock: Res<SimClock>, mut report: ResMut<TickReport>) {
    report.clear();
    report.tick = clock.tick;
}

/// Один шаг симуляции (точка входа внешнего цикла)
///
/// dt ограничивается сверху; отрицательный dt превращается в 0.
pub fn advance_tick(world: &mut World, dt: f32) -> TickReport {
    let dt = world
        .get_resource::<SimConfig>()
        .map(|config| config.clamp_dt(dt))
        .unwrap_or_else(|| SimConfig::default().clamp_dt(dt));

    {
        let mut clock = world.get_resource_or_insert_with(SimClock::default);
        clock.dt = dt;
        clock.tick += 1;
        clock.elapsed += dt;
    }

    if let Err(err) = world.try_run_schedule(SimulationTick) {
        crate::logger::log_error(&format!("❌ SimulationTick failed to run: {}", err));
        return TickReport::default();
    }

    world.get_resource::<TickReport>().cloned().unwrap_or_default()
}

/// FixedUpdate → один SimulationTick с фиксированным dt
pub fn run_fixed_tick(world: &mut World) {
    let Some(dt) = world
        .get_resource::<Time<Fixed>>()
        .map(|time| time.delta_secs())
    else {
        return;
    };
    advance_tick(world, dt);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tick_clamps_dt_and_counts() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.init_resource::<TickReport>();
        world.add_schedule(Schedule::new(SimulationTick));

        let report = advance_tick(&mut world, 1.0);
        assert_eq!(report.tick, 0); // begin_tick не зарегистрирован — отчёт не тронут

        let clock = *world.resource::<SimClock>();
        assert_eq!(clock.tick, 1);
        assert_eq!(clock.dt, 0.05);

        advance_tick(&mut world, 1.0 / 60.0);
        let clock = *world.resource::<SimClock>();
        assert_eq!(clock.tick, 2);
        assert!((clock.elapsed - (0.05 + 1.0 / 60.0)).abs() < 1e-6);
    }

    #[test]
    fn test_missing_schedule_returns_empty_report() {
        let mut world = World::new();
        let report = advance_tick(&mut world, 1.0 / 60.0);
        assert_eq!(report, TickReport::default());
    }
}
