//! Интегратор тела бойца: гравитация, затухание knockback, земля/отскок
//!
//! Работает после hit resolution: удар этого тика уже лежит в `Motion::knockback`.
//! Захваченные и выбывшие пропускаются, hitstop только отсчитывается.

use bevy::prelude::*;

use crate::components::{slot_order, ActionState, FighterData, FighterState, Motion};
use crate::config::{ArenaConfig, FighterTuning};
use crate::tick::SimClock;

/// Что произошло с телом за шаг (для тестов и логов)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEvent {
    /// Hitstop: только таймер
    Frozen,
    Airborne,
    Grounded,
    Landed,
    Bounced,
}

/// Один шаг интеграции тела
pub fn integrate_body(
    arena: &ArenaConfig,
    bounce_cap: u8,
    dt: f32,
    position: &mut Vec3,
    motion: &mut Motion,
    state: &mut FighterState,
) -> BodyEvent {
    if state.in_hitstop() {
        state.hitstop = (state.hitstop - dt).max(0.0);
        return BodyEvent::Frozen;
    }

    let was_grounded = motion.grounded;

    if !motion.grounded {
        motion.velocity.y = (motion.velocity.y + arena.gravity * dt).max(-arena.terminal_fall_speed);
    }

    // Knockback — импульс, а не постоянная скорость: горизонталь гаснет быстрее
    let horizontal = (-arena.knockback_decay_horizontal * dt).exp();
    let vertical = (-arena.knockback_decay_vertical * dt).exp();
    motion.knockback.x *= horizontal;
    motion.knockback.z *= horizontal;
    motion.knockback.y *= vertical;

    *position += (motion.velocity + motion.knockback) * dt;

    let over_platform = Vec2::new(position.x, position.z).length() <= arena.arena_radius;
    if !over_platform || position.y > arena.ground_y {
        motion.grounded = false;
        return BodyEvent::Airborne;
    }

    position.y = arena.ground_y;

    if was_grounded {
        motion.velocity.y = motion.velocity.y.max(0.0);
        motion.knockback.y = motion.knockback.y.max(0.0);
        return BodyEvent::Grounded;
    }

    let impact = -(motion.velocity.y + motion.knockback.y);
    let can_bounce = state.action.is_tumbling()
        && impact > arena.min_bounce_impact
        && state.bounce_count < bounce_cap;

    if can_bounce {
        motion.velocity.y = impact * arena.bounce_restitution;
        motion.knockback.y = 0.0;
        motion.knockback.x *= arena.bounce_knockback_damping;
        motion.knockback.z *= arena.bounce_knockback_damping;
        motion.grounded = false;
        state.bounce_count += 1;
        state.enter(ActionState::GroundBounce);
        return BodyEvent::Bounced;
    }

    motion.velocity.y = 0.0;
    motion.knockback.y = 0.0;
    motion.grounded = true;
    BodyEvent::Landed
}

/// Ring-out: ниже death plane или дальше внешнего радиуса (по горизонтали)
pub fn is_ring_out(position: Vec3, arena: &ArenaConfig) -> bool {
    position.y < arena.death_plane_y
        || Vec2::new(position.x, position.z).length() > arena.ringout_radius
}

/// Сдвиг для пары слишком близких бойцов (половина перекрытия каждому)
///
/// Возвращает смещение для `b`; `a` сдвигается на противоположное.
pub fn separation_push(a: Vec3, b: Vec3, min_distance: f32) -> Option<Vec3> {
    let delta = Vec3::new(b.x - a.x, 0.0, b.z - a.z);
    let distance = delta.length();
    if distance >= min_distance || distance <= 0.01 {
        return None;
    }
    Some(delta / distance * (min_distance - distance) * 0.5)
}

/// Система: интеграция тел + регенерация ресурсов
pub fn integrate_bodies(
    clock: Res<SimClock>,
    arena: Res<ArenaConfig>,
    tuning: Res<FighterTuning>,
    mut fighters: Query<FighterData>,
) {
    let dt = clock.dt;

    for mut fighter in fighters.iter_mut() {
        if !fighter.vitals.is_alive() || fighter.state.action == ActionState::Grabbed {
            continue;
        }

        let event = integrate_body(
            &arena,
            tuning.bounce_cap,
            dt,
            &mut fighter.transform.translation,
            &mut *fighter.motion,
            &mut *fighter.state,
        );

        match event {
            BodyEvent::Frozen => continue,
            BodyEvent::Bounced => crate::logger::log(&format!(
                "🏀 {:?} bounced ({}/{})",
                fighter.entity, fighter.state.bounce_count, tuning.bounce_cap
            )),
            _ => {}
        }

        fighter.stamina.regenerate(dt);
        if fighter.buffs.regen_up {
            fighter.vitals.heal(tuning.regen_heal_rate * dt);
        }
    }
}

/// Система: раздвинуть слишком близких бойцов (позиционная коррекция, не импульс)
///
/// Пары обходятся в порядке slot, позиции обновляются по ходу прохода.
pub fn separate_fighters(arena: Res<ArenaConfig>, mut fighters: Query<FighterData>) {
    let order = slot_order(&fighters);

    let mut bodies: Vec<(Entity, Vec3)> = order
        .iter()
        .filter_map(|&entity| fighters.get(entity).ok())
        .filter(|f| f.vitals.is_alive() && f.state.action != ActionState::Grabbed)
        .map(|f| (f.entity, f.transform.translation))
        .collect();

    let mut moved = false;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if let Some(push) = separation_push(bodies[i].1, bodies[j].1, arena.separation_distance) {
                bodies[i].1 -= push;
                bodies[j].1 += push;
                moved = true;
            }
        }
    }

    if !moved {
        return;
    }

    for (entity, position) in bodies {
        if let Ok(mut fighter) = fighters.get_mut(entity) {
            if fighter.transform.translation != position {
                fighter.transform.translation = position;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn airborne(velocity: Vec3) -> Motion {
        Motion {
            velocity,
            grounded: false,
            ..default()
        }
    }

    #[test]
    fn test_grounded_body_stays_on_ground() {
        let arena = ArenaConfig::default();
        let mut position = Vec3::ZERO;
        let mut motion = Motion::default();
        let mut state = FighterState::default();

        let event = integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        assert_eq!(event, BodyEvent::Grounded);
        assert_eq!(position, Vec3::ZERO);
        assert!(motion.grounded);
    }

    #[test]
    fn test_jump_arc_lands() {
        let arena = ArenaConfig::default();
        let mut position = Vec3::ZERO;
        let mut motion = airborne(Vec3::new(0.0, 13.0, 0.0));
        let mut state = FighterState::default();

        let mut landed = false;
        let mut peak: f32 = 0.0;
        for _ in 0..120 {
            let event = integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
            peak = peak.max(position.y);
            if event == BodyEvent::Landed {
                landed = true;
                break;
            }
        }

        assert!(landed);
        assert!(peak > 2.0);
        assert_eq!(position.y, 0.0);
        assert!(motion.grounded);
        assert_eq!(motion.velocity.y, 0.0);
    }

    #[test]
    fn test_terminal_fall_speed() {
        let arena = ArenaConfig::default();
        let mut position = Vec3::new(0.0, 500.0, 0.0);
        let mut motion = airborne(Vec3::ZERO);
        let mut state = FighterState::default();

        for _ in 0..300 {
            integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        }
        assert!((motion.velocity.y + 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_knockback_decays_to_zero() {
        let arena = ArenaConfig::default();
        let mut position = Vec3::ZERO;
        let mut motion = Motion {
            knockback: Vec3::new(10.0, 0.0, 0.0),
            ..default()
        };
        let mut state = FighterState::default();

        integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        let after_one = motion.knockback.x;
        assert!(after_one < 10.0 && after_one > 9.0);

        for _ in 0..600 {
            integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        }
        assert!(motion.knockback.x.abs() < 1e-3);
    }

    #[test]
    fn test_knockback_decay_independent_of_tick_rate() {
        let arena = ArenaConfig::default();
        let start = Motion {
            knockback: Vec3::new(12.0, 0.0, -6.0),
            ..default()
        };

        let mut coarse = start;
        let mut coarse_pos = Vec3::ZERO;
        integrate_body(&arena, 3, 1.0 / 30.0, &mut coarse_pos, &mut coarse, &mut FighterState::default());

        let mut fine = start;
        let mut fine_pos = Vec3::ZERO;
        let mut fine_state = FighterState::default();
        for _ in 0..2 {
            integrate_body(&arena, 3, 1.0 / 60.0, &mut fine_pos, &mut fine, &mut fine_state);
        }

        assert!((coarse.knockback - fine.knockback).length() < 1e-4);
        let expected = 12.0 * (-arena.knockback_decay_horizontal / 30.0).exp();
        assert!((fine.knockback.x - expected).abs() < 1e-4);
    }

    #[test]
    fn test_launched_bounces_until_cap() {
        let arena = ArenaConfig::default();
        let mut state = FighterState::default();
        state.enter(ActionState::Launched);

        let mut bounces = 0;
        for _ in 0..10 {
            // Каждый раз падаем быстро на землю
            let mut position = Vec3::new(0.0, 0.05, 0.0);
            let mut motion = airborne(Vec3::new(0.0, -20.0, 0.0));
            let event = integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
            if event == BodyEvent::Bounced {
                bounces += 1;
                assert_eq!(state.action, ActionState::GroundBounce);
                assert!((motion.velocity.y - 20.0 * 0.3).abs() < 1.0);
            } else {
                assert_eq!(event, BodyEvent::Landed);
            }
            assert!(state.bounce_count <= 3);
        }
        assert_eq!(bounces, 3);
    }

    #[test]
    fn test_slow_tumble_lands_without_bounce() {
        let arena = ArenaConfig::default();
        let mut state = FighterState::default();
        state.enter(ActionState::Launched);
        let mut position = Vec3::new(0.0, 0.01, 0.0);
        let mut motion = airborne(Vec3::new(0.0, -2.0, 0.0));

        let event = integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        assert_eq!(event, BodyEvent::Landed);
        assert_eq!(state.action, ActionState::Launched);
    }

    #[test]
    fn test_no_ground_outside_platform() {
        let arena = ArenaConfig::default();
        let mut position = Vec3::new(27.0, 0.0, 0.0);
        let mut motion = Motion::default();
        let mut state = FighterState::default();

        let event = integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        assert_eq!(event, BodyEvent::Airborne);
        assert!(!motion.grounded);

        for _ in 0..60 {
            integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        }
        assert!(position.y < -5.0);
    }

    #[test]
    fn test_hitstop_only_counts_down() {
        let arena = ArenaConfig::default();
        let mut position = Vec3::new(0.0, 3.0, 0.0);
        let mut motion = airborne(Vec3::new(1.0, 0.0, 0.0));
        let mut state = FighterState {
            hitstop: 0.05,
            ..default()
        };

        let event = integrate_body(&arena, 3, DT, &mut position, &mut motion, &mut state);
        assert_eq!(event, BodyEvent::Frozen);
        assert_eq!(position, Vec3::new(0.0, 3.0, 0.0));
        assert!((state.hitstop - (0.05 - DT)).abs() < 1e-6);
    }

    #[test]
    fn test_ring_out_predicate() {
        let arena = ArenaConfig::default();
        assert!(!is_ring_out(Vec3::ZERO, &arena));
        assert!(!is_ring_out(Vec3::new(29.0, 0.0, 0.0), &arena));
        assert!(is_ring_out(Vec3::new(31.0, 0.0, 0.0), &arena));
        assert!(is_ring_out(Vec3::new(0.0, 0.0, -31.0), &arena));
        assert!(is_ring_out(Vec3::new(0.0, -13.0, 0.0), &arena));
        // Высоко над ареной, но за радиусом: всё равно ring-out
        assert!(is_ring_out(Vec3::new(22.0, 40.0, 22.0), &arena));
    }

    #[test]
    fn test_separation_push_symmetric() {
        let push = separation_push(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), 0.9).unwrap();
        assert!((push - Vec3::new(0.2, 0.0, 0.0)).length() < 1e-5);

        assert!(separation_push(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.9).is_none());
        // Совпадающие позиции: направление не определено
        assert!(separation_push(Vec3::ZERO, Vec3::ZERO, 0.9).is_none());
    }
}
