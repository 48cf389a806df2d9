//! Tests for the character state machine step.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::combat::catalog::AttackCatalog;
    use crate::combat::systems::state_machine::{step_fighter, FighterStep, StepContext};
    use crate::combat::table::StateTable;
    use crate::components::{ActionState, Buffs, FighterState, Intent, Motion, Stamina, Vitals};
    use crate::config::FighterTuning;

    const DT: f32 = 1.0 / 60.0;

    /// Один боец без ECS: компоненты + таблицы
    struct Harness {
        tuning: FighterTuning,
        catalog: AttackCatalog,
        table: StateTable,
        state: FighterState,
        motion: Motion,
        stamina: Stamina,
        vitals: Vitals,
        buffs: Buffs,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                tuning: FighterTuning::default(),
                catalog: AttackCatalog::default(),
                table: StateTable::default(),
                state: FighterState::default(),
                motion: Motion::default(),
                stamina: Stamina::default(),
                vitals: Vitals::default(),
                buffs: Buffs::default(),
            }
        }

        fn step(&mut self, intent: Intent) {
            let ctx = StepContext {
                tuning: &self.tuning,
                catalog: &self.catalog,
                table: &self.table,
                dt: DT,
            };
            step_fighter(
                &ctx,
                FighterStep {
                    state: &mut self.state,
                    motion: &mut self.motion,
                    stamina: &mut self.stamina,
                    vitals: &self.vitals,
                    buffs: &self.buffs,
                    intent: &intent,
                },
            );
        }

        fn step_n(&mut self, intent: Intent, ticks: usize) {
            for _ in 0..ticks {
                self.step(intent);
            }
        }

        fn action(&self) -> ActionState {
            self.state.action
        }
    }

    #[test]
    fn test_light_starts_combo() {
        let mut h = Harness::new();
        h.step(Intent::light());

        assert_eq!(h.action(), ActionState::Light1);
        assert_eq!(h.state.combo, 1);
        assert!(!h.state.sprint_attack);
    }

    #[test]
    fn test_light_returns_to_idle_without_rebuffer() {
        let mut h = Harness::new();
        h.step(Intent::light());
        // 0.24s duration → 15 тиков + запас
        h.step_n(Intent::default(), 16);

        assert_eq!(h.action(), ActionState::Idle);
        assert_eq!(h.state.combo, 0);
    }

    #[test]
    fn test_combo_advances_when_pressed_in_window() {
        let mut h = Harness::new();
        h.step(Intent::light());
        h.step_n(Intent::default(), 5);
        h.step(Intent::light()); // буфер следующей ступени
        h.step_n(Intent::default(), 12);

        assert_eq!(h.action(), ActionState::Light2);
        assert_eq!(h.state.combo, 2);
    }

    #[test]
    fn test_sprint_light_is_finisher() {
        let mut h = Harness::new();
        let sprint = Intent {
            movement: Vec2::new(0.0, 1.0),
            sprint: true,
            ..default()
        };
        h.step(sprint);
        assert_eq!(h.action(), ActionState::Sprint);
        assert!(h.stamina.current < h.stamina.max);

        h.step(Intent::light());
        assert_eq!(h.action(), ActionState::Light3);
        assert!(h.state.sprint_attack);
        assert_eq!(h.state.combo, 3);

        // Первая фаза: выпад 5 * 2
        h.step(Intent::default());
        assert!((h.motion.planar_speed() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_walk_sets_facing_and_speed() {
        let mut h = Harness::new();
        h.step(Intent::walk(Vec2::new(1.0, 0.0)));

        assert_eq!(h.action(), ActionState::Walk);
        assert!((h.motion.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!((h.motion.velocity.x - 6.5).abs() < 1e-5);
    }

    #[test]
    fn test_dodge_without_stamina_is_ignored() {
        let mut h = Harness::new();
        h.stamina.current = 10.0;
        h.step(Intent::dodge());

        assert_eq!(h.action(), ActionState::Idle);
        assert_eq!(h.stamina.current, 10.0);
    }

    #[test]
    fn test_dodge_window_and_exit() {
        let mut h = Harness::new();
        h.step(Intent::dodge());
        assert_eq!(h.action(), ActionState::Dodge);
        assert_eq!(h.stamina.current, 80.0);
        assert!(h.state.invulnerable);

        // timer ~0.2: ещё i-frames
        h.step_n(Intent::default(), 12);
        assert!(h.state.invulnerable);
        assert!((h.motion.planar_speed() - 14.0).abs() < 1e-4);

        // timer ~0.25: окно закончилось, торможение
        h.step_n(Intent::default(), 3);
        assert_eq!(h.action(), ActionState::Dodge);
        assert!(!h.state.invulnerable);
        assert!(h.motion.planar_speed() < 14.0);

        h.step_n(Intent::default(), 8);
        assert_eq!(h.action(), ActionState::Idle);
        assert!(!h.state.invulnerable);
    }

    #[test]
    fn test_grab_cost_with_throw_buff() {
        let mut h = Harness::new();
        h.buffs.throw_up = true;
        h.step(Intent::grab());

        assert_eq!(h.action(), ActionState::Grab);
        assert!((h.stamina.current - 85.0).abs() < 1e-4);
    }

    #[test]
    fn test_heavy_charge_and_release() {
        let mut h = Harness::new();
        h.step(Intent::heavy());
        assert_eq!(h.action(), ActionState::HeavyCharge);

        h.step_n(Intent::heavy(), 120); // 2s — больше charge cap
        assert_eq!(h.action(), ActionState::HeavyCharge);
        assert!(h.state.charge_time > 1.9);

        h.step(Intent::default());
        assert_eq!(h.action(), ActionState::HeavyRelease);
        assert!(h.state.charge_time > 1.9); // заряд нужен hit resolution

        h.step_n(Intent::default(), 27);
        assert_eq!(h.action(), ActionState::Idle);
    }

    #[test]
    fn test_block_held_then_released() {
        let mut h = Harness::new();
        h.step_n(Intent::block(), 30);
        assert_eq!(h.action(), ActionState::Block);

        h.step(Intent::default());
        assert_eq!(h.action(), ActionState::Idle);
    }

    #[test]
    fn test_hitstop_freezes_timer() {
        let mut h = Harness::new();
        h.step(Intent::light());
        h.state.hitstop = 0.1;

        h.step_n(Intent::default(), 5);
        assert_eq!(h.state.timer, 0.0);
        assert_eq!(h.action(), ActionState::Light1);
    }

    #[test]
    fn test_falling_light_is_dive_strike() {
        let mut h = Harness::new();
        h.motion.grounded = false;
        h.motion.velocity.y = -2.0;

        h.step(Intent::light());
        assert_eq!(h.action(), ActionState::DiveStrike);
        assert_eq!(h.motion.velocity.y, -15.0);
    }

    #[test]
    fn test_rising_light_is_not_dive() {
        let mut h = Harness::new();
        h.motion.grounded = false;
        h.motion.velocity.y = 5.0;

        h.step(Intent::light());
        assert_eq!(h.action(), ActionState::Jump);
    }

    #[test]
    fn test_air_control_capped() {
        let mut h = Harness::new();
        h.motion.grounded = false;
        h.motion.velocity.y = -1.0;

        h.step_n(Intent::walk(Vec2::new(1.0, 0.0)), 60);
        assert!(h.motion.planar_speed() <= 8.0 + 1e-4);
        assert_eq!(h.action(), ActionState::Fall);
    }

    #[test]
    fn test_launched_landing_increments_bounce_capped() {
        let mut h = Harness::new();
        h.state.enter(ActionState::Launched);
        h.state.bounce_count = 3;
        h.motion.grounded = true;

        h.step_n(Intent::default(), 13);
        assert_eq!(h.action(), ActionState::GroundBounce);
        assert_eq!(h.state.bounce_count, 3);

        // GroundBounce 0.6s → Getup 0.4s → Idle
        h.step_n(Intent::default(), 37);
        assert_eq!(h.action(), ActionState::Getup);
        h.step_n(Intent::default(), 25);
        assert_eq!(h.action(), ActionState::Idle);
    }

    #[test]
    fn test_knockback_waits_for_ground() {
        let mut h = Harness::new();
        h.state.enter(ActionState::Knockback);
        h.motion.grounded = false;

        h.step_n(Intent::default(), 60);
        assert_eq!(h.action(), ActionState::Knockback);

        h.motion.grounded = true;
        h.step(Intent::default());
        assert_eq!(h.action(), ActionState::Idle);
    }

    #[test]
    fn test_dead_fighter_only_runs_terminal_timer() {
        let mut h = Harness::new();
        h.state.enter(ActionState::RingOut);
        h.vitals.alive = false;

        h.step(Intent::light());
        assert_eq!(h.action(), ActionState::RingOut);
        assert!((h.state.timer - DT).abs() < 1e-6);
    }

    #[test]
    fn test_grabbed_ignores_intent() {
        let mut h = Harness::new();
        h.state.enter(ActionState::Grabbed);
        h.motion.velocity = Vec3::new(3.0, 2.0, 1.0);

        h.step(Intent::dodge());
        assert_eq!(h.action(), ActionState::Grabbed);
        assert_eq!(h.motion.velocity, Vec3::ZERO);
        assert_eq!(h.stamina.current, 100.0);
    }
}
