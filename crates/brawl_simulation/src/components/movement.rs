//! Movement компоненты: скорости, направление взгляда, намерение (Intent)

use bevy::prelude::*;

/// Частота, под которую записаны per-tick коэффициенты затухания.
///
/// `factor` за один 60Hz тик → `factor^(dt * 60)` при любом dt.
pub const DAMPING_REFERENCE_HZ: f32 = 60.0;

/// Per-tick коэффициент, пересчитанный под произвольный dt
pub fn damping_for(factor: f32, dt: f32) -> f32 {
    factor.clamp(0.0, 1.0).powf(dt * DAMPING_REFERENCE_HZ)
}

/// Кинематика бойца
///
/// - `velocity` — скорость от состояния (ходьба, выпад, прыжок)
/// - `knockback` — отдельный импульс от ударов, затухает сам по себе
///
/// Итоговое смещение за тик: (velocity + knockback) * dt.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Motion {
    pub velocity: Vec3,
    pub knockback: Vec3,
    /// Угол взгляда (рад), forward = (sin, 0, cos)
    pub facing: f32,
    pub grounded: bool,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            knockback: Vec3::ZERO,
            facing: 0.0,
            grounded: true,
        }
    }
}

impl Motion {
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.facing.sin(), 0.0, self.facing.cos())
    }

    /// Выпад вдоль facing (горизонталь), вертикаль не трогаем
    pub fn lunge(&mut self, speed: f32) {
        let forward = self.forward() * speed;
        self.velocity.x = forward.x;
        self.velocity.z = forward.z;
    }

    pub fn stop_planar(&mut self) {
        self.velocity.x = 0.0;
        self.velocity.z = 0.0;
    }

    pub fn damp_planar(&mut self, factor: f32, dt: f32) {
        let k = damping_for(factor, dt);
        self.velocity.x *= k;
        self.velocity.z *= k;
    }

    pub fn planar_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Намерение бойца на текущий тик
///
/// Пишется снаружи (input mapping или AI), ядро не знает источник.
/// `movement`: x → мировая X, y → мировая Z.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Intent {
    pub movement: Vec2,
    pub sprint: bool,
    pub jump: bool,
    pub light_attack: bool,
    pub heavy_charge: bool,
    pub dodge: bool,
    pub grab: bool,
    pub block: bool,
}

impl Intent {
    /// Длина вектора движения ниже порога: считаем что стоим
    pub const MOVE_DEADZONE: f32 = 0.1;

    pub fn is_moving(&self) -> bool {
        self.movement.length() > Self::MOVE_DEADZONE
    }

    pub fn light() -> Self {
        Self {
            light_attack: true,
            ..default()
        }
    }

    pub fn grab() -> Self {
        Self {
            grab: true,
            ..default()
        }
    }

    pub fn block() -> Self {
        Self {
            block: true,
            ..default()
        }
    }

    pub fn heavy() -> Self {
        Self {
            heavy_charge: true,
            ..default()
        }
    }

    pub fn dodge() -> Self {
        Self {
            dodge: true,
            ..default()
        }
    }

    pub fn walk(direction: Vec2) -> Self {
        Self {
            movement: direction,
            ..default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_matches_facing() {
        let motion = Motion::default();
        assert!((motion.forward() - Vec3::Z).length() < 1e-6);

        let motion = Motion {
            facing: std::f32::consts::FRAC_PI_2,
            ..default()
        };
        assert!((motion.forward() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_damping_reference_tick() {
        // Один 60Hz тик = ровно factor
        assert!((damping_for(0.8, 1.0 / 60.0) - 0.8).abs() < 1e-5);
        // Два тика по 1/120 = тот же результат, что один по 1/60
        let half = damping_for(0.8, 1.0 / 120.0);
        assert!((half * half - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_lunge_keeps_vertical() {
        let mut motion = Motion {
            velocity: Vec3::new(0.0, 4.0, 0.0),
            ..default()
        };
        motion.lunge(5.0);
        assert_eq!(motion.velocity.y, 4.0);
        assert!((motion.velocity.z - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_intent_deadzone() {
        assert!(!Intent::walk(Vec2::new(0.05, 0.0)).is_moving());
        assert!(Intent::walk(Vec2::new(0.0, 1.0)).is_moving());
    }
}
