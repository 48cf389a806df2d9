//! Tuning ресурсы симуляции
//!
//! Все числа это данные, а не логика: state machine и physics читают их через `Res<...>`.
//! Коэффициенты затухания записаны "за один 60Hz тик" (см. `damping_for`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Параметры тика
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Частота FixedUpdate
    pub tick_hz: f64,
    /// Верхняя граница dt (после фризов не прыгаем на огромный шаг)
    pub max_dt: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            max_dt: 0.05,
        }
    }
}

impl SimConfig {
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        dt.clamp(0.0, self.max_dt)
    }

    pub fn fixed_dt(&self) -> f32 {
        (1.0 / self.tick_hz) as f32
    }
}

/// Параметры бойца: скорости, стоимости, окна, множители
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterTuning {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    /// Расход stamina при спринте (units/sec)
    pub sprint_drain: f32,
    pub jump_speed: f32,
    /// Air control (units/sec²)
    pub air_accel: f32,
    pub max_air_speed: f32,
    /// Скорость падения при DiveStrike
    pub dive_speed: f32,
    /// Трение в Idle (за 60Hz тик)
    pub idle_friction: f32,

    pub combo_window: f32,
    pub sprint_lunge_multiplier: f32,

    pub dodge_cost: f32,
    pub grab_cost: f32,
    /// Throw-up бафф удешевляет захват
    pub throw_grab_discount: f32,
    pub action_regen_delay: f32,
    pub sprint_regen_delay: f32,

    pub boosted_max_stamina: f32,
    pub stamina_up_bonus: f32,
    /// Regen-up: сколько процентов урона снимается в секунду
    pub regen_heal_rate: f32,

    pub block_damage_factor: f32,
    pub block_knockback_factor: f32,
    /// Импульс отталкивания атакующего от блока
    pub block_push: f32,

    pub grab_fail_self_damage: f32,
    pub grab_hold_duration: f32,
    pub slam_delay: f32,
    /// Куда тянем захваченного (перед грабером)
    pub hold_distance: f32,
    /// Экспоненциальное подтягивание (за 60Hz тик)
    pub hold_drag: f32,

    pub damage_up_multiplier: f32,
    pub throw_knockback_multiplier: f32,
    pub throw_slam_damage_multiplier: f32,

    /// Прирост knockback на каждые 100% урона
    pub knockback_growth: f32,
    /// Урон, начиная с которого неподбрасывающий удар роняет (Knockback)
    pub tumble_damage_threshold: f32,
    /// Доля горизонтального knockback, уходящая вверх при Knockback
    pub tumble_lift: f32,
    /// Процент, на котором удар отправляет в KO
    pub ko_percent: f32,
    pub bounce_cap: u8,
}

impl Default for FighterTuning {
    fn default() -> Self {
        Self {
            walk_speed: 6.5,
            sprint_speed: 10.5,
            sprint_drain: 15.0,
            jump_speed: 13.0,
            air_accel: 36.0,
            max_air_speed: 8.0,
            dive_speed: 15.0,
            idle_friction: 0.8,

            combo_window: 0.45,
            sprint_lunge_multiplier: 2.0,

            dodge_cost: 20.0,
            grab_cost: 25.0,
            throw_grab_discount: 0.6,
            action_regen_delay: 0.5,
            sprint_regen_delay: 0.4,

            boosted_max_stamina: 130.0,
            stamina_up_bonus: 30.0,
            regen_heal_rate: 3.0,

            block_damage_factor: 0.25,
            block_knockback_factor: 0.3,
            block_push: 6.0,

            grab_fail_self_damage: 5.0,
            grab_hold_duration: 0.5,
            slam_delay: 0.3,
            hold_distance: 0.75,
            hold_drag: 0.18,

            damage_up_multiplier: 1.3,
            throw_knockback_multiplier: 1.5,
            throw_slam_damage_multiplier: 1.3,

            knockback_growth: 0.7,
            tumble_damage_threshold: 18.0,
            tumble_lift: 0.3,
            ko_percent: 300.0,
            bounce_cap: 3,
        }
    }
}

impl FighterTuning {
    pub fn grab_cost_for(&self, throw_up: bool) -> f32 {
        if throw_up {
            self.grab_cost * self.throw_grab_discount
        } else {
            self.grab_cost
        }
    }
}

/// Геометрия арены и параметры интегратора
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub gravity: f32,
    pub terminal_fall_speed: f32,
    /// Затухание knockback (1/sec): горизонталь быстрее вертикали
    pub knockback_decay_horizontal: f32,
    pub knockback_decay_vertical: f32,
    pub ground_y: f32,
    /// Радиус платформы (за ним земли нет)
    pub arena_radius: f32,
    pub ringout_radius: f32,
    pub death_plane_y: f32,
    pub min_bounce_impact: f32,
    pub bounce_restitution: f32,
    pub bounce_knockback_damping: f32,
    pub separation_distance: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            gravity: -35.0,
            terminal_fall_speed: 30.0,
            knockback_decay_horizontal: 3.5,
            knockback_decay_vertical: 1.5,
            ground_y: 0.0,
            arena_radius: 26.0,
            ringout_radius: 30.0,
            death_plane_y: -12.0,
            min_bounce_impact: 5.0,
            bounce_restitution: 0.3,
            bounce_knockback_damping: 0.45,
            separation_distance: 0.9,
        }
    }
}

/// Подбираемые баффы на арене
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub enabled: bool,
    /// Первый предмет через N секунд после старта раунда
    pub first_spawn: f32,
    pub spawn_interval: f32,
    pub max_items: usize,
    pub spawn_radius_min: f32,
    pub spawn_radius_max: f32,
    /// Квадрат дистанции подбора (по горизонтали)
    pub pickup_distance_sq: f32,
    pub lifetime: f32,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            first_spawn: 3.0,
            spawn_interval: 8.0,
            max_items: 4,
            spawn_radius_min: 4.0,
            spawn_radius_max: 20.0,
            pickup_distance_sq: 2.5,
            lifetime: 25.0,
        }
    }
}
