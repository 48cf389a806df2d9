//! Damage/knockback расчёты (чистые функции, без ECS)
//!
//! Модель процентов: урон копится в `Vitals::damage_percent` и усиливает
//! отбрасывание. Процент сам по себе не убивает (кроме KO порога).

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

use crate::combat::catalog::AttackDef;
use crate::components::Buffs;
use crate::config::FighterTuning;

/// Множитель knockback от накопленного процента
///
/// 1 + (percent / 100) * growth — монотонно не убывает по percent.
pub fn knockback_scale(percent: f32, growth: f32) -> f32 {
    1.0 + percent.max(0.0) / 100.0 * growth.max(0.0)
}

/// Угол → [-π, π]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid может вернуть ровно TAU из-за округления
    if wrapped < -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Facing, смотрящий из `from` в `to` (в плоскости XZ)
pub fn facing_towards(from: Vec3, to: Vec3) -> f32 {
    (to.x - from.x).atan2(to.z - from.z)
}

/// Горизонтальная дистанция (Y игнорируется)
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(b.x - a.x, b.z - a.z).length()
}

/// Попадает ли цель в конус атаки: дистанция ≤ range и |угол| ≤ half-angle
///
/// Совпадающие позиции дают направление atan2(0, 0) = 0 (+Z), дальше обычная проверка угла.
pub fn in_attack_cone(attacker_pos: Vec3, facing: f32, target_pos: Vec3, def: &AttackDef) -> bool {
    let distance = planar_distance(attacker_pos, target_pos);
    if distance > def.range {
        return false;
    }
    let offset = wrap_angle(facing_towards(attacker_pos, target_pos) - facing);
    offset.abs() <= def.half_angle_rad()
}

/// Направление отбрасывания: attacker → target, вплотную — по facing атакующего
pub fn knockback_direction(attacker_pos: Vec3, attacker_facing: f32, target_pos: Vec3) -> Vec3 {
    let delta = Vec3::new(target_pos.x - attacker_pos.x, 0.0, target_pos.z - attacker_pos.z);
    if delta.length() < 0.01 {
        Vec3::new(attacker_facing.sin(), 0.0, attacker_facing.cos())
    } else {
        delta.normalize()
    }
}

/// Итоговые числа удара до масштабирования по проценту цели
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeNumbers {
    pub damage: f32,
    pub knockback: f32,
    pub launch: f32,
    pub blocked: bool,
}

/// Catalog → заряд → баффы атакующего → блок цели
pub fn strike_numbers(
    def: &AttackDef,
    charge_ratio: f32,
    attacker_buffs: &Buffs,
    target_blocking: bool,
    tuning: &FighterTuning,
) -> StrikeNumbers {
    let mut damage = def.damage.resolve(charge_ratio);
    let mut knockback = def.knockback.resolve(charge_ratio);
    let mut launch = def.launch.resolve(charge_ratio);

    if attacker_buffs.damage_up {
        damage *= tuning.damage_up_multiplier;
    }
    if attacker_buffs.throw_up {
        knockback *= tuning.throw_knockback_multiplier;
    }

    if target_blocking {
        damage *= tuning.block_damage_factor;
        knockback *= tuning.block_knockback_factor;
        launch = 0.0;
    }

    StrikeNumbers {
        damage,
        knockback,
        launch,
        blocked: target_blocking,
    }
}

/// Бросок из захвата: фиксированные числа + баффы, без масштабирования по проценту
pub fn slam_numbers(def: &AttackDef, holder_buffs: &Buffs, tuning: &FighterTuning) -> StrikeNumbers {
    let mut damage = def.damage.base();
    let mut knockback = def.knockback.base();

    if holder_buffs.damage_up {
        damage *= tuning.damage_up_multiplier;
    }
    if holder_buffs.throw_up {
        damage *= tuning.throw_slam_damage_multiplier;
        knockback *= tuning.throw_knockback_multiplier;
    }

    StrikeNumbers {
        damage,
        knockback,
        launch: def.launch.base(),
        blocked: false,
    }
}
