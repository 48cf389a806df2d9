//! Hit resolution: активные hitbox'ы → попадания, захваты, реакции целей
//!
//! Сканирование в порядке slot. Первая подходящая цель (не ближайшая) получает удар,
//! latch `attack_hit` гарантирует максимум одно попадание за активацию.
//! Состояние читается заново для каждого атакующего: удар по атакующему, который
//! стоит в списке позже, прерывает его атаку в этом же тике.

use bevy::prelude::*;

use crate::combat::catalog::{AttackCatalog, AttackDef, AttackKind};
use crate::combat::damage::{in_attack_cone, knockback_direction, knockback_scale, strike_numbers};
use crate::combat::systems::grab::sever_grab;
use crate::components::{slot_order, ActionState, Buffs, FighterData};
use crate::config::FighterTuning;
use crate::tick::{Elimination, EliminationCause, HitResult, TickReport};

/// Снимок атакующего на момент сканирования
#[derive(Debug, Clone, Copy)]
struct AttackerView {
    entity: Entity,
    position: Vec3,
    facing: f32,
    action: ActionState,
    charge_time: f32,
    buffs: Buffs,
    def: AttackDef,
}

/// Система: найти и применить попадания этого тика
pub fn resolve_hits(
    tuning: Res<FighterTuning>,
    catalog: Res<AttackCatalog>,
    mut report: ResMut<TickReport>,
    mut fighters: Query<FighterData>,
) {
    let order = slot_order(&fighters);

    for &attacker in &order {
        let Some(view) = active_attack(&fighters, attacker, &catalog) else {
            continue;
        };

        let target = order.iter().copied().find(|&candidate| {
            candidate != attacker && is_valid_target(&fighters, candidate, &view)
        });
        let Some(target) = target else {
            continue;
        };

        match view.def.kind {
            AttackKind::Grab => resolve_grab(&mut fighters, &tuning, &mut report, &view, target),
            AttackKind::Strike => {
                let ratio = if view.action == ActionState::HeavyRelease {
                    catalog.charge_ratio(view.charge_time)
                } else {
                    0.0
                };
                resolve_strike(&mut fighters, &tuning, &mut report, &view, target, ratio);
            }
            AttackKind::Throw => {}
        }
    }
}

/// Атака активна: жив, не в hitstop, timer в окне, latch не взведён
fn active_attack(
    fighters: &Query<FighterData>,
    entity: Entity,
    catalog: &AttackCatalog,
) -> Option<AttackerView> {
    let fighter = fighters.get(entity).ok()?;
    if !fighter.vitals.is_alive() || fighter.state.in_hitstop() || fighter.state.attack_hit {
        return None;
    }

    let def = *catalog.get(fighter.state.action)?;
    if def.kind == AttackKind::Throw || !def.in_hit_window(fighter.state.timer) {
        return None;
    }

    Some(AttackerView {
        entity,
        position: fighter.transform.translation,
        facing: fighter.motion.facing,
        action: fighter.state.action,
        charge_time: fighter.state.charge_time,
        buffs: *fighter.buffs,
        def,
    })
}

fn is_valid_target(fighters: &Query<FighterData>, entity: Entity, view: &AttackerView) -> bool {
    let Ok(target) = fighters.get(entity) else {
        return false;
    };
    if !target.vitals.is_alive() || target.state.invulnerable {
        return false;
    }
    // Уже захваченного повторно не захватить
    if view.def.kind == AttackKind::Grab && target.state.action == ActionState::Grabbed {
        return false;
    }
    in_attack_cone(view.position, view.facing, target.transform.translation, &view.def)
}

fn resolve_grab(
    fighters: &mut Query<FighterData>,
    tuning: &FighterTuning,
    report: &mut TickReport,
    view: &AttackerView,
    target: Entity,
) {
    let attacker = view.entity;
    let Ok(target_view) = fighters.get(target) else {
        return;
    };
    let target_action = target_view.state.action;

    // Атака бьёт захват
    if target_action.is_attacking() {
        let mut is_ko = false;
        if let Ok(mut grabber) = fighters.get_mut(attacker) {
            grabber.state.attack_hit = true;
            grabber.vitals.take_damage(tuning.grab_fail_self_damage);
            grabber.state.enter(ActionState::Hitstun);
            grabber.motion.stop_planar();

            if grabber.vitals.damage_percent >= tuning.ko_percent {
                is_ko = true;
                grabber.vitals.alive = false;
                grabber.state.enter(ActionState::KnockedOut);
            }
        }
        crate::logger::log(&format!(
            "🤲 Grab failed: {:?} grabbed attacking {:?} ({:?})",
            attacker, target, target_action
        ));
        if is_ko {
            crate::logger::log_info(&format!("💀 {:?} knocked out by a failed grab", attacker));
            report.eliminations.push(Elimination {
                entity: attacker,
                cause: EliminationCause::KnockedOut,
            });
        }
        return;
    }

    // Цель сама кого-то держала — жертва освобождается
    sever_grab(fighters, target);

    if let Ok(mut grabber) = fighters.get_mut(attacker) {
        grabber.state.attack_hit = true;
        grabber.state.enter(ActionState::GrabHold);
        grabber.motion.stop_planar();
        grabber.grab.target = Some(target);
    }

    if let Ok(mut victim) = fighters.get_mut(target) {
        victim.state.enter(ActionState::Grabbed);
        // Захваченный не интегрируется, остаток hitstop иначе всплывёт после slam
        victim.state.hitstop = 0.0;
        victim.state.combo = 0;
        victim.state.sprint_attack = false;
        victim.motion.velocity = Vec3::ZERO;
        victim.motion.knockback = Vec3::ZERO;
        victim.grab.grabbed_by = Some(attacker);
    }

    crate::logger::log_info(&format!("🤲 Grab: {:?} holds {:?}", attacker, target));

    report.hits.push(HitResult {
        attacker,
        target,
        attack: view.action,
        damage: 0.0,
        knockback: 0.0,
        is_ko: false,
        is_grab: true,
        blocked: false,
    });
}

fn resolve_strike(
    fighters: &mut Query<FighterData>,
    tuning: &FighterTuning,
    report: &mut TickReport,
    view: &AttackerView,
    target: Entity,
    charge_ratio: f32,
) {
    let attacker = view.entity;
    let Ok(target_view) = fighters.get(target) else {
        return;
    };
    let target_pos = target_view.transform.translation;
    let target_blocking = target_view.state.action == ActionState::Block;
    let target_linked = target_view.grab.is_linked();

    let numbers = strike_numbers(&view.def, charge_ratio, &view.buffs, target_blocking, tuning);
    let direction = knockback_direction(view.position, view.facing, target_pos);

    if target_linked {
        sever_grab(fighters, target);
    }

    let mut is_ko = false;
    let mut scaled_knockback = numbers.knockback;

    if let Ok(mut victim) = fighters.get_mut(target) {
        victim.vitals.take_damage(numbers.damage);
        let scale = knockback_scale(victim.vitals.damage_percent, tuning.knockback_growth);
        scaled_knockback = numbers.knockback * scale;
        let planar = direction * scaled_knockback;

        if numbers.blocked {
            // Блок держится, цель только немного сдвигает
            victim.motion.knockback = planar;
        } else if numbers.launch > 0.0 {
            victim.state.enter(ActionState::Launched);
            victim.state.bounce_count = 0;
            victim.motion.stop_planar();
            victim.motion.velocity.y = 0.0;
            victim.motion.knockback = Vec3::new(planar.x, numbers.launch * scale, planar.z);
            victim.motion.grounded = false;
        } else if view.def.heavy || numbers.damage >= tuning.tumble_damage_threshold {
            victim.state.enter(ActionState::Knockback);
            victim.motion.stop_planar();
            victim.motion.knockback = Vec3::new(planar.x, scaled_knockback * tuning.tumble_lift, planar.z);
            victim.motion.grounded = false;
        } else {
            victim.state.enter(ActionState::Hitstun);
            victim.motion.stop_planar();
            victim.motion.knockback = planar;
        }

        if !numbers.blocked {
            victim.state.combo = 0;
            victim.state.sprint_attack = false;
        }
        victim.state.hitstop = victim.state.hitstop.max(view.def.hitstop);

        if victim.vitals.damage_percent >= tuning.ko_percent {
            is_ko = true;
            victim.vitals.alive = false;
            victim.state.enter(ActionState::KnockedOut);
        }
    }

    if let Ok(mut striker) = fighters.get_mut(attacker) {
        striker.state.attack_hit = true;
        striker.state.hitstop = striker.state.hitstop.max(view.def.hitstop);

        if numbers.blocked {
            striker.state.enter(ActionState::BlockStagger);
            striker.state.combo = 0;
            striker.state.sprint_attack = false;
            striker.motion.velocity.x = -direction.x * tuning.block_push;
            striker.motion.velocity.z = -direction.z * tuning.block_push;
        }
    }

    crate::logger::log_info(&format!(
        "⚔️ Hit: {:?} → {:?} with {:?} ({:.1}% dmg, kb {:.1}{}{})",
        attacker,
        target,
        view.action,
        numbers.damage,
        scaled_knockback,
        if numbers.blocked { ", blocked" } else { "" },
        if is_ko { ", KO" } else { "" }
    ));

    report.hits.push(HitResult {
        attacker,
        target,
        attack: view.action,
        damage: numbers.damage,
        knockback: scaled_knockback,
        is_ko,
        is_grab: false,
        blocked: numbers.blocked,
    });
    if is_ko {
        report.eliminations.push(Elimination {
            entity: target,
            cause: EliminationCause::KnockedOut,
        });
    }
}
