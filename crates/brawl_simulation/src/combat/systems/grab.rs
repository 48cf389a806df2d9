//! Grab sub-protocol: hold → slam, проверка висячих ссылок, разрыв связи
//!
//! Связь симметрична: `A.target == Some(B)` ⇔ `B.grabbed_by == Some(A)`.
//! Любой разрыв чистит обе стороны в том же тике.

use bevy::prelude::*;

use crate::combat::catalog::AttackCatalog;
use crate::combat::damage::{slam_numbers, wrap_angle};
use crate::components::{damping_for, slot_order, ActionState, FighterData};
use crate::config::FighterTuning;
use crate::tick::{Elimination, EliminationCause, HitResult, SimClock, TickReport};

/// Разорвать связь захвата `entity` с обеих сторон
///
/// Партнёр, оставшийся без связи, возвращается в Idle (если жив).
/// Состояние самого `entity` не трогаем, его выставляет вызывающий.
pub fn sever_grab(fighters: &mut Query<FighterData>, entity: Entity) {
    let Ok(mut fighter) = fighters.get_mut(entity) else {
        return;
    };
    let link = *fighter.grab;
    fighter.grab.clear();

    if let Some(victim) = link.target {
        if let Ok(mut partner) = fighters.get_mut(victim) {
            if partner.grab.grabbed_by == Some(entity) {
                partner.grab.grabbed_by = None;
                if partner.vitals.is_alive() && partner.state.action == ActionState::Grabbed {
                    partner.state.enter(ActionState::Idle);
                }
            }
        }
    }

    if let Some(holder) = link.grabbed_by {
        if let Ok(mut partner) = fighters.get_mut(holder) {
            if partner.grab.target == Some(entity) {
                partner.grab.target = None;
                let holding = matches!(
                    partner.state.action,
                    ActionState::GrabHold | ActionState::GrabSlam
                );
                if partner.vitals.is_alive() && holding {
                    partner.state.exit_to_idle(&mut *partner.motion);
                }
            }
        }
    }
}

/// Система: hold (подтягивание) → slam (бросок), плюс очистка висячих захватов
///
/// Запускается после state machine: таймеры hold/slam уже продвинуты в этом тике.
pub fn process_grabs(
    clock: Res<SimClock>,
    tuning: Res<FighterTuning>,
    catalog: Res<AttackCatalog>,
    mut report: ResMut<TickReport>,
    mut fighters: Query<FighterData>,
) {
    let dt = clock.dt;
    let order = slot_order(&fighters);

    for &holder in &order {
        let Ok(view) = fighters.get(holder) else {
            continue;
        };
        let holding = matches!(view.state.action, ActionState::GrabHold | ActionState::GrabSlam);
        let target = view.grab.target;
        let holder_alive = view.vitals.is_alive();
        let holder_pos = view.transform.translation;
        let holder_facing = view.motion.facing;
        let holder_forward = view.motion.forward();
        let holder_action = view.state.action;
        let holder_timer = view.state.timer;
        let holder_buffs = *view.buffs;
        let holder_in_hitstop = view.state.in_hitstop();

        // Держит цель, но уже не в hold/slam — ссылка лишняя
        if !holding {
            if target.is_some() {
                sever_grab(&mut fighters, holder);
            }
            continue;
        }

        let Some(target) = target else {
            if let Ok(mut fighter) = fighters.get_mut(holder) {
                fighter.state.exit_to_idle(&mut *fighter.motion);
            }
            continue;
        };

        let link_valid = holder_alive
            && fighters.get(target).is_ok_and(|t| {
                t.vitals.is_alive()
                    && t.grab.grabbed_by == Some(holder)
                    && t.state.action == ActionState::Grabbed
            });

        if !link_valid {
            crate::logger::log(&format!("🤲 Grab released: dangling target {:?} (holder {:?})", target, holder));
            sever_grab(&mut fighters, holder);
            if let Ok(mut fighter) = fighters.get_mut(holder) {
                if fighter.vitals.is_alive() {
                    fighter.state.exit_to_idle(&mut *fighter.motion);
                }
            }
            continue;
        }

        if holder_in_hitstop {
            continue;
        }

        // Подтягиваем цель к точке перед грабером (экспоненциально, без телепорта)
        if let Ok(mut victim) = fighters.get_mut(target) {
            let mut anchor = holder_pos + holder_forward * tuning.hold_distance;
            anchor.y = holder_pos.y;
            let keep = damping_for(1.0 - tuning.hold_drag, dt);
            let current = victim.transform.translation;
            victim.transform.translation = anchor + (current - anchor) * keep;
            victim.motion.facing = wrap_angle(holder_facing + std::f32::consts::PI);
            victim.motion.velocity = Vec3::ZERO;
            victim.motion.knockback = Vec3::ZERO;
        }

        match holder_action {
            ActionState::GrabHold if holder_timer >= tuning.grab_hold_duration => {
                if let Ok(mut fighter) = fighters.get_mut(holder) {
                    fighter.state.enter(ActionState::GrabSlam);
                }
            }
            ActionState::GrabSlam if holder_timer >= tuning.slam_delay => {
                let Some(def) = catalog.get(ActionState::GrabSlam).copied() else {
                    sever_grab(&mut fighters, holder);
                    continue;
                };
                let numbers = slam_numbers(&def, &holder_buffs, &tuning);

                sever_grab(&mut fighters, holder);

                let mut is_ko = false;
                if let Ok(mut victim) = fighters.get_mut(target) {
                    victim.vitals.take_damage(numbers.damage);
                    victim.motion.velocity = Vec3::ZERO;
                    victim.motion.knockback = Vec3::new(
                        holder_forward.x * numbers.knockback,
                        numbers.launch,
                        holder_forward.z * numbers.knockback,
                    );
                    victim.motion.grounded = false;
                    victim.state.enter(ActionState::GroundBounce);
                    victim.state.bounce_count = 0;

                    if victim.vitals.damage_percent >= tuning.ko_percent {
                        is_ko = true;
                        victim.vitals.alive = false;
                        victim.state.enter(ActionState::KnockedOut);
                    }
                }

                if let Ok(mut fighter) = fighters.get_mut(holder) {
                    fighter.state.exit_to_idle(&mut *fighter.motion);
                }

                crate::logger::log_info(&format!(
                    "💥 Slam: {:?} → {:?} ({:.1}% dmg, kb {:.1}{})",
                    holder,
                    target,
                    numbers.damage,
                    numbers.knockback,
                    if is_ko { ", KO" } else { "" }
                ));

                report.hits.push(HitResult {
                    attacker: holder,
                    target,
                    attack: ActionState::GrabSlam,
                    damage: numbers.damage,
                    knockback: numbers.knockback,
                    is_ko,
                    is_grab: false,
                    blocked: false,
                });
                if is_ko {
                    report.eliminations.push(Elimination {
                        entity: target,
                        cause: EliminationCause::KnockedOut,
                    });
                }
            }
            _ => {}
        }
    }

    // Захваченные без валидного владельца освобождаются
    for &entity in &order {
        let Ok(view) = fighters.get(entity) else {
            continue;
        };
        if view.state.action != ActionState::Grabbed && view.grab.grabbed_by.is_none() {
            continue;
        }

        let owner_valid = view.grab.grabbed_by.is_some_and(|holder| {
            fighters.get(holder).is_ok_and(|h| {
                h.vitals.is_alive()
                    && h.grab.target == Some(entity)
                    && matches!(h.state.action, ActionState::GrabHold | ActionState::GrabSlam)
            })
        });
        let grabbed_state = view.state.action == ActionState::Grabbed;

        if owner_valid && grabbed_state {
            continue;
        }

        sever_grab(&mut fighters, entity);
        if let Ok(mut fighter) = fighters.get_mut(entity) {
            if fighter.vitals.is_alive() && fighter.state.action == ActionState::Grabbed {
                crate::logger::log(&format!("🤲 {:?} freed: no holder", entity));
                fighter.state.enter(ActionState::Idle);
            }
        }
    }
}
