//! Раунд: спавн/reset бойцов, выбывание (ring-out), предикаты конца раунда
//!
//! Менеджер матча снаружи вызывает `reset_fighter` на старте раунда и
//! опрашивает `alive_count` / `round_over` после каждого тика.

use bevy::prelude::*;

use crate::combat::sever_grab;
use crate::components::{
    slot_order, ActionState, Buffs, Fighter, FighterData, FighterState, GrabLink, Motion, Stamina, Vitals,
};
use crate::config::ArenaConfig;
use crate::items::{BuffItem, ItemSpawner};
use crate::physics::is_ring_out;
use crate::tick::{Elimination, EliminationCause, TickReport};

/// Публичное состояние бойца (для презентации и менеджера раунда)
#[derive(Debug, Clone, PartialEq)]
pub struct FighterView {
    pub entity: Entity,
    pub slot: u8,
    pub name: String,
    pub position: Vec3,
    pub facing: f32,
    pub action: ActionState,
    pub damage_percent: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub grounded: bool,
    pub alive: bool,
    /// Спец-приём разблокирован (throw-up бафф)
    pub special_ready: bool,
}

/// Facing на центр арены (в центре по умолчанию 0)
fn facing_to_center(spawn: Vec3) -> f32 {
    if Vec2::new(spawn.x, spawn.z).length() < 0.01 {
        0.0
    } else {
        (-spawn.x).atan2(-spawn.z)
    }
}

/// Заспавнить бойца (все per-character компоненты приходят через Required Components)
pub fn spawn_fighter(world: &mut World, slot: u8, name: impl Into<String>, spawn: Vec3) -> Entity {
    let name = name.into();
    crate::logger::log_info(&format!("🧍 Spawn fighter #{} '{}' at {:?}", slot, name, spawn));

    world
        .spawn((
            Fighter::new(slot, name),
            Transform::from_translation(spawn),
            Motion {
                facing: facing_to_center(spawn),
                ..default()
            },
        ))
        .id()
}

/// Reset на старте раунда
///
/// Гарантирует: Idle, полная stamina (базовый max), 0%, на земле, без захвата и баффов.
/// Партнёр по захвату (если был) освобождается. Возвращает false, если это не боец.
pub fn reset_fighter(world: &mut World, entity: Entity, spawn: Vec3) -> bool {
    let Some(link) = world.get::<GrabLink>(entity).copied() else {
        return false;
    };
    detach_partners(world, entity, link);

    let Ok(mut fighter) = world.get_entity_mut(entity) else {
        return false;
    };

    if let Some(mut transform) = fighter.get_mut::<Transform>() {
        transform.translation = spawn;
    }
    if let Some(mut motion) = fighter.get_mut::<Motion>() {
        motion.reset();
        motion.facing = facing_to_center(spawn);
    }
    if let Some(mut state) = fighter.get_mut::<FighterState>() {
        state.reset();
    }
    if let Some(mut vitals) = fighter.get_mut::<Vitals>() {
        vitals.reset();
    }
    if let Some(mut buffs) = fighter.get_mut::<Buffs>() {
        buffs.clear();
    }
    if let Some(mut stamina) = fighter.get_mut::<Stamina>() {
        stamina.reset();
    }
    if let Some(mut grab) = fighter.get_mut::<GrabLink>() {
        grab.clear();
    }

    crate::logger::log(&format!("🔄 Reset {:?} at {:?}", entity, spawn));
    true
}

/// Отвязать партнёров `entity` по захвату (обе стороны)
fn detach_partners(world: &mut World, entity: Entity, link: GrabLink) {
    for partner in [link.target, link.grabbed_by].into_iter().flatten() {
        let Ok(mut partner_ref) = world.get_entity_mut(partner) else {
            continue;
        };

        let was_linked = match partner_ref.get_mut::<GrabLink>() {
            Some(mut partner_link) => {
                let mut changed = false;
                if partner_link.target == Some(entity) {
                    partner_link.target = None;
                    changed = true;
                }
                if partner_link.grabbed_by == Some(entity) {
                    partner_link.grabbed_by = None;
                    changed = true;
                }
                changed
            }
            None => false,
        };
        if !was_linked {
            continue;
        }

        let alive = partner_ref.get::<Vitals>().is_some_and(|v| v.is_alive());
        let in_grab = partner_ref.get::<FighterState>().is_some_and(|s| {
            matches!(
                s.action,
                ActionState::GrabHold | ActionState::GrabSlam | ActionState::Grabbed
            )
        });
        if !(alive && in_grab) {
            continue;
        }

        if let Some(mut state) = partner_ref.get_mut::<FighterState>() {
            state.enter(ActionState::Idle);
        }
        if let Some(mut motion) = partner_ref.get_mut::<Motion>() {
            motion.stop_planar();
        }
    }
}

/// Убрать все предметы и перезапустить таймер спавна (новый раунд)
pub fn clear_items(world: &mut World) {
    let items: Vec<Entity> = world
        .query_filtered::<Entity, With<BuffItem>>()
        .iter(world)
        .collect();
    for item in items {
        world.despawn(item);
    }
    if let Some(mut spawner) = world.get_resource_mut::<ItemSpawner>() {
        spawner.restart();
    }
}

/// Система: ring-out → выбывание (терминальное состояние RingOut)
pub fn detect_ring_outs(
    arena: Res<ArenaConfig>,
    mut report: ResMut<TickReport>,
    mut fighters: Query<FighterData>,
) {
    for entity in slot_order(&fighters) {
        let Ok(view) = fighters.get(entity) else {
            continue;
        };
        if !view.vitals.is_alive() || !is_ring_out(view.transform.translation, &arena) {
            continue;
        }
        let position = view.transform.translation;

        sever_grab(&mut fighters, entity);

        if let Ok(mut fighter) = fighters.get_mut(entity) {
            fighter.vitals.alive = false;
            fighter.state.enter(ActionState::RingOut);
            fighter.state.hitstop = 0.0;
        }

        crate::logger::log_info(&format!("🌊 Ring-out: {:?} at {:?}", entity, position));
        report.eliminations.push(Elimination {
            entity,
            cause: EliminationCause::RingOut,
        });
    }
}

/// Сколько бойцов ещё живы
pub fn alive_count(world: &mut World) -> usize {
    world
        .query_filtered::<&Vitals, With<Fighter>>()
        .iter(world)
        .filter(|vitals| vitals.is_alive())
        .count()
}

/// Раунд окончен, когда в живых остался максимум один
pub fn round_over(world: &mut World) -> bool {
    alive_count(world) <= 1
}

/// Публичное состояние всех бойцов в порядке slot
pub fn fighter_views(world: &mut World) -> Vec<FighterView> {
    let mut views: Vec<FighterView> = world
        .query::<(Entity, &Fighter, &Transform, &Motion, &FighterState, &Vitals, &Stamina, &Buffs)>()
        .iter(world)
        .map(|(entity, fighter, transform, motion, state, vitals, stamina, buffs)| FighterView {
            entity,
            slot: fighter.slot,
            name: fighter.name.clone(),
            position: transform.translation,
            facing: motion.facing,
            action: state.action,
            damage_percent: vitals.damage_percent,
            stamina: stamina.current,
            max_stamina: stamina.max,
            grounded: motion.grounded,
            alive: vitals.alive,
            special_ready: buffs.special_ready(),
        })
        .collect();
    views.sort_by_key(|view| (view.slot, view.entity.index()));
    views
}
