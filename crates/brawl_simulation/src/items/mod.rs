//! Подбираемые баффы на арене
//!
//! Спавн детерминирован: позиция и тип берутся из `DeterministicRng`.
//! Подбирает первый живой боец (по slot) в радиусе подбора.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::components::{slot_order, ActionState, BuffKind, Fighter, FighterData};
use crate::config::{FighterTuning, ItemConfig};
use crate::tick::{Pickup, SimClock, TickReport};
use crate::DeterministicRng;

/// Предмет на арене
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct BuffItem {
    pub kind: BuffKind,
    /// Секунды на арене
    pub age: f32,
}

/// Таймер спавна (сбрасывается на новый раунд)
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ItemSpawner {
    pub timer: f32,
    pub next_spawn: f32,
    first_spawn: f32,
}

impl ItemSpawner {
    pub fn new(config: &ItemConfig) -> Self {
        Self {
            timer: 0.0,
            next_spawn: config.first_spawn,
            first_spawn: config.first_spawn,
        }
    }

    pub fn restart(&mut self) {
        self.timer = 0.0;
        self.next_spawn = self.first_spawn;
    }
}

impl FromWorld for ItemSpawner {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<ItemConfig>().cloned().unwrap_or_default();
        Self::new(&config)
    }
}

/// Случайная точка в кольце [min, max] вокруг центра + случайный тип
pub fn roll_item(rng: &mut impl Rng, config: &ItemConfig) -> (BuffKind, Vec3) {
    let angle = rng.gen_range(0.0..TAU);
    let radius = if config.spawn_radius_max > config.spawn_radius_min {
        rng.gen_range(config.spawn_radius_min..config.spawn_radius_max)
    } else {
        config.spawn_radius_min
    };
    let kind = BuffKind::ALL[rng.gen_range(0..BuffKind::ALL.len())];
    (kind, Vec3::new(angle.sin() * radius, 0.0, angle.cos() * radius))
}

/// Система: спавн предмета по таймеру (не больше max_items одновременно)
pub fn spawn_items(
    clock: Res<SimClock>,
    config: Res<ItemConfig>,
    mut spawner: ResMut<ItemSpawner>,
    mut rng: ResMut<DeterministicRng>,
    items: Query<&BuffItem>,
    mut commands: Commands,
) {
    if !config.enabled {
        return;
    }

    spawner.timer += clock.dt;
    if spawner.timer < spawner.next_spawn {
        return;
    }

    // При полном лимите спавн остаётся "должным" до первого освободившегося места
    if items.iter().count() >= config.max_items {
        return;
    }
    spawner.next_spawn = spawner.timer + config.spawn_interval;

    let (kind, position) = roll_item(&mut rng.rng, &config);
    commands.spawn((BuffItem { kind, age: 0.0 }, Transform::from_translation(position)));
    crate::logger::log(&format!("🎁 Item {} spawned at {:?}", kind.label(), position));
}

/// Система: старение, исчезновение и подбор предметов
pub fn collect_items(
    clock: Res<SimClock>,
    config: Res<ItemConfig>,
    tuning: Res<FighterTuning>,
    mut report: ResMut<TickReport>,
    mut items: Query<(Entity, &mut BuffItem, &Transform), Without<Fighter>>,
    mut fighters: Query<FighterData>,
    mut commands: Commands,
) {
    let order = slot_order(&fighters);

    let mut item_entities: Vec<Entity> = items.iter().map(|(entity, _, _)| entity).collect();
    item_entities.sort_by_key(|entity| entity.index());

    for item_entity in item_entities {
        let Ok((_, mut item, transform)) = items.get_mut(item_entity) else {
            continue;
        };
        item.age += clock.dt;
        if item.age >= config.lifetime {
            commands.entity(item_entity).despawn();
            continue;
        }
        let item_pos = transform.translation;
        let kind = item.kind;

        let picker = order.iter().copied().find(|&entity| {
            fighters.get(entity).is_ok_and(|f| {
                let offset = f.transform.translation - item_pos;
                f.vitals.is_alive()
                    && f.state.action != ActionState::Grabbed
                    && offset.x * offset.x + offset.z * offset.z < config.pickup_distance_sq
            })
        });
        let Some(picker) = picker else {
            continue;
        };

        if let Ok(mut fighter) = fighters.get_mut(picker) {
            fighter.buffs.grant(
                kind,
                &mut *fighter.stamina,
                tuning.boosted_max_stamina,
                tuning.stamina_up_bonus,
            );
        }
        commands.entity(item_entity).despawn();

        crate::logger::log_info(&format!("✨ {:?} picked up {}", picker, kind.label()));
        report.pickups.push(Pickup { fighter: picker, kind });
    }
}
