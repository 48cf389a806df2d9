//! Общий QueryData бойца для проходов тика
//!
//! Все проходы (state machine, hits, grab, physics) работают через один набор
//! компонентов. Межперсонажные изменения делаются последовательно через `get_mut`,
//! порядок обхода — по `Fighter::slot` (см. `slot_order`).

use bevy::ecs::query::QueryData;
use bevy::prelude::*;

use crate::components::{Buffs, Fighter, FighterState, GrabLink, Intent, Motion, Stamina, Vitals};

#[derive(QueryData)]
#[query_data(mutable)]
pub struct FighterData {
    pub entity: Entity,
    pub fighter: &'static Fighter,
    pub transform: &'static mut Transform,
    pub motion: &'static mut Motion,
    pub state: &'static mut FighterState,
    pub vitals: &'static mut Vitals,
    pub stamina: &'static mut Stamina,
    pub buffs: &'static mut Buffs,
    pub grab: &'static mut GrabLink,
    pub intent: &'static Intent,
}

/// Entity бойцов в фиксированном порядке (slot, затем index для одинаковых slot)
pub fn slot_order(fighters: &Query<FighterData>) -> Vec<Entity> {
    let mut order: Vec<(u8, u32, Entity)> = fighters
        .iter()
        .map(|f| (f.fighter.slot, f.entity.index(), f.entity))
        .collect();
    order.sort_by_key(|(slot, index, _)| (*slot, *index));
    order.into_iter().map(|(_, _, entity)| entity).collect()
}
