//! Баффы от подбираемых предметов + слот спец-приёма

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Stamina;

/// Тип баффа (один предмет = один бафф)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum BuffKind {
    DamageUp,
    StaminaUp,
    RegenUp,
    ThrowUp,
}

impl BuffKind {
    pub const ALL: [BuffKind; 4] = [
        BuffKind::DamageUp,
        BuffKind::StaminaUp,
        BuffKind::RegenUp,
        BuffKind::ThrowUp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BuffKind::DamageUp => "DMG+",
            BuffKind::StaminaUp => "STA+",
            BuffKind::RegenUp => "REGEN",
            BuffKind::ThrowUp => "THROW+",
        }
    }
}

/// Разблокированный спец-приём
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SpecialMove {
    /// Усиленный бросок (throw-up бафф)
    PowerSlam,
}

/// Набор активных баффов (до конца раунда)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Buffs {
    pub damage_up: bool,
    pub stamina_up: bool,
    pub regen_up: bool,
    pub throw_up: bool,
    pub special: Option<SpecialMove>,
}

impl Buffs {
    pub fn has(&self, kind: BuffKind) -> bool {
        match kind {
            BuffKind::DamageUp => self.damage_up,
            BuffKind::StaminaUp => self.stamina_up,
            BuffKind::RegenUp => self.regen_up,
            BuffKind::ThrowUp => self.throw_up,
        }
    }

    /// Выдать бафф. Stamina-up сразу поднимает потолок выносливости.
    pub fn grant(&mut self, kind: BuffKind, stamina: &mut Stamina, boosted_max: f32, bonus: f32) {
        match kind {
            BuffKind::DamageUp => self.damage_up = true,
            BuffKind::StaminaUp => {
                self.stamina_up = true;
                stamina.raise_max(boosted_max, bonus);
            }
            BuffKind::RegenUp => self.regen_up = true,
            BuffKind::ThrowUp => {
                self.throw_up = true;
                self.special = Some(SpecialMove::PowerSlam);
            }
        }
    }

    pub fn special_ready(&self) -> bool {
        self.special.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
