//! Attack catalog: статическая таблица параметров атак
//!
//! Ключ — ActionState атаки. Поведения нет, только данные.
//! Заряжаемые атаки хранят [min, max] и резолвятся по charge ratio.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::ActionState;

/// Ошибки валидации таблиц (проверяются один раз на старте)
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("attack catalog has no entry for reachable attack state {0:?}")]
    MissingAttack(ActionState),

    #[error("attack {state:?} has an invalid hit window ({start}..{end}, duration {duration})")]
    InvalidHitWindow {
        state: ActionState,
        start: f32,
        end: f32,
        duration: f32,
    },

    #[error("attack {0:?} has a negative damage, knockback, range or launch value")]
    NegativeValue(ActionState),

    #[error("charge cap must be positive, got {0}")]
    InvalidChargeCap(f32),

    #[error("state table has no spec for action state {0:?}")]
    MissingStateSpec(ActionState),
}

/// Значение атаки: фиксированное или интерполируемое по заряду
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackValue {
    Fixed(f32),
    Charged { min: f32, max: f32 },
}

impl AttackValue {
    /// `ratio` уже ограничен [0, 1]
    pub fn resolve(self, ratio: f32) -> f32 {
        match self {
            AttackValue::Fixed(value) => value,
            AttackValue::Charged { min, max } => min + (max - min) * ratio.clamp(0.0, 1.0),
        }
    }

    pub fn base(self) -> f32 {
        self.resolve(0.0)
    }

    fn is_negative(self) -> bool {
        match self {
            AttackValue::Fixed(value) => value < 0.0,
            AttackValue::Charged { min, max } => min < 0.0 || max < 0.0,
        }
    }
}

/// Как атака применяется к цели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Обычный удар по конусу
    Strike,
    /// Захват: отдельный путь резолва, без урона
    Grab,
    /// Бросок удерживаемой цели (без сканирования конуса)
    Throw,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackDef {
    pub kind: AttackKind,
    pub damage: AttackValue,
    pub knockback: AttackValue,
    pub launch: AttackValue,
    pub range: f32,
    /// Полуугол конуса (градусы)
    pub half_angle_deg: f32,
    /// Окно попадания (секунды от входа в состояние)
    pub hit_start: f32,
    pub hit_end: f32,
    pub duration: f32,
    pub hitstop: f32,
    /// Тяжёлый удар: неподбрасывающее попадание роняет в Knockback
    pub heavy: bool,
}

impl AttackDef {
    pub fn in_hit_window(&self, timer: f32) -> bool {
        timer >= self.hit_start && timer <= self.hit_end
    }

    pub fn half_angle_rad(&self) -> f32 {
        self.half_angle_deg.to_radians()
    }
}

/// Атаки, которые достижимы из state machine, для них запись обязательна
pub const REQUIRED_ATTACKS: [ActionState; 7] = [
    ActionState::Light1,
    ActionState::Light2,
    ActionState::Light3,
    ActionState::HeavyRelease,
    ActionState::DiveStrike,
    ActionState::Grab,
    ActionState::GrabSlam,
];

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackCatalog {
    pub entries: HashMap<ActionState, AttackDef>,
    /// Сколько секунд заряда дают максимальный эффект
    pub charge_cap: f32,
}

impl Default for AttackCatalog {
    fn default() -> Self {
        use AttackValue::{Charged, Fixed};

        let strike = |damage, knockback, range, half_angle_deg, hit_start, hit_end, duration, launch, hitstop| AttackDef {
            kind: AttackKind::Strike,
            damage,
            knockback,
            launch,
            range,
            half_angle_deg,
            hit_start,
            hit_end,
            duration,
            hitstop,
            heavy: false,
        };

        let mut entries = HashMap::new();
        entries.insert(
            ActionState::Light1,
            strike(Fixed(8.0), Fixed(4.0), 2.4, 80.0, 0.05, 0.14, 0.24, Fixed(0.0), 0.04),
        );
        entries.insert(
            ActionState::Light2,
            strike(Fixed(10.0), Fixed(4.5), 2.4, 80.0, 0.05, 0.14, 0.24, Fixed(0.0), 0.04),
        );
        entries.insert(
            ActionState::Light3,
            strike(Fixed(18.0), Fixed(9.0), 2.8, 120.0, 0.1, 0.2, 0.38, Fixed(6.0), 0.08),
        );
        entries.insert(
            ActionState::HeavyRelease,
            AttackDef {
                heavy: true,
                ..strike(
                    Charged { min: 15.0, max: 42.0 },
                    Charged { min: 10.0, max: 26.0 },
                    3.0,
                    130.0,
                    0.06,
                    0.18,
                    0.42,
                    Charged { min: 4.0, max: 15.0 },
                    0.12,
                )
            },
        );
        entries.insert(
            ActionState::DiveStrike,
            AttackDef {
                heavy: true,
                ..strike(Fixed(22.0), Fixed(12.0), 2.5, 180.0, 0.15, 0.32, 0.5, Fixed(6.0), 0.12)
            },
        );
        entries.insert(
            ActionState::Grab,
            AttackDef {
                kind: AttackKind::Grab,
                ..strike(Fixed(0.0), Fixed(0.0), 2.1, 60.0, 0.08, 0.2, 0.42, Fixed(0.0), 0.0)
            },
        );
        entries.insert(
            ActionState::GrabSlam,
            AttackDef {
                kind: AttackKind::Throw,
                heavy: true,
                // range/угол не используются: бросок применяется к удерживаемой цели
                ..strike(Fixed(20.0), Fixed(16.0), 0.0, 180.0, 0.0, 0.18, 0.35, Fixed(9.0), 0.0)
            },
        );

        Self {
            entries,
            charge_cap: 1.5,
        }
    }
}

impl AttackCatalog {
    pub fn get(&self, state: ActionState) -> Option<&AttackDef> {
        self.entries.get(&state)
    }

    /// Заряд → [0, 1]; переполнение по времени не даёт роста
    pub fn charge_ratio(&self, charge_time: f32) -> f32 {
        if self.charge_cap <= 0.0 {
            return 1.0;
        }
        (charge_time / self.charge_cap).clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if !(self.charge_cap > 0.0) {
            return Err(CatalogError::InvalidChargeCap(self.charge_cap));
        }

        for state in REQUIRED_ATTACKS {
            let def = self.get(state).ok_or(CatalogError::MissingAttack(state))?;

            let window_ok = def.hit_start >= 0.0
                && def.hit_start <= def.hit_end
                && def.hit_end <= def.duration;
            if !window_ok {
                return Err(CatalogError::InvalidHitWindow {
                    state,
                    start: def.hit_start,
                    end: def.hit_end,
                    duration: def.duration,
                });
            }

            if def.damage.is_negative()
                || def.knockback.is_negative()
                || def.launch.is_negative()
                || def.range < 0.0
            {
                return Err(CatalogError::NegativeValue(state));
            }
        }

        Ok(())
    }
}
