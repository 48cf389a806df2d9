//! Базовые компоненты бойца: Fighter, Vitals, Stamina

use bevy::prelude::*;

use crate::components::{Buffs, FighterState, GrabLink, Intent, Motion};

/// Боец на арене (игрок или бот, ядру без разницы)
///
/// Автоматически добавляет весь набор per-character компонентов через Required Components.
/// `slot` задаёт фиксированный порядок обхода во всех проходах тика.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Motion, FighterState, Vitals, Stamina, Buffs, GrabLink, Intent)]
pub struct Fighter {
    pub slot: u8,
    pub name: String,
}

impl Fighter {
    pub fn new(slot: u8, name: impl Into<String>) -> Self {
        Self {
            slot,
            name: name.into(),
        }
    }
}

/// Накопленный урон (проценты) + флаг жизни
///
/// Инвариант: damage_percent ≥ 0
/// Урон не убивает сам по себе, он усиливает отбрасывание.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Vitals {
    pub damage_percent: f32,
    pub alive: bool,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            damage_percent: 0.0,
            alive: true,
        }
    }
}

impl Vitals {
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.damage_percent += amount.max(0.0);
    }

    /// Regen-бафф "лечит" проценты, но не ниже нуля
    pub fn heal(&mut self, amount: f32) {
        self.damage_percent = (self.damage_percent - amount.max(0.0)).max(0.0);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Выносливость для рывков/захватов/спринта
///
/// Инвариант: 0.0 ≤ current ≤ max
/// Регенерация стартует только после `regen_delay`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
    /// Max без stamina-up баффа (к нему возвращаемся на reset)
    pub base_max: f32,
    pub regen_rate: f32, // units per second
    /// Секунды до начала регенерации
    pub regen_delay: f32,
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Stamina {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            base_max: max,
            regen_rate: 22.0,
            regen_delay: 0.0,
        }
    }

    pub fn can_afford(&self, cost: f32) -> bool {
        self.current >= cost
    }

    /// Списать cost целиком или ничего (недоступное действие — тихий no-op)
    pub fn consume(&mut self, cost: f32, regen_delay: f32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.current -= cost;
        self.regen_delay = self.regen_delay.max(regen_delay);
        true
    }

    /// Непрерывный расход (спринт): уходит в ноль, но не ниже
    pub fn drain(&mut self, amount: f32, regen_delay: f32) {
        self.current = (self.current - amount).max(0.0);
        self.regen_delay = self.regen_delay.max(regen_delay);
    }

    pub fn regenerate(&mut self, delta_time: f32) {
        if self.regen_delay > 0.0 {
            self.regen_delay = (self.regen_delay - delta_time).max(0.0);
            return;
        }
        self.current = (self.current + self.regen_rate * delta_time).min(self.max);
    }

    /// Stamina-up: поднимаем потолок и сразу докидываем bonus
    pub fn raise_max(&mut self, new_max: f32, bonus: f32) {
        self.max = self.max.max(new_max);
        self.current = (self.current + bonus).min(self.max);
    }

    pub fn reset(&mut self) {
        self.max = self.base_max;
        self.current = self.max;
        self.regen_delay = 0.0;
    }
}
