//! Combat компоненты: action state бойца и связь захвата

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Motion;

/// Состояние бойца (ровно одно в каждый момент)
///
/// Free состояния (Idle..Fall): Intent напрямую управляет скоростью.
/// Остальные — "заблокированные": Intent проверяется только для разрешённых выходов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub enum ActionState {
    Idle,
    Walk,
    Sprint,
    Jump,
    Fall,
    Light1,
    Light2,
    Light3,
    HeavyCharge,
    HeavyRelease,
    /// Удар сверху вниз из воздуха
    DiveStrike,
    Dodge,
    Grab,
    GrabHold,
    GrabSlam,
    Grabbed,
    Block,
    /// Атакующий отскочил от блока
    BlockStagger,
    Hitstun,
    Knockback,
    Launched,
    GroundBounce,
    Getup,
    KnockedOut,
    RingOut,
}

impl Default for ActionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl ActionState {
    pub const ALL: [ActionState; 25] = [
        ActionState::Idle,
        ActionState::Walk,
        ActionState::Sprint,
        ActionState::Jump,
        ActionState::Fall,
        ActionState::Light1,
        ActionState::Light2,
        ActionState::Light3,
        ActionState::HeavyCharge,
        ActionState::HeavyRelease,
        ActionState::DiveStrike,
        ActionState::Dodge,
        ActionState::Grab,
        ActionState::GrabHold,
        ActionState::GrabSlam,
        ActionState::Grabbed,
        ActionState::Block,
        ActionState::BlockStagger,
        ActionState::Hitstun,
        ActionState::Knockback,
        ActionState::Launched,
        ActionState::GroundBounce,
        ActionState::Getup,
        ActionState::KnockedOut,
        ActionState::RingOut,
    ];

    pub fn is_free(self) -> bool {
        matches!(
            self,
            ActionState::Idle
                | ActionState::Walk
                | ActionState::Sprint
                | ActionState::Jump
                | ActionState::Fall
        )
    }

    pub fn is_action(self) -> bool {
        !self.is_free()
    }

    /// Атакующие состояния: захват против них проваливается
    pub fn is_attacking(self) -> bool {
        matches!(
            self,
            ActionState::Light1
                | ActionState::Light2
                | ActionState::Light3
                | ActionState::HeavyCharge
                | ActionState::HeavyRelease
                | ActionState::DiveStrike
        )
    }

    /// Состояния с hitbox'ом, которые сканирует hit resolution
    pub fn is_strike(self) -> bool {
        matches!(
            self,
            ActionState::Light1
                | ActionState::Light2
                | ActionState::Light3
                | ActionState::HeavyRelease
                | ActionState::DiveStrike
        )
    }

    pub fn is_light(self) -> bool {
        matches!(self, ActionState::Light1 | ActionState::Light2 | ActionState::Light3)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ActionState::KnockedOut | ActionState::RingOut)
    }

    /// Состояния, где landing может превратиться в отскок
    pub fn is_tumbling(self) -> bool {
        matches!(self, ActionState::Launched | ActionState::GroundBounce)
    }
}

/// Per-character state machine данные
///
/// Таймеры в секундах. `attack_hit` — latch: одна активация = максимум одно попадание.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct FighterState {
    pub action: ActionState,
    /// Время в текущем состоянии
    pub timer: f32,
    pub attack_hit: bool,
    /// i-frames (только внутри окна dodge)
    pub invulnerable: bool,
    /// Заморозка после удара (для обоих участников)
    pub hitstop: f32,
    pub combo: u8,
    /// Окно продолжения комбо
    pub combo_timer: f32,
    /// Накопленный заряд heavy (не ограничен, эффект ограничен catalog'ом)
    pub charge_time: f32,
    /// Light3 со спринта (усиленный выпад)
    pub sprint_attack: bool,
    pub bounce_count: u8,
}

impl Default for FighterState {
    fn default() -> Self {
        Self {
            action: ActionState::Idle,
            timer: 0.0,
            attack_hit: false,
            invulnerable: false,
            hitstop: 0.0,
            combo: 0,
            combo_timer: 0.0,
            charge_time: 0.0,
            sprint_attack: false,
            bounce_count: 0,
        }
    }
}

impl FighterState {
    /// Вход в новое состояние: таймер и latch сбрасываются
    pub fn enter(&mut self, action: ActionState) {
        if self.action != action {
            crate::logger::log(&format!("🔁 {:?} → {:?}", self.action, action));
        }
        self.action = action;
        self.timer = 0.0;
        self.attack_hit = false;
        self.invulnerable = action == ActionState::Dodge;
    }

    /// Выход из action state обратно в Idle (горизонтальная скорость гасится)
    pub fn exit_to_idle(&mut self, motion: &mut Motion) {
        self.enter(ActionState::Idle);
        self.sprint_attack = false;
        motion.stop_planar();
    }

    pub fn in_hitstop(&self) -> bool {
        self.hitstop > 0.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Связь захвата (симметричная)
///
/// Инвариант: `A.target == Some(B)` ⇔ `B.grabbed_by == Some(A)`.
/// Хранятся Entity handles, не ссылки; висячая ссылка просто завершает захват.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct GrabLink {
    pub target: Option<Entity>,
    pub grabbed_by: Option<Entity>,
}

impl GrabLink {
    pub fn is_linked(&self) -> bool {
        self.target.is_some() || self.grabbed_by.is_some()
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.grabbed_by = None;
    }
}
