//! Таблица переходов: (state, фаза по времени) → (политика скорости, условие выхода)
//!
//! Данные отделены от логики: state machine только читает `StateSpec`,
//! все тайминги и скорости лежат здесь и проверяются при старте.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::catalog::{AttackCatalog, CatalogError};
use crate::components::ActionState;

/// Что делать со state-velocity внутри фазы
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VelocityPolicy {
    /// Не трогаем (гравитацию/knockback ведёт physics)
    Keep,
    /// Горизонталь в ноль
    Stop,
    /// Вся скорость в ноль (включая вертикаль)
    Freeze,
    /// Выпад вдоль facing
    Lunge { speed: f32 },
    /// Экспоненциальное торможение (factor за 60Hz тик)
    Damp { factor: f32 },
    /// Keep в воздухе, Stop на земле
    StopWhenGrounded,
}

/// Удерживаемый ввод, отпускание которого завершает состояние
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeldInput {
    Block,
    HeavyCharge,
}

/// Условие выхода из action state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExitRule {
    /// timer ≥ duration атаки из catalog'а
    AttackFinished,
    Elapsed { after: f32 },
    /// Время вышло и стоим на земле
    ElapsedGrounded { after: f32 },
    Released(HeldInput),
    /// Приземлились (не раньше `after`)
    Landed { after: f32 },
    /// Ведётся не таблицей (grab pass, elimination)
    Scripted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Фаза активна пока timer < until
    pub until: f32,
    pub velocity: VelocityPolicy,
    pub invulnerable: bool,
}

impl PhaseSpec {
    pub fn new(until: f32, velocity: VelocityPolicy) -> Self {
        Self {
            until,
            velocity,
            invulnerable: false,
        }
    }

    /// Последняя фаза: до конца состояния
    pub fn rest(velocity: VelocityPolicy) -> Self {
        Self::new(f32::INFINITY, velocity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    pub phases: Vec<PhaseSpec>,
    pub exit: ExitRule,
    /// Куда уходим по exit
    pub next: ActionState,
    /// Следующая ступень комбо (если окно комбо открыто)
    pub combo_next: Option<ActionState>,
}

impl StateSpec {
    fn new(phases: Vec<PhaseSpec>, exit: ExitRule) -> Self {
        Self {
            phases,
            exit,
            next: ActionState::Idle,
            combo_next: None,
        }
    }

    fn then(mut self, next: ActionState) -> Self {
        self.next = next;
        self
    }

    fn combo(mut self, next: ActionState) -> Self {
        self.combo_next = Some(next);
        self
    }

    /// Фаза для текущего timer (за последней — последняя)
    pub fn phase_at(&self, timer: f32) -> Option<&PhaseSpec> {
        self.phases
            .iter()
            .find(|phase| timer < phase.until)
            .or_else(|| self.phases.last())
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTable {
    pub states: HashMap<ActionState, StateSpec>,
}

impl Default for StateTable {
    fn default() -> Self {
        use ActionState as S;
        use VelocityPolicy as V;

        let light = |lunge: f32| {
            StateSpec::new(
                vec![
                    PhaseSpec::new(0.08, V::Lunge { speed: lunge }),
                    PhaseSpec::rest(V::Damp { factor: 0.8 }),
                ],
                ExitRule::AttackFinished,
            )
        };

        let mut states = HashMap::new();
        states.insert(S::Light1, light(5.0).combo(S::Light2));
        states.insert(S::Light2, light(5.0).combo(S::Light3));
        states.insert(S::Light3, light(5.0));

        states.insert(
            S::HeavyCharge,
            StateSpec::new(
                vec![PhaseSpec::rest(V::Stop)],
                ExitRule::Released(HeldInput::HeavyCharge),
            )
            .then(S::HeavyRelease),
        );
        states.insert(
            S::HeavyRelease,
            StateSpec::new(
                vec![
                    PhaseSpec::new(0.08, V::Lunge { speed: 9.0 }),
                    PhaseSpec::rest(V::Damp { factor: 0.78 }),
                ],
                ExitRule::AttackFinished,
            ),
        );
        states.insert(
            S::DiveStrike,
            StateSpec::new(
                vec![
                    PhaseSpec::new(0.15, V::Keep),
                    PhaseSpec::rest(V::StopWhenGrounded),
                ],
                ExitRule::AttackFinished,
            ),
        );
        states.insert(
            S::Dodge,
            StateSpec::new(
                vec![
                    PhaseSpec {
                        invulnerable: true,
                        ..PhaseSpec::new(0.22, V::Lunge { speed: 14.0 })
                    },
                    PhaseSpec::rest(V::Damp { factor: 0.83 }),
                ],
                ExitRule::Elapsed { after: 0.35 },
            ),
        );
        states.insert(
            S::Grab,
            StateSpec::new(
                vec![
                    PhaseSpec::new(0.16, V::Lunge { speed: 8.0 }),
                    PhaseSpec::rest(V::Damp { factor: 0.83 }),
                ],
                ExitRule::AttackFinished,
            ),
        );

        for scripted in [S::GrabHold, S::GrabSlam, S::Grabbed, S::KnockedOut, S::RingOut] {
            let velocity = if scripted == S::Grabbed { V::Freeze } else { V::Stop };
            states.insert(
                scripted,
                StateSpec::new(vec![PhaseSpec::rest(velocity)], ExitRule::Scripted),
            );
        }

        states.insert(
            S::Block,
            StateSpec::new(
                vec![PhaseSpec::rest(V::Stop)],
                ExitRule::Released(HeldInput::Block),
            ),
        );
        states.insert(
            S::BlockStagger,
            StateSpec::new(
                vec![PhaseSpec::rest(V::Damp { factor: 0.85 })],
                ExitRule::Elapsed { after: 0.3 },
            ),
        );
        states.insert(
            S::Hitstun,
            StateSpec::new(
                vec![PhaseSpec::rest(V::Damp { factor: 0.88 })],
                ExitRule::Elapsed { after: 0.28 },
            ),
        );
        states.insert(
            S::Knockback,
            StateSpec::new(
                vec![PhaseSpec::rest(V::Keep)],
                ExitRule::ElapsedGrounded { after: 0.5 },
            ),
        );
        states.insert(
            S::Launched,
            StateSpec::new(vec![PhaseSpec::rest(V::Keep)], ExitRule::Landed { after: 0.2 })
                .then(S::GroundBounce),
        );
        states.insert(
            S::GroundBounce,
            StateSpec::new(
                vec![PhaseSpec::rest(V::StopWhenGrounded)],
                ExitRule::ElapsedGrounded { after: 0.6 },
            )
            .then(S::Getup),
        );
        states.insert(
            S::Getup,
            StateSpec::new(vec![PhaseSpec::rest(V::Stop)], ExitRule::Elapsed { after: 0.4 }),
        );

        Self { states }
    }
}

impl StateTable {
    pub fn get(&self, state: ActionState) -> Option<&StateSpec> {
        self.states.get(&state)
    }

    /// Каждый action state обязан иметь spec; AttackFinished требует запись в catalog
    pub fn validate(&self, catalog: &AttackCatalog) -> Result<(), CatalogError> {
        for state in ActionState::ALL.into_iter().filter(|s| s.is_action()) {
            let spec = self
                .get(state)
                .ok_or(CatalogError::MissingStateSpec(state))?;

            if spec.exit == ExitRule::AttackFinished && catalog.get(state).is_none() {
                return Err(CatalogError::MissingAttack(state));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_complete() {
        let table = StateTable::default();
        assert_eq!(table.validate(&AttackCatalog::default()), Ok(()));
    }

    #[test]
    fn test_missing_spec_is_reported() {
        let mut table = StateTable::default();
        table.states.remove(&ActionState::Getup);
        assert_eq!(
            table.validate(&AttackCatalog::default()),
            Err(CatalogError::MissingStateSpec(ActionState::Getup))
        );
    }

    #[test]
    fn test_dodge_invulnerable_only_in_window() {
        let table = StateTable::default();
        let dodge = table.get(ActionState::Dodge).cloned().unwrap();

        assert!(dodge.phase_at(0.0).unwrap().invulnerable);
        assert!(dodge.phase_at(0.21).unwrap().invulnerable);
        assert!(!dodge.phase_at(0.22).unwrap().invulnerable);
        assert!(!dodge.phase_at(5.0).unwrap().invulnerable);
    }

    #[test]
    fn test_no_other_state_grants_invulnerability() {
        let table = StateTable::default();
        for (state, spec) in &table.states {
            if *state == ActionState::Dodge {
                continue;
            }
            assert!(
                spec.phases.iter().all(|p| !p.invulnerable),
                "{:?} grants i-frames",
                state
            );
        }
    }

    #[test]
    fn test_combo_chain() {
        let table = StateTable::default();
        assert_eq!(
            table.get(ActionState::Light1).and_then(|s| s.combo_next),
            Some(ActionState::Light2)
        );
        assert_eq!(
            table.get(ActionState::Light2).and_then(|s| s.combo_next),
            Some(ActionState::Light3)
        );
        assert_eq!(table.get(ActionState::Light3).and_then(|s| s.combo_next), None);
    }
}
