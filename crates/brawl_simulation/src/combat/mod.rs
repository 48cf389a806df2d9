//! Combat module: данные атак, таблица переходов, state machine, hit resolution
//!
//! Порядок в тике:
//! 1. update_state_machines — Intent → состояние, state-velocity
//! 2. process_grabs — hold/slam, висячие ссылки
//! 3. resolve_hits — удары и захваты, реакции целей, HitResult
//!
//! Catalog и StateTable проверяются один раз при сборке plugin'а (`validate_tables`).

pub mod catalog;
pub mod damage;
pub mod systems;
pub mod table;

// Re-export основных типов
pub use catalog::{AttackCatalog, AttackDef, AttackKind, AttackValue, CatalogError};
pub use damage::{in_attack_cone, knockback_scale, slam_numbers, strike_numbers, wrap_angle, StrikeNumbers};
pub use systems::{process_grabs, resolve_hits, sever_grab, update_state_machines};
pub use table::{ExitRule, HeldInput, PhaseSpec, StateSpec, StateTable, VelocityPolicy};

/// Полная проверка данных перед стартом симуляции
pub fn validate_tables(catalog: &AttackCatalog, table: &StateTable) -> Result<(), CatalogError> {
    catalog.validate()?;
    table.validate(catalog)?;
    Ok(())
}
