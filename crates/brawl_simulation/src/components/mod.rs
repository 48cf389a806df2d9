//! ECS Components бойца
//!
//! Организация по доменам:
//! - actor: идентичность и ресурсы (Fighter, Vitals, Stamina)
//! - movement: кинематика и намерение (Motion, Intent)
//! - combat: state machine данные и захват (FighterState, ActionState, GrabLink)
//! - buffs: баффы и спец-слот (Buffs, BuffKind, SpecialMove)
//! - query: общий FighterData для проходов тика

pub mod actor;
pub mod buffs;
pub mod combat;
pub mod movement;
pub mod query;

// Re-exports для удобного импорта
pub use actor::*;
pub use buffs::*;
pub use combat::*;
pub use movement::*;
pub use query::{slot_order, FighterData};
