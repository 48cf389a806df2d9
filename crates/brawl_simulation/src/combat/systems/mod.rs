//! Combat systems (фазы тика StateMachine и HitResolution)

pub mod grab;
pub mod hits;
pub mod state_machine;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod state_machine_tests;

// Re-export all systems
pub use grab::*;
pub use hits::*;
pub use state_machine::*;
