//! Physics module: собственный kinematic интегратор (без физического движка)
//!
//! - integrator: гравитация, knockback, земля/отскок, раздвижение бойцов
//! - ring-out — чистый предикат, опрашивается фазой Elimination

pub mod integrator;

// Re-export основных типов
pub use integrator::{
    integrate_bodies,
    integrate_body,
    is_ring_out,
    separate_fighters,
    separation_push,
    BodyEvent,
};
