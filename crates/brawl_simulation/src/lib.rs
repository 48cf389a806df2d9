//! Arena Brawl Simulation Core
//!
//! Детерминированная fixed-tick симуляция арены на Bevy 0.16 ECS (headless):
//! Intent → state machine → hit resolution → physics → выбывание → предметы.
//!
//! Рендер, звук, UI, камера, input mapping и AI — внешние слои: они пишут `Intent`
//! и читают `TickReport` / `fighter_views`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod items;
pub mod logger;
pub mod physics;
pub mod round;
pub mod tick;

// Re-export базовых компонентов для удобства
pub use combat::{
    validate_tables, AttackCatalog, AttackDef, AttackKind, AttackValue, CatalogError, StateTable,
};
pub use components::*;
pub use config::{ArenaConfig, FighterTuning, ItemConfig, SimConfig};
pub use items::{BuffItem, ItemSpawner};
pub use round::{
    alive_count, clear_items, fighter_views, reset_fighter, round_over, spawn_fighter, FighterView,
};
pub use tick::{
    advance_tick, Elimination, EliminationCause, HitResult, Pickup, SimClock, SimulationTick, TickReport,
    TickSet,
};

/// Главный plugin симуляции (объединяет все фазы тика)
///
/// Ресурсы, вставленные до plugin'а, не перезаписываются (кастомный tuning/catalog).
/// Невалидный catalog/таблица переходов — фатальная ошибка на старте.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimConfig>()
            .init_resource::<FighterTuning>()
            .init_resource::<ArenaConfig>()
            .init_resource::<ItemConfig>()
            .init_resource::<AttackCatalog>()
            .init_resource::<StateTable>()
            .init_resource::<SimClock>()
            .init_resource::<TickReport>()
            .init_resource::<ItemSpawner>();

        // Детерминистичный RNG (seed по умолчанию, если не задан снаружи)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        {
            let world = app.world();
            let catalog = world.resource::<AttackCatalog>();
            let table = world.resource::<StateTable>();
            if let Err(err) = validate_tables(catalog, table) {
                logger::log_error(&format!("❌ Simulation tables are invalid: {}", err));
                panic!("invalid simulation tables: {err}");
            }
        }

        let tick_hz = app.world().resource::<SimConfig>().tick_hz;

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(tick_hz))
            .configure_sets(
                SimulationTick,
                (
                    TickSet::Prepare,
                    TickSet::StateMachine,
                    TickSet::HitResolution,
                    TickSet::Physics,
                    TickSet::Elimination,
                    TickSet::Pickups,
                )
                    .chain(),
            )
            .add_systems(
                SimulationTick,
                (
                    tick::begin_tick.in_set(TickSet::Prepare),
                    (combat::update_state_machines, combat::process_grabs)
                        .chain()
                        .in_set(TickSet::StateMachine),
                    combat::resolve_hits.in_set(TickSet::HitResolution),
                    (physics::integrate_bodies, physics::separate_fighters)
                        .chain()
                        .in_set(TickSet::Physics),
                    round::detect_ring_outs.in_set(TickSet::Elimination),
                    (items::spawn_items, items::collect_items)
                        .chain()
                        .in_set(TickSet::Pickups),
                ),
            )
            .add_systems(FixedUpdate, tick::run_fixed_tick);

        logger::log_info(&format!("✅ SimulationPlugin ready ({} Hz)", tick_hz));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Используется только спавном предметов; state machine, hits и physics его не читают.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}
