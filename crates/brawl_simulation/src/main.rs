//! Headless симуляция арены
//!
//! Два бойца со скриптовым Intent, 1000 тиков, прогресс каждые 100 тиков.

use bevy::prelude::*;
use brawl_simulation::{
    advance_tick, create_headless_app, fighter_views, reset_fighter, round_over, spawn_fighter, FighterView,
    Intent, SimConfig,
};

const TICKS: u64 = 1000;

/// Простейший скрипт: подойти, в дистанции чередовать удары/захват/блок
fn scripted_intent(tick: u64, me: &FighterView, opponent: &FighterView) -> Intent {
    let to_opponent = Vec2::new(
        opponent.position.x - me.position.x,
        opponent.position.z - me.position.z,
    );
    let distance = to_opponent.length();

    if distance > 2.0 {
        return Intent {
            movement: to_opponent.normalize_or_zero(),
            sprint: distance > 8.0,
            ..default()
        };
    }

    // Повернуться к цели коротким шагом, потом действовать
    let phase = (tick / 15 + me.slot as u64) % 6;
    match phase {
        0 => Intent::walk(to_opponent.normalize_or_zero() * 0.2),
        1 | 2 => Intent::light(),
        3 => Intent::heavy(),
        4 => Intent::grab(),
        _ => Intent::block(),
    }
}

fn main() {
    let seed = 42;
    println!("Starting arena headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let dt = app.world().resource::<SimConfig>().fixed_dt();
    let spawns = [Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)];
    let red = spawn_fighter(app.world_mut(), 0, "Red", spawns[0]);
    let blue = spawn_fighter(app.world_mut(), 1, "Blue", spawns[1]);

    let mut total_hits = 0;

    for tick in 0..TICKS {
        let views = fighter_views(app.world_mut());
        if let [a, b] = views.as_slice() {
            let intents = [(a.entity, scripted_intent(tick, a, b)), (b.entity, scripted_intent(tick, b, a))];
            for (entity, intent) in intents {
                if let Some(mut slot) = app.world_mut().get_mut::<Intent>(entity) {
                    *slot = intent;
                }
            }
        }

        let report = advance_tick(app.world_mut(), dt);
        total_hits += report.hits.len();

        if round_over(app.world_mut()) {
            println!("Tick {}: round over, resetting", tick);
            reset_fighter(app.world_mut(), red, spawns[0]);
            reset_fighter(app.world_mut(), blue, spawns[1]);
        }

        if tick % 100 == 0 {
            for view in fighter_views(app.world_mut()) {
                println!(
                    "Tick {}: {} {:?} {:.0}% stamina {:.0}/{:.0}",
                    tick, view.name, view.action, view.damage_percent, view.stamina, view.max_stamina
                );
            }
        }
    }

    println!("Simulation complete! {} hits", total_hits);
}
