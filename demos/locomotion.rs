//! Locomotion Controller Events
//!
//! This example drives a two-layer animation controller from a scripted
//! poll sequence and prints every event the observers report.
//!
//! Key concepts:
//! - Metadata loaded from JSON before initialization
//! - State and transition observers sharing one manager
//! - A custom LayerSource standing in for the real controller
//! - Stale hashes reported in the tick summary
//!
//! Run with: cargo run --example locomotion
//! Set RUST_LOG=animwatch=debug to see the manager's own logging.

use animwatch::{
    ControllerMetadata, EventManager, LayerFilter, LayerSample, LayerSource, ManagerConfig,
    StateEvent,
};
use tracing_subscriber::EnvFilter;

const METADATA: &str = r#"{
    "states": [
        {"id": 1, "name": "Idle", "layer": 0, "layer_name": "Base Layer"},
        {"id": 2, "name": "Walk", "layer": 0, "layer_name": "Base Layer"},
        {"id": 3, "name": "Run", "layer": 0, "layer_name": "Base Layer"},
        {"id": 20, "name": "Empty", "layer": 1, "layer_name": "Upper Body"},
        {"id": 21, "name": "Wave", "layer": 1, "layer_name": "Upper Body"}
    ],
    "transitions": [
        {"id": 112, "name": "Idle -> Walk", "layer": 0, "layer_name": "Base Layer",
         "source": 1, "dest": 2, "atomic": false, "duration": 0.25,
         "mute": false, "offset": 0.0, "solo": false},
        {"id": 123, "name": "Walk -> Run", "layer": 0, "layer_name": "Base Layer",
         "source": 2, "dest": 3, "atomic": false, "duration": 0.15,
         "mute": false, "offset": 0.0, "solo": false},
        {"id": 131, "name": "Run -> Idle", "layer": 0, "layer_name": "Base Layer",
         "source": 3, "dest": 1, "atomic": true, "duration": 0.4,
         "mute": false, "offset": 0.1, "solo": false},
        {"id": 2021, "name": "Empty -> Wave", "layer": 1, "layer_name": "Upper Body",
         "source": 20, "dest": 21, "atomic": false, "duration": 0.2,
         "mute": false, "offset": 0.0, "solo": false}
    ]
}"#;

/// Replays a fixed list of per-layer samples, one row per tick.
struct ScriptedController {
    frames: Vec<[(i32, i32); 2]>,
    frame: usize,
}

impl ScriptedController {
    fn advance(&mut self) -> bool {
        self.frame += 1;
        self.frame < self.frames.len()
    }
}

impl LayerSource for ScriptedController {
    fn sample(&mut self, layer: usize) -> LayerSample {
        self.frames[self.frame][layer].into()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Locomotion Controller Events ===\n");

    let metadata = ControllerMetadata::from_json(METADATA).unwrap();
    println!(
        "Loaded {} states and {} transitions",
        metadata.state_count(),
        metadata.transition_count()
    );

    let mut manager = EventManager::new(ManagerConfig::default().strict_metadata(true));
    manager.initialize(2, metadata).unwrap();

    let any = manager.any_state(LayerFilter::Any);
    manager
        .observer_mut(any)
        .unwrap()
        .on_change(|info, status| {
            println!("  [layer {}] now in {}", status.layer(), info.full_name())
        })
        .unwrap();

    let walk = manager.specific_state(0, 2);
    let observer = manager.observer_mut(walk).unwrap();
    observer
        .on_enter(|_, _| println!("  Walk: footstep sounds on"))
        .unwrap();
    observer
        .on_exit(|_, _| println!("  Walk: footstep sounds off"))
        .unwrap();
    observer
        .subscribe_state(StateEvent::Stay, |_, _| println!("  Walk: still walking"))
        .unwrap();

    let blends = manager.any_transition(0);
    let observer = manager.observer_mut(blends).unwrap();
    observer
        .on_started(|info, _| {
            println!(
                "  Blend started: {} over {:.2}s{}",
                info.name,
                info.duration,
                if info.atomic { " (atomic)" } else { "" }
            )
        })
        .unwrap();
    observer
        .on_finished(|info, _| println!("  Blend finished: {}", info.name))
        .unwrap();

    let wave = manager.transition_to_state(1, 21);
    manager
        .observer_mut(wave)
        .unwrap()
        .on_started(|_, _| println!("  Upper body starts waving"))
        .unwrap();

    let mut controller = ScriptedController {
        frames: vec![
            [(1, 0), (20, 0)],
            [(1, 112), (20, 0)],
            [(2, 0), (20, 0)],
            [(2, 0), (20, 2021)],
            [(2, 123), (21, 0)],
            [(3, 0), (21, 0)],
            // An animator edit the metadata never saw.
            [(3, 999), (20, 0)],
            [(3, 131), (20, 0)],
            [(1, 0), (20, 0)],
        ],
        frame: 0,
    };

    loop {
        println!("Tick {}:", manager.tick_count());
        match manager.tick(&mut controller) {
            Ok(report) if !report.is_clean() => {
                for skipped in &report.skipped {
                    println!("  (skipped: {skipped})");
                }
            }
            Ok(_) => {}
            Err(err) => {
                println!("  dispatch failed: {err}");
                break;
            }
        }
        if !controller.advance() {
            break;
        }
    }

    println!("\nHash lookups:");
    for raw in [2, 123, 999] {
        let name = manager.id_to_name(raw);
        println!(
            "  {raw:>4} -> {}",
            if name.is_empty() { "<unknown>" } else { name }
        );
    }

    println!("\n=== Example Complete ===");
}
