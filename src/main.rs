//! Demo driver standing in for the presentation layer.
//!
//! Loads a catalog JSON file and an optional registry config TOML file,
//! then runs a simulated spawn/expire frame loop on a virtual clock and
//! logs registry statistics.

use log::{info, warn};
use rand::{rngs::StdRng, RngExt, SeedableRng};
use uuid::Uuid;

use bubblepool::{CatalogInput, ContentRegistry, ManualClock, RegistryConfig, TimeSource};

const SIMULATION_TICKS: u64 = 600;
const TICK_MS: u64 = 16;
const STATS_INTERVAL_TICKS: u64 = 120;
const MAX_SPAWNS_PER_TICK: usize = 2;
const MIN_BUBBLE_LIFETIME_MS: u64 = 400;
const MAX_BUBBLE_LIFETIME_MS: u64 = 3_000;

struct ActiveBubble {
    bubble_id: String,
    expires_at_ms: u64,
}

fn load_config(path: Option<&str>) -> Result<RegistryConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(RegistryConfig::default());
    };
    if !std::path::Path::new(path).exists() {
        let default_config = RegistryConfig::default();
        info!(
            "Config file not found. Creating default config. path={}",
            path
        );
        std::fs::write(path, toml::to_string(&default_config)?)?;
        return Ok(default_config);
    }
    Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Debug);
    clog.init();

    let mut args = std::env::args().skip(1);
    let Some(catalog_path) = args.next() else {
        eprintln!("Usage: bubblepool <catalog.json> [config.toml]");
        std::process::exit(2);
    };
    let config = load_config(args.next().as_deref())?;

    let catalog: CatalogInput = serde_json::from_str(&std::fs::read_to_string(&catalog_path)?)?;

    let clock = ManualClock::new();
    let mut registry = ContentRegistry::with_time_source(config, Box::new(clock.clone()))?;
    registry.initialize(&catalog);

    let mut seed = [0u8; 32];
    getrandom::fill(&mut seed).expect("Failed to generate random seed");
    let mut rng = StdRng::from_seed(seed);
    let mut active_bubbles: Vec<ActiveBubble> = Vec::new();

    for tick in 1..=SIMULATION_TICKS {
        clock.advance(TICK_MS);
        let now_ms = clock.now_ms();

        // Retire bubbles whose lifetime ended this tick.
        active_bubbles.retain(|bubble| {
            if bubble.expires_at_ms <= now_ms {
                registry.unregister_bubble(&bubble.bubble_id);
                false
            } else {
                true
            }
        });

        for _ in 0..MAX_SPAWNS_PER_TICK {
            if registry.stats().displayed_content >= registry.config().max_displayed_items {
                break;
            }
            let Some(item) = registry.next_unique_content() else {
                break;
            };
            let bubble_id = Uuid::new_v4().to_string();
            if !registry.register_bubble(&item.id, &bubble_id, item.content_type) {
                warn!("Registration rejected for selected content: id={}", item.id);
                break;
            }
            let lifetime_ms = rng.random_range(MIN_BUBBLE_LIFETIME_MS..=MAX_BUBBLE_LIFETIME_MS);
            active_bubbles.push(ActiveBubble {
                bubble_id,
                expires_at_ms: now_ms + lifetime_ms,
            });
        }

        if tick % STATS_INTERVAL_TICKS == 0 {
            info!(
                "tick={} stats={}",
                tick,
                serde_json::to_string(&registry.stats())?
            );
        }
    }

    info!(
        "Simulation complete: {}",
        serde_json::to_string(&registry.stats())?
    );
    Ok(())
}
