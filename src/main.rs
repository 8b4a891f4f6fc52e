//! Point d'entrée de TabBrows.
//!
//! Usage :
//!   tabbrows [URL|recherche]...
//!
//! Exemples :
//!   cargo run                              → onglets de démarrage de la config
//!   cargo run -- https://servo.org         → charge servo.org
//!   cargo run -- wikipedia.org             → ajoute https:// automatiquement
//!   cargo run -- "rust lang" github.com    → deux onglets, dont une recherche

use std::env;
use std::error::Error;

use tabbrows::browser::{self, App};
use tabbrows::config::Config;
use tabbrows::{engine, icon};
use winit::event_loop::EventLoop;

fn main() -> Result<(), Box<dyn Error>> {
    // ── 1. Logging / Tracing ───────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // ── 2. Configuration ───────────────────────────────────────────────
    let config = Config::load();

    // ── 3. Flags moteur (avant toute création de thread) ───────────────
    if config.media.proprietary_codecs {
        // SAFETY: aucun autre thread n'existe encore.
        unsafe { engine::enable_proprietary_codecs() };
    }

    // ── 4. Icône + onglets de démarrage ────────────────────────────────
    let app_icon = icon::resolve_icon(&config.icons.primary, &config.icons.secondary);
    let startup = browser::startup_requests(&config, env::args().skip(1));
    tracing::info!(tabs = startup.len(), "Starting");

    // ── 5. Boucle d'événements Winit ───────────────────────────────────
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, startup, app_icon);

    Ok(event_loop.run_app(&mut app)?)
}
