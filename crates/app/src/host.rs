//! Headless zone host.
//!
//! Runs one or more zone nodes without rendering. In `loopback` mode a hub
//! and its clients live in this process, joined by an in-memory star
//! network, and are stepped in lockstep.

use std::path::{Path, PathBuf};

use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::event::Events;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use net::{LoopbackNetwork, NetLink, NetRole, NetSyncPlugin, PeerId};
use save::{LoadZonesEvent, NewZoneWorldEvent, SaveZonesEvent, ZoneFileOutcome, ZoneSavePlugin};
use zones::{ZoneWorld, ZonesPlugin};

const DEFAULT_TICKS: u32 = 60;
const DEFAULT_CLIENTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    Standalone,
    Loopback { clients: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub mode: HostMode,
    /// Zone file loaded at start (if it exists) and written on exit.
    pub save_path: Option<PathBuf>,
    pub ticks: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            mode: HostMode::Standalone,
            save_path: None,
            ticks: DEFAULT_TICKS,
        }
    }
}

impl HostConfig {
    /// Reads `ZONES_ROLE`, `ZONES_CLIENTS`, `ZONES_SAVE` and `ZONES_TICKS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to their defaults with a message on
    /// stderr (logging is not set up yet at this point).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = HostConfig::default();

        let clients = parse_or(&lookup, "ZONES_CLIENTS", DEFAULT_CLIENTS);
        match lookup("ZONES_ROLE").as_deref().map(str::trim) {
            None | Some("") | Some("standalone") => {}
            Some("loopback") => config.mode = HostMode::Loopback { clients },
            Some(other) => eprintln!("ZONES_ROLE: unknown role '{other}', running standalone"),
        }
        config.save_path = lookup("ZONES_SAVE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        config.ticks = parse_or(&lookup, "ZONES_TICKS", DEFAULT_TICKS);
        config
    }
}

fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            eprintln!("{key}: '{raw}' is not a number, using {default}");
            default
        }),
    }
}

/// One headless node. Only the first node of a process installs the logger.
pub fn build_node(link: NetLink, with_logging: bool) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_once()));
    if with_logging {
        app.add_plugins(LogPlugin::default());
    }
    app.insert_resource(link);
    app.add_plugins((ZonesPlugin, NetSyncPlugin, ZoneSavePlugin));
    app
}

/// Sends the event that gives `app` its initial zone world.
fn open_world(app: &mut App, save_path: Option<&PathBuf>) {
    match save_path.filter(|path| path.exists()) {
        Some(path) => {
            app.world_mut()
                .send_event(LoadZonesEvent { path: path.clone() });
        }
        None => {
            app.world_mut().send_event(NewZoneWorldEvent);
        }
    }
}

fn save_world(app: &mut App, path: &Path) {
    app.world_mut().send_event(SaveZonesEvent {
        path: path.to_path_buf(),
    });
    app.update();
}

fn report_file_outcomes(app: &mut App) {
    let outcomes: Vec<ZoneFileOutcome> = app
        .world_mut()
        .resource_mut::<Events<ZoneFileOutcome>>()
        .drain()
        .collect();
    for outcome in outcomes {
        if let ZoneFileOutcome::Failed { message } = outcome {
            warn!("{message}");
        }
    }
}

fn zone_count(app: &App) -> usize {
    app.world()
        .get_resource::<ZoneWorld>()
        .map_or(0, ZoneWorld::len)
}

/// A hub with its clients, stepped together.
pub struct LoopbackSession {
    pub hub: App,
    pub clients: Vec<App>,
}

impl LoopbackSession {
    pub fn new(clients: u32, with_logging: bool) -> Self {
        let (hub_transport, client_transports) = LoopbackNetwork::star(clients);
        let hub = build_node(
            NetLink::new(NetRole::Hub, PeerId::HUB, hub_transport),
            with_logging,
        );
        let clients = client_transports
            .into_iter()
            .map(|transport| {
                let mut app = build_node(
                    NetLink::new(NetRole::Client, transport.id(), transport),
                    false,
                );
                app.world_mut().send_event(NewZoneWorldEvent);
                app
            })
            .collect();
        Self { hub, clients }
    }

    /// Hub first, so clients see its relays within the same step.
    pub fn step(&mut self) {
        self.hub.update();
        for client in &mut self.clients {
            client.update();
        }
    }

    pub fn zone_counts(&self) -> (usize, Vec<usize>) {
        (
            zone_count(&self.hub),
            self.clients.iter().map(zone_count).collect(),
        )
    }
}

pub fn run(config: &HostConfig) {
    match config.mode {
        HostMode::Standalone => {
            let mut app = build_node(NetLink::standalone(), true);
            open_world(&mut app, config.save_path.as_ref());
            for _ in 0..config.ticks {
                app.update();
                report_file_outcomes(&mut app);
            }
            info!("Standalone host: {} zone(s)", zone_count(&app));
            if let Some(path) = &config.save_path {
                save_world(&mut app, path);
                report_file_outcomes(&mut app);
            }
        }
        HostMode::Loopback { clients } => {
            let mut session = LoopbackSession::new(clients, true);
            open_world(&mut session.hub, config.save_path.as_ref());
            for _ in 0..config.ticks {
                session.step();
                report_file_outcomes(&mut session.hub);
            }
            let (hub, clients) = session.zone_counts();
            info!("Loopback host: hub has {hub} zone(s), clients have {clients:?}");
            if let Some(path) = &config.save_path {
                save_world(&mut session.hub, path);
                report_file_outcomes(&mut session.hub);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use zones::{TileRect, Zone};

    use super::*;

    fn config(vars: &[(&str, &str)]) -> HostConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HostConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(config(&[]), HostConfig::default());
    }

    #[test]
    fn test_loopback_config() {
        let config = config(&[
            ("ZONES_ROLE", "loopback"),
            ("ZONES_CLIENTS", "3"),
            ("ZONES_SAVE", "zones.json"),
            ("ZONES_TICKS", " 5 "),
        ]);
        assert_eq!(config.mode, HostMode::Loopback { clients: 3 });
        assert_eq!(config.save_path, Some(PathBuf::from("zones.json")));
        assert_eq!(config.ticks, 5);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config(&[("ZONES_ROLE", "mesh"), ("ZONES_TICKS", "many")]);
        assert_eq!(config.mode, HostMode::Standalone);
        assert_eq!(config.ticks, DEFAULT_TICKS);
    }

    #[test]
    fn test_loopback_session_converges() {
        let mut session = LoopbackSession::new(2, false);
        session.hub.world_mut().send_event(NewZoneWorldEvent);
        session.step();
        session.step();

        {
            let mut zones = session.clients[0].world_mut().resource_mut::<ZoneWorld>();
            let key = zones.add_zone(Zone::new_fresh(TileRect::new(0, 0, 3, 3), "alice"));
            zones.confirm_zone(key);
        }
        session.step();
        session.step();

        assert_eq!(session.zone_counts(), (1, vec![1, 1]));
    }
}
