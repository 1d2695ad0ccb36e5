//! Gemeinsamer Relay-Zustand
//!
//! Haelt Konfiguration, Praesenz-Registry und Signal-Hub als Arc-geteilte
//! Referenzen, die sicher zwischen tokio-Tasks geteilt werden koennen.

use std::sync::Arc;

use crate::hub::SignalHub;
use crate::presence::PresenceRegistry;

/// Konfiguration fuer das Signaling-Relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Anzeigename des Relays (nur Logging)
    pub name: String,
    /// Maximale gleichzeitige Clients
    pub max_clients: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            name: "Kamerad Relay".to_string(),
            max_clients: 64,
        }
    }
}

/// Gemeinsamer Relay-Zustand (thread-safe, Arc-geteilt)
pub struct RelayState {
    /// Relay-Konfiguration
    pub config: Arc<RelayConfig>,
    /// Praesenz-Registry (wer ist verbunden, wer angekuendigt)
    pub presence: PresenceRegistry,
    /// Signal-Hub (Send-Queues aller Clients)
    pub hub: SignalHub,
}

impl RelayState {
    /// Erstellt einen neuen RelayState
    pub fn neu(config: RelayConfig) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            presence: PresenceRegistry::neu(),
            hub: SignalHub::neu(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.max_clients, 64);
    }

    #[test]
    fn neuer_state_ist_leer() {
        let state = RelayState::neu(RelayConfig::default());
        assert_eq!(state.presence.anzahl(), 0);
        assert_eq!(state.hub.anzahl(), 0);
    }
}
