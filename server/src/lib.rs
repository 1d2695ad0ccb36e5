//! kamerad-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und stellt den oeffentlichen
//! Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use anyhow::Result;
use kamerad_core::KameradError;
use kamerad_relay::state::{RelayConfig, RelayState};
use kamerad_relay::tcp::SignalingServer;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

use config::ServerConfig;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet das Signaling-Relay und laeuft bis zum Shutdown-Signal
    pub async fn starten(self) -> Result<()> {
        let bind_adresse: SocketAddr = self.config.bind_adresse().parse().map_err(|e| {
            KameradError::Konfiguration(format!(
                "Ungueltige Bind-Adresse '{}': {e}",
                self.config.bind_adresse()
            ))
        })?;

        let relay_config = RelayConfig {
            name: self.config.server.name.clone(),
            max_clients: self.config.server.max_clients,
        };
        let state = RelayState::neu(relay_config);

        tracing::info!(
            relay_name = %self.config.server.name,
            adresse = %bind_adresse,
            max_clients = self.config.server.max_clients,
            "Relay startet"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let relay = SignalingServer::neu(Arc::clone(&state));
        let relay_task = tokio::spawn(relay.starten(bind_adresse, shutdown_rx));

        tracing::info!("Relay laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Relay wird beendet");

        let _ = shutdown_tx.send(true);
        relay_task.await??;

        Ok(())
    }
}
