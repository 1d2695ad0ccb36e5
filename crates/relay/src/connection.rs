//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Die Verbindungs-Identitaet (PeerId) wird beim Accept
//! vergeben und ist gleichzeitig die Teilnehmer-Identitaet.
//!
//! ## Lebenszyklus
//! ```text
//! Accept -> registrieren -> Welcome (nur an diese Verbindung)
//!   -> Select-Loop (eingehende Frames / ausgehende Queue / Shutdown)
//!   -> Cleanup: entfernen + Left-Broadcast
//! ```
//!
//! Alle Registry- und Hub-Mutationen dieser Verbindung laufen in diesem
//! einen Task, nie nebenlaeufig zueinander.

use futures_util::{SinkExt, StreamExt};
use kamerad_protocol::wire::ServerCodec;
use kamerad_core::types::PeerId;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::dispatcher::SignalDispatcher;
use crate::state::RelayState;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Frames via `ServerCodec`, dispatcht an den `SignalDispatcher`
/// und schreibt die Hub-Queue zurueck auf den Socket.
pub struct ClientConnection {
    state: Arc<RelayState>,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(state: Arc<RelayState>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht. Cleanup (entfernen + Left-Broadcast) passiert immer.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;
        let peer_id = PeerId::new();

        tracing::info!(peer = %peer_addr, peer_id = %peer_id, "Neue Verbindung");

        let dispatcher = SignalDispatcher::neu(Arc::clone(&self.state));

        // Registrieren + Welcome einreihen
        let (teilnehmer, mut ausgang) = match dispatcher.verbinden(peer_id) {
            Ok(ergebnis) => ergebnis,
            Err(e) => {
                tracing::error!(peer = %peer_addr, fehler = %e, "Registrierung fehlgeschlagen");
                return;
            }
        };

        let mut framed = Framed::new(stream, ServerCodec::new());

        loop {
            tokio::select! {
                // Eingehendes Signal vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(signal)) => {
                            tracing::trace!(peer_id = %peer_id, "Signal empfangen");
                            dispatcher.dispatch(&peer_id, signal);
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehendes Signal aus dem Hub
                ausgehend = ausgang.recv() => {
                    match ausgehend {
                        Some(signal) => {
                            if let Err(e) = framed.send(signal).await {
                                tracing::warn!(peer = %peer_addr, fehler = %e, "Senden fehlgeschlagen");
                                break;
                            }
                        }
                        // Queue aus dem Hub entfernt – Verbindung beenden
                        None => break,
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        let _ = framed.close().await;
                        break;
                    }
                }
            }
        }

        // Cleanup beim Verbindungsende
        dispatcher.verbindung_getrennt(&peer_id);
        tracing::info!(
            peer = %peer_addr,
            teilnehmer = %teilnehmer,
            "Verbindungs-Task beendet"
        );
    }
}
