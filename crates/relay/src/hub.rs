//! Signal-Hub – Send-Queues aller verbundenen Clients
//!
//! Der SignalHub haelt pro Verbindung eine begrenzte Send-Queue und stellt
//! die beiden Zustellarten des Relays bereit:
//! - gezielt an einen Teilnehmer: `an_peer_senden`
//! - an alle ausser einen: `an_alle_ausser_senden` (Joined/Left-Meldungen)
//!
//! Zustellung ist best-effort: eine volle oder geschlossene Queue fuehrt
//! zu einem Log-Eintrag und einer verworfenen Nachricht, nie zu einem
//! Fehler beim Absender.

use dashmap::DashMap;
use kamerad_core::types::PeerId;
use kamerad_protocol::signal::ServerSignal;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Client
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// PeerSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue eines verbundenen Clients
#[derive(Clone, Debug)]
pub struct PeerSender {
    pub peer_id: PeerId,
    pub tx: mpsc::Sender<ServerSignal>,
}

impl PeerSender {
    /// Sendet ein Signal nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, signal: ServerSignal) -> bool {
        match self.tx.try_send(signal) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(peer_id = %self.peer_id, "Send-Queue voll – Signal verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(peer_id = %self.peer_id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SignalHub
// ---------------------------------------------------------------------------

/// Zentraler Verteiler fuer ausgehende ServerSignale
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct SignalHub {
    inner: Arc<SignalHubInner>,
}

struct SignalHubInner {
    /// Peer-Sender, indiziert nach PeerId
    clients: DashMap<PeerId, PeerSender>,
}

impl SignalHub {
    /// Erstellt einen neuen SignalHub
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(SignalHubInner {
                clients: DashMap::new(),
            }),
        }
    }

    /// Registriert einen neuen Client und gibt seine Empfangs-Queue zurueck
    ///
    /// Die `ClientConnection` liest aus dieser Queue und sendet via TCP.
    pub fn registrieren(&self, peer_id: PeerId) -> mpsc::Receiver<ServerSignal> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let sender = PeerSender { peer_id, tx };
        self.inner.clients.insert(peer_id, sender);
        tracing::debug!(peer_id = %peer_id, "Client im Hub registriert");
        rx
    }

    /// Entfernt einen Client aus dem Hub
    pub fn entfernen(&self, peer_id: &PeerId) {
        self.inner.clients.remove(peer_id);
        tracing::debug!(peer_id = %peer_id, "Client aus Hub entfernt");
    }

    /// Sendet ein Signal an einen einzelnen Client
    ///
    /// Gibt `true` zurueck wenn der Client gefunden und das Signal
    /// eingereiht wurde. Ein unbekanntes Ziel ist kein Fehler – der
    /// Teilnehmer ist fast immer schon gegangen.
    pub fn an_peer_senden(&self, peer_id: &PeerId, signal: ServerSignal) -> bool {
        match self.inner.clients.get(peer_id) {
            Some(sender) => sender.senden(signal),
            None => {
                tracing::debug!(peer_id = %peer_id, "Senden an unbekannten Client");
                false
            }
        }
    }

    /// Sendet ein Signal an alle verbundenen Clients ausser einem
    ///
    /// Gibt die Anzahl der erfolgreichen Sendungen zurueck.
    pub fn an_alle_ausser_senden(&self, ausgeschlossen: &PeerId, signal: ServerSignal) -> usize {
        let mut gesendet = 0;
        self.inner.clients.iter().for_each(|entry| {
            if entry.key() == ausgeschlossen {
                return;
            }
            if entry.value().senden(signal.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Gibt die Anzahl der registrierten Clients zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.clients.len()
    }

    /// Prueft ob ein Client registriert ist
    pub fn ist_registriert(&self, peer_id: &PeerId) -> bool {
        self.inner.clients.contains_key(peer_id)
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
