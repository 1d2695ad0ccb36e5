//! Presence-Announcer – Meldet die Kamera genau einmal an

use kamerad_protocol::signal::ClientSignal;
use tokio::sync::mpsc;

use crate::error::{SessionError, SessionResult};

/// Sendet `OpenCamera` genau einmal pro Verbindung
///
/// Erst nach dieser Ankuendigung macht das Relay den Teilnehmer per
/// `Joined` fuer andere sichtbar. Wiederholte Aufrufe (etwa wenn der
/// Nutzer die Kamera aus- und wieder einschaltet) sind No-Ops.
#[derive(Debug, Default)]
pub struct PresenceAnnouncer {
    angekuendigt: bool,
}

impl PresenceAnnouncer {
    /// Erstellt einen neuen Announcer
    pub fn neu() -> Self {
        Self::default()
    }

    /// true wenn die Ankuendigung bereits gesendet wurde
    pub fn ist_angekuendigt(&self) -> bool {
        self.angekuendigt
    }

    /// Sendet `OpenCamera`, falls noch nicht geschehen
    ///
    /// Gibt `true` zurueck, wenn tatsaechlich gesendet wurde.
    pub async fn ankuendigen(
        &mut self,
        ausgang: &mpsc::Sender<ClientSignal>,
    ) -> SessionResult<bool> {
        if self.angekuendigt {
            tracing::debug!("Kamera bereits angekuendigt – uebersprungen");
            return Ok(false);
        }

        ausgang
            .send(ClientSignal::OpenCamera)
            .await
            .map_err(|_| SessionError::SendFehler)?;
        self.angekuendigt = true;

        tracing::info!("Kamera beim Relay angekuendigt");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ankuendigung_wird_nur_einmal_gesendet() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut announcer = PresenceAnnouncer::neu();

        assert!(announcer.ankuendigen(&tx).await.unwrap());
        assert!(!announcer.ankuendigen(&tx).await.unwrap());
        assert!(announcer.ist_angekuendigt());

        assert!(matches!(rx.recv().await, Some(ClientSignal::OpenCamera)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn geschlossener_kanal_liefert_sendfehler() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);

        let mut announcer = PresenceAnnouncer::neu();
        let ergebnis = announcer.ankuendigen(&tx).await;
        assert!(matches!(ergebnis, Err(SessionError::SendFehler)));
        assert!(!announcer.ist_angekuendigt());
    }
}
