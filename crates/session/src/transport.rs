//! Transport-Schnittstelle – Grenze zum externen Echtzeit-Transport
//!
//! Kamerad verhandelt Verbindungen, baut sie aber nicht selbst auf:
//! Medienaufnahme, Verschluesselung und Transportaufbau erledigt eine
//! externe Engine hinter diesen Traits. Beschreibungen und Kandidaten
//! sind fuer uns opake Nutzlasten – wir reichen sie unveraendert durch.

use async_trait::async_trait;
use kamerad_core::types::PeerId;
use kamerad_protocol::signal::{CandidateDescriptor, SessionDescription};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Fehlertyp des externen Echtzeit-Transports
#[derive(Debug, Error)]
pub enum TransportError {
    /// Eine Transport-Operation ist fehlgeschlagen
    #[error("Transport-Operation fehlgeschlagen: {0}")]
    Fehlgeschlagen(String),

    /// Der Transport wurde bereits geschlossen
    #[error("Transport bereits geschlossen")]
    Geschlossen,
}

/// Result-Typ fuer Transport-Operationen
pub type TransportResult<T> = Result<T, TransportError>;

/// Eine Verbindung zu genau einem entfernten Teilnehmer
///
/// Implementierungen kapseln die eigentliche Echtzeit-Engine. Alle
/// Methoden werden aus genau einem Task (dem `MeshContext`) aufgerufen.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Bindet die lokalen Medienspuren (Kamera/Mikrofon) an den Transport
    async fn lokale_medien_anbinden(&self) -> TransportResult<()>;

    /// Erzeugt eine lokale Angebots-Beschreibung
    async fn angebot_erstellen(&self) -> TransportResult<SessionDescription>;

    /// Erzeugt eine lokale Antwort-Beschreibung
    ///
    /// Setzt voraus, dass die Remote-Beschreibung bereits gesetzt wurde.
    async fn antwort_erstellen(&self) -> TransportResult<SessionDescription>;

    /// Uebergibt die Beschreibung der Gegenseite an die Engine
    async fn remote_beschreibung_setzen(
        &self,
        beschreibung: SessionDescription,
    ) -> TransportResult<()>;

    /// Wendet einen Verbindungskandidaten der Gegenseite an
    async fn kandidat_anwenden(&self, kandidat: CandidateDescriptor) -> TransportResult<()>;

    /// Schliesst den Transport und gibt seine Ressourcen frei
    ///
    /// Muss den Sender der lokalen Kandidaten fallen lassen, damit der
    /// Weiterleitungs-Task des Mesh endet.
    async fn schliessen(&self);
}

/// Ein frisch erzeugter Transport samt Kandidaten-Strom
///
/// Die Engine meldet lokal entdeckte Verbindungskandidaten ueber den
/// Receiver; der Strom endet, wenn der Transport geschlossen wird.
pub struct NeuerTransport {
    pub transport: Arc<dyn PeerTransport>,
    pub lokale_kandidaten: mpsc::Receiver<CandidateDescriptor>,
}

/// Erzeugt Transporte fuer entfernte Teilnehmer
///
/// Pro Verhandlungs-Sitzung wird genau ein Transport erzeugt; bei einer
/// Glare-Aufloesung ein frischer Ersatz fuer dieselbe Gegenseite.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Erzeugt einen neuen Transport fuer den angegebenen Teilnehmer
    async fn erstellen(&self, remote: PeerId) -> TransportResult<NeuerTransport>;
}

// ---------------------------------------------------------------------------
// Test-Mocks (crate-intern, von negotiation- und mesh-Tests geteilt)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests_mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Zeichnet alle Transport-Aufrufe auf
    ///
    /// Haelt den Sender des Kandidaten-Stroms, damit Tests lokale
    /// Kandidaten einspeisen koennen; `schliessen` laesst ihn fallen.
    #[derive(Default)]
    pub struct MockTransport {
        remote_beschreibungen: Mutex<Vec<SessionDescription>>,
        kandidaten: Mutex<Vec<CandidateDescriptor>>,
        medien: AtomicBool,
        geschlossen: AtomicBool,
        kandidaten_tx: Mutex<Option<mpsc::Sender<CandidateDescriptor>>>,
    }

    impl MockTransport {
        /// Erzeugt Transport samt Kandidaten-Strom wie eine echte Factory
        pub fn mit_kandidaten_strom() -> (Arc<Self>, mpsc::Receiver<CandidateDescriptor>) {
            let (tx, rx) = mpsc::channel(16);
            let transport = Arc::new(Self {
                kandidaten_tx: Mutex::new(Some(tx)),
                ..Self::default()
            });
            (transport, rx)
        }

        pub fn remote_beschreibungen(&self) -> Vec<SessionDescription> {
            self.remote_beschreibungen.lock().unwrap().clone()
        }

        pub fn kandidaten(&self) -> Vec<CandidateDescriptor> {
            self.kandidaten.lock().unwrap().clone()
        }

        pub fn medien_angebunden(&self) -> bool {
            self.medien.load(Ordering::SeqCst)
        }

        pub fn geschlossen(&self) -> bool {
            self.geschlossen.load(Ordering::SeqCst)
        }

        /// Speist einen lokal entdeckten Kandidaten ein
        pub async fn lokalen_kandidaten_melden(&self, kandidat: CandidateDescriptor) {
            let tx = self.kandidaten_tx.lock().unwrap().clone();
            if let Some(tx) = tx {
                let _ = tx.send(kandidat).await;
            }
        }
    }

    #[async_trait]
    impl PeerTransport for MockTransport {
        async fn lokale_medien_anbinden(&self) -> TransportResult<()> {
            self.medien.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn angebot_erstellen(&self) -> TransportResult<SessionDescription> {
            Ok(SessionDescription::neu(serde_json::json!({
                "type": "offer",
                "sdp": "v=0"
            })))
        }

        async fn antwort_erstellen(&self) -> TransportResult<SessionDescription> {
            Ok(SessionDescription::neu(serde_json::json!({
                "type": "answer",
                "sdp": "v=0"
            })))
        }

        async fn remote_beschreibung_setzen(
            &self,
            beschreibung: SessionDescription,
        ) -> TransportResult<()> {
            self.remote_beschreibungen.lock().unwrap().push(beschreibung);
            Ok(())
        }

        async fn kandidat_anwenden(&self, kandidat: CandidateDescriptor) -> TransportResult<()> {
            self.kandidaten.lock().unwrap().push(kandidat);
            Ok(())
        }

        async fn schliessen(&self) {
            self.geschlossen.store(true, Ordering::SeqCst);
            // Kandidaten-Strom beenden
            self.kandidaten_tx.lock().unwrap().take();
        }
    }

    /// Factory, die alle erzeugten Mock-Transporte aufbewahrt
    #[derive(Default)]
    pub struct MockFactory {
        erzeugte: Mutex<Vec<(PeerId, Arc<MockTransport>)>>,
    }

    impl MockFactory {
        /// Alle bisher erzeugten Transporte fuer einen Teilnehmer
        pub fn transporte_fuer(&self, remote: &PeerId) -> Vec<Arc<MockTransport>> {
            self.erzeugte
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| id == remote)
                .map(|(_, t)| Arc::clone(t))
                .collect()
        }

        pub fn anzahl_erzeugt(&self) -> usize {
            self.erzeugte.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TransportFactory for MockFactory {
        async fn erstellen(&self, remote: PeerId) -> TransportResult<NeuerTransport> {
            let (transport, lokale_kandidaten) = MockTransport::mit_kandidaten_strom();
            self.erzeugte
                .lock()
                .unwrap()
                .push((remote, Arc::clone(&transport)));
            Ok(NeuerTransport {
                transport,
                lokale_kandidaten,
            })
        }
    }
}
