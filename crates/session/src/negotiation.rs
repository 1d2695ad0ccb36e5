//! Verhandlungs-Sitzung – Zustandsautomat pro entferntem Teilnehmer
//!
//! Jede Sitzung verhandelt genau eine Verbindung: entweder als Anbieter
//! (Offer senden, auf Answer warten) oder als Antworter (Offer empfangen,
//! Answer senden). Der Automat macht die Rolle explizit, statt sie wie
//! ueblich im Transport-Zustand zu verstecken:
//!
//! ```text
//! Idle --anbieten--> LocalOfferPending --Answer--> Stable
//! Idle --Offer-----> RemoteOfferReceived -------> Stable
//! * ---schliessen--> Closed
//! ```
//!
//! Glare (beide Seiten senden gleichzeitig ein Offer) loest der
//! [`MeshContext`](crate::mesh::MeshContext) auf: die Seite mit der
//! lexikografisch kleineren PeerId gibt nach, verwirft ihr ausstehendes
//! Offer samt Transport und spielt das fremde Offer als Antworter neu.

use kamerad_core::types::{Participant, PeerId};
use kamerad_protocol::signal::{CandidateDescriptor, ClientSignal, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{SessionError, SessionResult};
use crate::staging::CandidateStaging;
use crate::transport::PeerTransport;

/// Zustand einer Verhandlungs-Sitzung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// Sitzung existiert, noch keine Beschreibung unterwegs
    Idle,
    /// Eigenes Offer gesendet, Answer steht aus
    LocalOfferPending,
    /// Fremdes Offer angenommen, eigene Answer wird erzeugt
    RemoteOfferReceived,
    /// Beide Beschreibungen gesetzt, Kandidaten fliessen direkt
    Stable,
    /// Sitzung beendet, Transport freigegeben
    Closed,
}

/// Verhandlungs-Sitzung zu genau einem entfernten Teilnehmer
pub struct NegotiationSession {
    remote: Participant,
    zustand: NegotiationState,
    transport: Arc<dyn PeerTransport>,
    staging: CandidateStaging,
    remote_beschreibung_gesetzt: bool,
    ausgang: mpsc::Sender<ClientSignal>,
}

impl NegotiationSession {
    /// Erstellt eine neue Sitzung im Idle-Zustand
    pub fn neu(
        remote: Participant,
        transport: Arc<dyn PeerTransport>,
        ausgang: mpsc::Sender<ClientSignal>,
    ) -> Self {
        Self::mit_staging(remote, transport, ausgang, CandidateStaging::neu())
    }

    /// Erstellt eine Sitzung mit vorbefuellter Kandidaten-Warteschlange
    ///
    /// Bei einer Glare-Aufloesung uebernimmt die Ersatz-Sitzung die
    /// bereits eingetroffenen Kandidaten der Gegenseite – die gehoeren
    /// zum fremden Offer, das gleich angenommen wird.
    pub fn mit_staging(
        remote: Participant,
        transport: Arc<dyn PeerTransport>,
        ausgang: mpsc::Sender<ClientSignal>,
        staging: CandidateStaging,
    ) -> Self {
        Self {
            remote,
            zustand: NegotiationState::Idle,
            transport,
            staging,
            remote_beschreibung_gesetzt: false,
            ausgang,
        }
    }

    /// Der entfernte Teilnehmer dieser Sitzung
    pub fn remote(&self) -> &Participant {
        &self.remote
    }

    /// Aktueller Zustand
    pub fn zustand(&self) -> NegotiationState {
        self.zustand
    }

    /// Startet die Verhandlung als Anbieter
    ///
    /// Bindet die lokalen Medien an, erzeugt ein Offer und sendet es an
    /// die Gegenseite. Nur im Idle-Zustand gueltig; sonst No-Op.
    pub async fn anbieten(&mut self) -> SessionResult<()> {
        if self.zustand != NegotiationState::Idle {
            tracing::warn!(
                remote = %self.remote,
                zustand = ?self.zustand,
                "Anbieten nur im Idle-Zustand – ignoriert"
            );
            return Ok(());
        }

        self.transport.lokale_medien_anbinden().await?;
        let beschreibung = self.transport.angebot_erstellen().await?;
        self.zustand = NegotiationState::LocalOfferPending;

        tracing::info!(remote = %self.remote, "Offer gesendet");
        self.senden(ClientSignal::Offer {
            target: self.remote.id,
            description: beschreibung,
        })
        .await
    }

    /// Nimmt ein fremdes Offer an und antwortet darauf
    ///
    /// Nur im Idle-Zustand gueltig. Setzt die Remote-Beschreibung,
    /// erzeugt eine Answer, sendet sie und leert die
    /// Kandidaten-Warteschlange.
    pub async fn angebot_empfangen(
        &mut self,
        beschreibung: SessionDescription,
    ) -> SessionResult<()> {
        if self.zustand != NegotiationState::Idle {
            tracing::warn!(
                remote = %self.remote,
                zustand = ?self.zustand,
                "Offer in ungueltigem Zustand – ignoriert"
            );
            return Ok(());
        }
        self.zustand = NegotiationState::RemoteOfferReceived;

        self.transport.lokale_medien_anbinden().await?;
        self.transport.remote_beschreibung_setzen(beschreibung).await?;
        self.remote_beschreibung_gesetzt = true;

        let antwort = self.transport.antwort_erstellen().await?;
        self.zustand = NegotiationState::Stable;

        tracing::info!(remote = %self.remote, "Answer gesendet");
        self.senden(ClientSignal::Answer {
            target: self.remote.id,
            description: antwort,
        })
        .await?;

        self.staging.leeren(&*self.transport).await;
        Ok(())
    }

    /// Nimmt die Answer der Gegenseite an
    ///
    /// Nur gueltig, wenn ein eigenes Offer aussteht. Setzt die
    /// Remote-Beschreibung und leert die Kandidaten-Warteschlange.
    pub async fn antwort_empfangen(
        &mut self,
        beschreibung: SessionDescription,
    ) -> SessionResult<()> {
        if self.zustand != NegotiationState::LocalOfferPending {
            tracing::warn!(
                remote = %self.remote,
                zustand = ?self.zustand,
                "Answer ohne ausstehendes Offer – ignoriert"
            );
            return Ok(());
        }

        self.transport.remote_beschreibung_setzen(beschreibung).await?;
        self.remote_beschreibung_gesetzt = true;
        self.zustand = NegotiationState::Stable;

        tracing::info!(remote = %self.remote, "Verhandlung abgeschlossen");
        self.staging.leeren(&*self.transport).await;
        Ok(())
    }

    /// Verarbeitet einen Kandidaten der Gegenseite
    ///
    /// Vor der Remote-Beschreibung wird gepuffert, danach direkt
    /// angewendet. In geschlossenen Sitzungen wird verworfen.
    pub async fn kandidat_empfangen(
        &mut self,
        kandidat: CandidateDescriptor,
    ) -> SessionResult<()> {
        if self.zustand == NegotiationState::Closed {
            tracing::debug!(remote = %self.remote, "Kandidat fuer geschlossene Sitzung verworfen");
            return Ok(());
        }

        if self.remote_beschreibung_gesetzt {
            self.transport.kandidat_anwenden(kandidat).await?;
        } else {
            self.staging.aufnehmen(kandidat);
            tracing::debug!(
                remote = %self.remote,
                wartend = self.staging.anzahl(),
                "Kandidat gepuffert"
            );
        }
        Ok(())
    }

    /// Schliesst die Sitzung und den Transport
    pub async fn schliessen(&mut self) {
        if self.zustand == NegotiationState::Closed {
            return;
        }
        self.zustand = NegotiationState::Closed;
        self.transport.schliessen().await;
        tracing::debug!(remote = %self.remote, "Sitzung geschlossen");
    }

    /// Gibt die Sitzung bei Glare auf
    ///
    /// Schliesst den Transport und gibt die Kandidaten-Warteschlange an
    /// die Ersatz-Sitzung weiter.
    pub async fn aufgeben(mut self) -> CandidateStaging {
        self.transport.schliessen().await;
        self.zustand = NegotiationState::Closed;
        std::mem::take(&mut self.staging)
    }

    /// Entscheidet, ob die lokale Seite bei Glare nachgibt
    ///
    /// Deterministisch: die lexikografisch kleinere PeerId gibt nach.
    pub fn gibt_nach_bei_glare(lokal: PeerId, remote: PeerId) -> bool {
        lokal < remote
    }

    async fn senden(&self, signal: ClientSignal) -> SessionResult<()> {
        self.ausgang
            .send(signal)
            .await
            .map_err(|_| SessionError::SendFehler)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
