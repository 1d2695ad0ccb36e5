//! Mesh-Kontext – Orchestriert alle Verhandlungs-Sitzungen eines Clients
//!
//! Der `MeshContext` ist der eine Ort, an dem Server-Signale auf
//! Sitzungen treffen. Er laeuft in genau einem Task und verarbeitet
//! Signale sequenziell – dadurch braucht keine Sitzung eigene Locks.
//!
//! ## Verantwortlichkeiten
//! - Teilnehmerliste aus Welcome/Joined/Left pflegen
//! - Pro Remote eine `NegotiationSession` anlegen und fuettern
//! - Glare aufloesen (kleinere PeerId gibt nach)
//! - Lokale Kandidaten der Transporte ans Relay weiterleiten
//!
//! Transportfehler schliessen die betroffene Sitzung, nie das Mesh;
//! nur eine tote Relay-Verbindung beendet die Verarbeitung.

use kamerad_core::types::{Participant, PeerId};
use kamerad_protocol::signal::{CandidateDescriptor, ClientSignal, ServerSignal, SessionDescription};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::announcer::PresenceAnnouncer;
use crate::error::{SessionError, SessionResult};
use crate::negotiation::{NegotiationSession, NegotiationState};
use crate::staging::CandidateStaging;
use crate::transport::{NeuerTransport, TransportFactory};

/// Clientseitiger Mesh-Zustand
///
/// Besitzt Teilnehmerliste, Sitzungen und den Ausgangs-Kanal zum Relay.
pub struct MeshContext {
    lokal: Option<Participant>,
    teilnehmer: HashMap<PeerId, Participant>,
    sitzungen: HashMap<PeerId, NegotiationSession>,
    announcer: PresenceAnnouncer,
    factory: Arc<dyn TransportFactory>,
    ausgang: mpsc::Sender<ClientSignal>,
    medien_bereit: bool,
}

impl MeshContext {
    /// Erstellt einen neuen Mesh-Kontext
    pub fn neu(factory: Arc<dyn TransportFactory>, ausgang: mpsc::Sender<ClientSignal>) -> Self {
        Self {
            lokal: None,
            teilnehmer: HashMap::new(),
            sitzungen: HashMap::new(),
            announcer: PresenceAnnouncer::neu(),
            factory,
            ausgang,
            medien_bereit: false,
        }
    }

    /// Die eigene Identitaet, sobald das Welcome eingetroffen ist
    pub fn lokaler_teilnehmer(&self) -> Option<&Participant> {
        self.lokal.as_ref()
    }

    /// Alle aktuell bekannten entfernten Teilnehmer
    pub fn bekannte_teilnehmer(&self) -> Vec<Participant> {
        self.teilnehmer.values().cloned().collect()
    }

    /// Zustand der Sitzung zu einem Teilnehmer, falls vorhanden
    pub fn sitzungs_zustand(&self, id: &PeerId) -> Option<NegotiationState> {
        self.sitzungen.get(id).map(|s| s.zustand())
    }

    /// Verarbeitet Server-Signale, bis der Eingangs-Kanal endet
    pub async fn ausfuehren(
        &mut self,
        mut eingang: mpsc::Receiver<ServerSignal>,
    ) -> SessionResult<()> {
        while let Some(signal) = eingang.recv().await {
            self.signal_verarbeiten(signal).await?;
        }
        tracing::info!("Signal-Strom vom Relay beendet");
        Ok(())
    }

    /// Macht die Kamera fuer das Mesh verfuegbar
    ///
    /// Kuendigt die Praesenz beim Relay an (genau einmal) und startet
    /// Verhandlungen mit allen bekannten Teilnehmern ohne Sitzung.
    pub async fn kamera_oeffnen(&mut self) -> SessionResult<()> {
        self.medien_bereit = true;
        self.announcer.ankuendigen(&self.ausgang).await?;

        let ziele: Vec<Participant> = self
            .teilnehmer
            .values()
            .filter(|t| !self.sitzungen.contains_key(&t.id))
            .cloned()
            .collect();
        for ziel in ziele {
            self.verhandlung_starten(ziel).await?;
        }
        Ok(())
    }

    /// Verarbeitet ein einzelnes Signal vom Relay
    pub async fn signal_verarbeiten(&mut self, signal: ServerSignal) -> SessionResult<()> {
        match signal {
            ServerSignal::Welcome { you, participants } => {
                tracing::info!(
                    ich = %you,
                    anwesend = participants.len(),
                    "Im Mesh angekommen"
                );
                self.lokal = Some(you);
                for teilnehmer in participants {
                    self.teilnehmer.insert(teilnehmer.id, teilnehmer);
                }
                Ok(())
            }

            ServerSignal::Joined(teilnehmer) => {
                tracing::info!(teilnehmer = %teilnehmer, "Teilnehmer beigetreten");
                self.teilnehmer.insert(teilnehmer.id, teilnehmer.clone());
                // Der Neue hat seine Kamera bereits angekuendigt – wir
                // bieten an, sobald auch wir Medien haben
                self.verhandlung_starten(teilnehmer).await
            }

            ServerSignal::Left { id } => {
                self.teilnehmer.remove(&id);
                if let Some(mut sitzung) = self.sitzungen.remove(&id) {
                    tracing::info!(remote = %sitzung.remote(), "Teilnehmer gegangen – Sitzung wird geschlossen");
                    sitzung.schliessen().await;
                } else {
                    tracing::debug!(peer_id = %id, "Teilnehmer ohne Sitzung gegangen");
                }
                Ok(())
            }

            ServerSignal::Offer { from, description } => {
                self.angebot_verarbeiten(from, description).await
            }

            ServerSignal::Answer { from, description } => {
                let ergebnis = match self.sitzungen.get_mut(&from.id) {
                    Some(sitzung) => sitzung.antwort_empfangen(description).await,
                    None => {
                        tracing::warn!(von = %from, "Answer ohne Sitzung – verworfen");
                        Ok(())
                    }
                };
                self.sitzungsfehler_abfangen(from.id, ergebnis).await
            }

            ServerSignal::Candidate { from, candidate } => {
                let ergebnis = match self.sitzungen.get_mut(&from.id) {
                    Some(sitzung) => sitzung.kandidat_empfangen(candidate).await,
                    None => {
                        tracing::warn!(von = %from, "Kandidat ohne Sitzung – verworfen");
                        Ok(())
                    }
                };
                self.sitzungsfehler_abfangen(from.id, ergebnis).await
            }
        }
    }

    /// Startet eine Verhandlung als Anbieter
    ///
    /// No-Op ohne lokale Medien oder bei bestehender Sitzung.
    pub async fn verhandlung_starten(&mut self, remote: Participant) -> SessionResult<()> {
        if !self.medien_bereit {
            tracing::debug!(remote = %remote, "Keine lokalen Medien – kein Offer");
            return Ok(());
        }
        if self.sitzungen.contains_key(&remote.id) {
            tracing::debug!(remote = %remote, "Sitzung existiert bereits");
            return Ok(());
        }

        let id = remote.id;
        let mut sitzung = match self.sitzung_erstellen(remote, CandidateStaging::neu()).await {
            Ok(sitzung) => sitzung,
            Err(SessionError::Transport(e)) => {
                tracing::warn!(peer_id = %id, fehler = %e, "Transport-Erzeugung fehlgeschlagen");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let ergebnis = sitzung.anbieten().await;
        self.sitzungen.insert(id, sitzung);
        self.sitzungsfehler_abfangen(id, ergebnis).await
    }

    /// Verarbeitet ein eingehendes Offer, inklusive Glare-Aufloesung
    async fn angebot_verarbeiten(
        &mut self,
        from: Participant,
        beschreibung: SessionDescription,
    ) -> SessionResult<()> {
        self.teilnehmer.entry(from.id).or_insert_with(|| from.clone());
        let id = from.id;

        let ergebnis = match self.sitzungen.remove(&id) {
            // Keine Sitzung: als Antworter annehmen
            None => {
                let mut sitzung = match self
                    .sitzung_erstellen(from.clone(), CandidateStaging::neu())
                    .await
                {
                    Ok(sitzung) => sitzung,
                    Err(SessionError::Transport(e)) => {
                        tracing::warn!(von = %from, fehler = %e, "Transport-Erzeugung fehlgeschlagen");
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                };
                let ergebnis = sitzung.angebot_empfangen(beschreibung).await;
                self.sitzungen.insert(id, sitzung);
                ergebnis
            }

            Some(mut sitzung) => match sitzung.zustand() {
                NegotiationState::Idle => {
                    let ergebnis = sitzung.angebot_empfangen(beschreibung).await;
                    self.sitzungen.insert(id, sitzung);
                    ergebnis
                }

                // Glare: beide Seiten haben gleichzeitig angeboten
                NegotiationState::LocalOfferPending => {
                    let lokal_id = match &self.lokal {
                        Some(lokal) => lokal.id,
                        None => {
                            tracing::warn!(von = %from, "Offer vor dem Welcome – verworfen");
                            self.sitzungen.insert(id, sitzung);
                            return Ok(());
                        }
                    };

                    if NegotiationSession::gibt_nach_bei_glare(lokal_id, id) {
                        tracing::info!(
                            remote = %from,
                            "Glare: lokale Seite gibt nach und antwortet neu"
                        );
                        let staging = sitzung.aufgeben().await;
                        let mut ersatz =
                            match self.sitzung_erstellen(from.clone(), staging).await {
                                Ok(sitzung) => sitzung,
                                Err(SessionError::Transport(e)) => {
                                    tracing::warn!(von = %from, fehler = %e, "Ersatz-Transport fehlgeschlagen");
                                    return Ok(());
                                }
                                Err(e) => return Err(e),
                            };
                        let ergebnis = ersatz.angebot_empfangen(beschreibung).await;
                        self.sitzungen.insert(id, ersatz);
                        ergebnis
                    } else {
                        tracing::info!(
                            remote = %from,
                            "Glare: Gegenseite gibt nach – eingehendes Offer ignoriert"
                        );
                        self.sitzungen.insert(id, sitzung);
                        Ok(())
                    }
                }

                zustand => {
                    tracing::warn!(
                        von = %from,
                        zustand = ?zustand,
                        "Offer in ungueltigem Zustand – ignoriert"
                    );
                    self.sitzungen.insert(id, sitzung);
                    Ok(())
                }
            },
        };

        self.sitzungsfehler_abfangen(id, ergebnis).await
    }

    /// Erzeugt Transport, Kandidaten-Weiterleitung und Sitzung
    async fn sitzung_erstellen(
        &self,
        remote: Participant,
        staging: CandidateStaging,
    ) -> SessionResult<NegotiationSession> {
        let NeuerTransport {
            transport,
            lokale_kandidaten,
        } = self.factory.erstellen(remote.id).await?;

        self.kandidaten_weiterleiten(remote.id, lokale_kandidaten);

        Ok(NegotiationSession::mit_staging(
            remote,
            transport,
            self.ausgang.clone(),
            staging,
        ))
    }

    /// Leitet lokal entdeckte Kandidaten des Transports ans Relay weiter
    ///
    /// Der Task endet, wenn der Transport schliesst und den Sender des
    /// Kandidaten-Stroms fallen laesst – eine abgeloeste Sitzung kann
    /// so keine Kandidaten mehr ins Mesh schreiben.
    fn kandidaten_weiterleiten(
        &self,
        ziel: PeerId,
        mut lokale_kandidaten: mpsc::Receiver<CandidateDescriptor>,
    ) {
        let ausgang = self.ausgang.clone();
        tokio::spawn(async move {
            while let Some(kandidat) = lokale_kandidaten.recv().await {
                let signal = ClientSignal::Candidate {
                    target: ziel,
                    candidate: kandidat,
                };
                if ausgang.send(signal).await.is_err() {
                    break;
                }
            }
            tracing::debug!(peer_id = %ziel, "Kandidaten-Weiterleitung beendet");
        });
    }

    /// Behandelt das Ergebnis einer Sitzungs-Operation
    ///
    /// Transportfehler schliessen die betroffene Sitzung und sind fuer
    /// das Mesh nicht fatal; alles andere wird durchgereicht.
    async fn sitzungsfehler_abfangen(
        &mut self,
        id: PeerId,
        ergebnis: SessionResult<()>,
    ) -> SessionResult<()> {
        match ergebnis {
            Err(SessionError::Transport(e)) => {
                tracing::warn!(
                    peer_id = %id,
                    fehler = %e,
                    "Verhandlung fehlgeschlagen – Sitzung wird geschlossen"
                );
                if let Some(sitzung) = self.sitzungen.get_mut(&id) {
                    sitzung.schliessen().await;
                }
                Ok(())
            }
            andere => andere,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests_mock::{MockFactory, MockTransport};

    struct TestMesh {
        mesh: MeshContext,
        factory: Arc<MockFactory>,
        ausgang_rx: mpsc::Receiver<ClientSignal>,
        ich: Participant,
    }

    fn test_mesh(name: &str) -> TestMesh {
        let factory = Arc::new(MockFactory::default());
        let (tx, rx) = mpsc::channel(64);
        TestMesh {
            mesh: MeshContext::neu(Arc::clone(&factory) as Arc<dyn TransportFactory>, tx),
            factory,
            ausgang_rx: rx,
            ich: Participant::neu(PeerId::new(), name.to_string()),
        }
    }

    impl TestMesh {
        async fn willkommen_mit(&mut self, anwesend: Vec<Participant>) {
            self.mesh
                .signal_verarbeiten(ServerSignal::Welcome {
                    you: self.ich.clone(),
                    participants: anwesend,
                })
                .await
                .unwrap();
        }

        fn transport_fuer(&self, remote: &Participant) -> Arc<MockTransport> {
            let transporte = self.factory.transporte_fuer(&remote.id);
            transporte.last().cloned().expect("kein Transport erzeugt")
        }
    }

    /// Formt ein abgefangenes Client-Signal in das Server-Signal um, das
    /// die Gegenseite vom Relay saehe
    fn als_server_signal(von: &Participant, signal: ClientSignal) -> ServerSignal {
        match signal {
            ClientSignal::Offer { description, .. } => ServerSignal::Offer {
                from: von.clone(),
                description,
            },
            ClientSignal::Answer { description, .. } => ServerSignal::Answer {
                from: von.clone(),
                description,
            },
            ClientSignal::Candidate { candidate, .. } => ServerSignal::Candidate {
                from: von.clone(),
                candidate,
            },
            ClientSignal::OpenCamera => panic!("OpenCamera wird nicht weitergeleitet"),
        }
    }

    fn teilnehmer(name: &str) -> Participant {
        Participant::neu(PeerId::new(), name.to_string())
    }

    fn kandidat(n: u32) -> CandidateDescriptor {
        CandidateDescriptor::neu(serde_json::json!({"candidate": format!("kandidat-{n}")}))
    }

    #[tokio::test]
    async fn welcome_setzt_identitaet_und_teilnehmerliste() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![b.clone()]).await;

        assert_eq!(a.mesh.lokaler_teilnehmer(), Some(&a.ich));
        assert_eq!(a.mesh.bekannte_teilnehmer(), vec![b]);
    }

    #[tokio::test]
    async fn joined_ohne_kamera_erzeugt_keine_sitzung() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![]).await;
        a.mesh
            .signal_verarbeiten(ServerSignal::Joined(b.clone()))
            .await
            .unwrap();

        assert_eq!(a.factory.anzahl_erzeugt(), 0);
        assert!(a.mesh.sitzungs_zustand(&b.id).is_none());
        assert_eq!(a.mesh.bekannte_teilnehmer(), vec![b]);
    }

    #[tokio::test]
    async fn kamera_oeffnen_kuendigt_an_und_bietet_allen_bekannten_an() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");
        let c = teilnehmer("Flinker Igel");

        a.willkommen_mit(vec![b.clone(), c.clone()]).await;
        a.mesh.kamera_oeffnen().await.unwrap();

        assert!(matches!(
            a.ausgang_rx.recv().await,
            Some(ClientSignal::OpenCamera)
        ));

        let mut ziele = Vec::new();
        for _ in 0..2 {
            match a.ausgang_rx.recv().await.unwrap() {
                ClientSignal::Offer { target, .. } => ziele.push(target),
                andere => panic!("Offer erwartet, war {andere:?}"),
            }
        }
        ziele.sort();
        let mut erwartet = vec![b.id, c.id];
        erwartet.sort();
        assert_eq!(ziele, erwartet);

        assert_eq!(
            a.mesh.sitzungs_zustand(&b.id),
            Some(NegotiationState::LocalOfferPending)
        );
        assert_eq!(
            a.mesh.sitzungs_zustand(&c.id),
            Some(NegotiationState::LocalOfferPending)
        );
    }

    #[tokio::test]
    async fn joined_nach_kamera_oeffnen_bekommt_sofort_ein_offer() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![]).await;
        a.mesh.kamera_oeffnen().await.unwrap();
        assert!(matches!(
            a.ausgang_rx.recv().await,
            Some(ClientSignal::OpenCamera)
        ));

        a.mesh
            .signal_verarbeiten(ServerSignal::Joined(b.clone()))
            .await
            .unwrap();

        match a.ausgang_rx.recv().await.unwrap() {
            ClientSignal::Offer { target, .. } => assert_eq!(target, b.id),
            andere => panic!("Offer erwartet, war {andere:?}"),
        }
    }

    #[tokio::test]
    async fn eingehendes_offer_erzeugt_sitzung_und_answer() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![b.clone()]).await;
        a.mesh
            .signal_verarbeiten(ServerSignal::Offer {
                from: b.clone(),
                description: SessionDescription::neu(
                    serde_json::json!({"type": "offer", "sdp": "v=0"}),
                ),
            })
            .await
            .unwrap();

        assert_eq!(a.mesh.sitzungs_zustand(&b.id), Some(NegotiationState::Stable));
        match a.ausgang_rx.recv().await.unwrap() {
            ClientSignal::Answer { target, .. } => assert_eq!(target, b.id),
            andere => panic!("Answer erwartet, war {andere:?}"),
        }
    }

    #[tokio::test]
    async fn verhandlung_beider_seiten_wird_stabil() {
        let mut a = test_mesh("Mutiger Fuchs");
        let mut b = test_mesh("Stiller Dachs");

        a.willkommen_mit(vec![b.ich.clone()]).await;
        b.willkommen_mit(vec![a.ich.clone()]).await;

        // A oeffnet die Kamera und bietet B an
        a.mesh.kamera_oeffnen().await.unwrap();
        assert!(matches!(
            a.ausgang_rx.recv().await,
            Some(ClientSignal::OpenCamera)
        ));
        let offer = a.ausgang_rx.recv().await.unwrap();
        b.mesh
            .signal_verarbeiten(als_server_signal(&a.ich, offer))
            .await
            .unwrap();

        // B antwortet, A wird stabil
        let answer = b.ausgang_rx.recv().await.unwrap();
        a.mesh
            .signal_verarbeiten(als_server_signal(&b.ich, answer))
            .await
            .unwrap();

        assert_eq!(
            a.mesh.sitzungs_zustand(&b.ich.id),
            Some(NegotiationState::Stable)
        );
        assert_eq!(
            b.mesh.sitzungs_zustand(&a.ich.id),
            Some(NegotiationState::Stable)
        );
    }

    #[tokio::test]
    async fn glare_genau_eine_seite_gibt_nach() {
        let mut a = test_mesh("Mutiger Fuchs");
        let mut b = test_mesh("Stiller Dachs");

        a.willkommen_mit(vec![b.ich.clone()]).await;
        b.willkommen_mit(vec![a.ich.clone()]).await;

        // Beide oeffnen gleichzeitig die Kamera
        a.mesh.kamera_oeffnen().await.unwrap();
        b.mesh.kamera_oeffnen().await.unwrap();
        assert!(matches!(
            a.ausgang_rx.recv().await,
            Some(ClientSignal::OpenCamera)
        ));
        assert!(matches!(
            b.ausgang_rx.recv().await,
            Some(ClientSignal::OpenCamera)
        ));
        let offer_von_a = a.ausgang_rx.recv().await.unwrap();
        let offer_von_b = b.ausgang_rx.recv().await.unwrap();

        // Beide Offers kreuzen sich
        a.mesh
            .signal_verarbeiten(als_server_signal(&b.ich, offer_von_b))
            .await
            .unwrap();
        b.mesh
            .signal_verarbeiten(als_server_signal(&a.ich, offer_von_a))
            .await
            .unwrap();

        // Genau die Seite mit der kleineren PeerId hat nachgegeben
        let (nachgeber, gewinner) = if a.ich.id < b.ich.id {
            (&a, &b)
        } else {
            (&b, &a)
        };
        assert_eq!(nachgeber.factory.anzahl_erzeugt(), 2);
        assert_eq!(gewinner.factory.anzahl_erzeugt(), 1);

        // Der verworfene Transport des Nachgebers ist geschlossen
        let transporte = nachgeber.factory.transporte_fuer(&gewinner.ich.id);
        assert!(transporte[0].geschlossen());
        assert!(!transporte[1].geschlossen());

        assert_eq!(
            nachgeber.mesh.sitzungs_zustand(&gewinner.ich.id),
            Some(NegotiationState::Stable)
        );
        assert_eq!(
            gewinner.mesh.sitzungs_zustand(&nachgeber.ich.id),
            Some(NegotiationState::LocalOfferPending)
        );
    }

    #[tokio::test]
    async fn glare_aufloesung_endet_beidseitig_stabil() {
        let mut a = test_mesh("Mutiger Fuchs");
        let mut b = test_mesh("Stiller Dachs");

        a.willkommen_mit(vec![b.ich.clone()]).await;
        b.willkommen_mit(vec![a.ich.clone()]).await;

        a.mesh.kamera_oeffnen().await.unwrap();
        b.mesh.kamera_oeffnen().await.unwrap();
        let _ = a.ausgang_rx.recv().await; // OpenCamera
        let _ = b.ausgang_rx.recv().await;
        let offer_von_a = a.ausgang_rx.recv().await.unwrap();
        let offer_von_b = b.ausgang_rx.recv().await.unwrap();

        a.mesh
            .signal_verarbeiten(als_server_signal(&b.ich, offer_von_b))
            .await
            .unwrap();
        b.mesh
            .signal_verarbeiten(als_server_signal(&a.ich, offer_von_a))
            .await
            .unwrap();

        // Die Answer des Nachgebers zustellen
        let (nachgeber, gewinner) = if a.ich.id < b.ich.id {
            (&mut a, &mut b)
        } else {
            (&mut b, &mut a)
        };
        let answer = nachgeber.ausgang_rx.recv().await.unwrap();
        gewinner
            .mesh
            .signal_verarbeiten(als_server_signal(&nachgeber.ich, answer))
            .await
            .unwrap();

        assert_eq!(
            gewinner.mesh.sitzungs_zustand(&nachgeber.ich.id),
            Some(NegotiationState::Stable)
        );
        assert_eq!(
            nachgeber.mesh.sitzungs_zustand(&gewinner.ich.id),
            Some(NegotiationState::Stable)
        );
    }

    #[tokio::test]
    async fn lokale_kandidaten_gehen_ans_richtige_ziel() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![b.clone()]).await;
        a.mesh.kamera_oeffnen().await.unwrap();
        let _ = a.ausgang_rx.recv().await; // OpenCamera
        let _ = a.ausgang_rx.recv().await; // Offer

        let transport = a.transport_fuer(&b);
        transport.lokalen_kandidaten_melden(kandidat(7)).await;

        match a.ausgang_rx.recv().await.unwrap() {
            ClientSignal::Candidate { target, candidate } => {
                assert_eq!(target, b.id);
                assert_eq!(candidate, kandidat(7));
            }
            andere => panic!("Candidate erwartet, war {andere:?}"),
        }
    }

    #[tokio::test]
    async fn left_schliesst_sitzung_und_beendet_die_weiterleitung() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![b.clone()]).await;
        a.mesh.kamera_oeffnen().await.unwrap();
        let _ = a.ausgang_rx.recv().await; // OpenCamera
        let _ = a.ausgang_rx.recv().await; // Offer

        let transport = a.transport_fuer(&b);
        a.mesh
            .signal_verarbeiten(ServerSignal::Left { id: b.id })
            .await
            .unwrap();

        assert!(transport.geschlossen());
        assert!(a.mesh.sitzungs_zustand(&b.id).is_none());
        assert!(a.mesh.bekannte_teilnehmer().is_empty());

        // Der Kandidaten-Strom ist abgerissen – nichts erreicht das Relay
        transport.lokalen_kandidaten_melden(kandidat(9)).await;
        tokio::task::yield_now().await;
        assert!(a.ausgang_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn signale_ohne_sitzung_werden_verworfen() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![]).await;
        a.mesh
            .signal_verarbeiten(ServerSignal::Candidate {
                from: b.clone(),
                candidate: kandidat(1),
            })
            .await
            .unwrap();
        a.mesh
            .signal_verarbeiten(ServerSignal::Answer {
                from: b.clone(),
                description: SessionDescription::neu(serde_json::json!({"type": "answer"})),
            })
            .await
            .unwrap();

        assert_eq!(a.factory.anzahl_erzeugt(), 0);
        assert!(a.ausgang_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn verfruehte_kandidaten_landen_nach_der_answer_im_transport() {
        let mut a = test_mesh("Mutiger Fuchs");
        let b = teilnehmer("Stiller Dachs");

        a.willkommen_mit(vec![b.clone()]).await;
        a.mesh.kamera_oeffnen().await.unwrap();
        let _ = a.ausgang_rx.recv().await; // OpenCamera
        let _ = a.ausgang_rx.recv().await; // Offer

        // Kandidaten von B treffen vor der Answer ein
        for n in 1..=2 {
            a.mesh
                .signal_verarbeiten(ServerSignal::Candidate {
                    from: b.clone(),
                    candidate: kandidat(n),
                })
                .await
                .unwrap();
        }
        let transport = a.transport_fuer(&b);
        assert!(transport.kandidaten().is_empty());

        a.mesh
            .signal_verarbeiten(ServerSignal::Answer {
                from: b.clone(),
                description: SessionDescription::neu(serde_json::json!({"type": "answer"})),
            })
            .await
            .unwrap();

        assert_eq!(transport.kandidaten(), vec![kandidat(1), kandidat(2)]);
    }
}
