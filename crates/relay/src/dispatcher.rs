//! Signal-Dispatcher – Routet ClientSignale an ihr Ziel
//!
//! Der Dispatcher kennt die komplette Relay-Semantik:
//! - Verbinden: registrieren + Welcome nur an den Neuankoemmling
//! - OpenCamera: einmaliger Joined-Broadcast an alle anderen
//! - Offer/Answer/Candidate: gezielte Weiterleitung, nie Broadcast
//! - Trennen: entfernen + Left-Broadcast an alle anderen
//!
//! Weiterleitung an ein unbekanntes Ziel ist kein Fehler, sondern ein
//! Log-Eintrag plus verworfene Nachricht: das Ziel ist fast immer schon
//! gegangen, und der Absender hat ohnehin keinen Rueckkanal fuer eine
//! Bestaetigung. Verhandlungszustand haelt der Dispatcher keinen – er ist
//! ein reiner Router ueber Teilnehmer-Identitaeten.

use kamerad_core::types::{Participant, PeerId};
use kamerad_protocol::signal::{ClientSignal, ServerSignal};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::RelayResult;
use crate::state::RelayState;

/// Zentraler Signal-Dispatcher
pub struct SignalDispatcher {
    state: Arc<RelayState>,
}

impl SignalDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<RelayState>) -> Self {
        Self { state }
    }

    /// Registriert eine neue Verbindung und stellt das Welcome zu
    ///
    /// Das Welcome geht ausschliesslich an den Neuankoemmling – ein
    /// Broadcast an die anderen passiert erst bei dessen Ankuendigung.
    /// Die Teilnehmerliste ist eine Momentaufnahme ohne den Neuen selbst.
    pub fn verbinden(
        &self,
        peer_id: PeerId,
    ) -> RelayResult<(Participant, mpsc::Receiver<ServerSignal>)> {
        let teilnehmer = self.state.presence.registrieren(peer_id)?;
        let empfang = self.state.hub.registrieren(peer_id);

        let andere = self.state.presence.alle_ausser(&peer_id);
        self.state.hub.an_peer_senden(
            &peer_id,
            ServerSignal::Welcome {
                you: teilnehmer.clone(),
                participants: andere,
            },
        );

        Ok((teilnehmer, empfang))
    }

    /// Verarbeitet ein eingehendes ClientSignal
    pub fn dispatch(&self, absender: &PeerId, signal: ClientSignal) {
        match signal {
            ClientSignal::OpenCamera => self.ankuendigung_verarbeiten(absender),

            ClientSignal::Offer {
                target,
                description,
            } => self.weiterleiten(absender, &target, "Angebot", |from| ServerSignal::Offer {
                from,
                description,
            }),

            ClientSignal::Answer {
                target,
                description,
            } => self.weiterleiten(absender, &target, "Antwort", |from| ServerSignal::Answer {
                from,
                description,
            }),

            ClientSignal::Candidate { target, candidate } => {
                self.weiterleiten(absender, &target, "Kandidat", |from| {
                    ServerSignal::Candidate { from, candidate }
                })
            }
        }
    }

    /// Bereinigt alle Ressourcen eines Clients beim Trennen
    ///
    /// Der Left-Broadcast geht nur raus wenn der Teilnehmer tatsaechlich
    /// noch registriert war – doppelte Trenn-Signale bleiben stumm.
    pub fn verbindung_getrennt(&self, peer_id: &PeerId) {
        let war_registriert = self.state.presence.entfernen(peer_id);
        self.state.hub.entfernen(peer_id);

        if war_registriert {
            self.state
                .hub
                .an_alle_ausser_senden(peer_id, ServerSignal::Left { id: *peer_id });
        }
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsmethoden
    // -----------------------------------------------------------------------

    /// OpenCamera: beim ersten Mal Joined an alle anderen
    fn ankuendigung_verarbeiten(&self, absender: &PeerId) {
        if !self.state.presence.ankuendigen(absender) {
            return;
        }

        let teilnehmer = match self.state.presence.holen(absender) {
            Some(t) => t,
            // Zwischen ankuendigen und holen getrennt – nichts zu verteilen
            None => return,
        };

        let empfaenger = self
            .state
            .hub
            .an_alle_ausser_senden(absender, ServerSignal::Joined(teilnehmer.clone()));
        tracing::info!(
            teilnehmer = %teilnehmer,
            empfaenger = empfaenger,
            "Teilnehmer angekuendigt"
        );
    }

    /// Gezielte Weiterleitung eines Verhandlungssignals
    fn weiterleiten<F>(&self, absender: &PeerId, ziel: &PeerId, art: &str, signal: F)
    where
        F: FnOnce(Participant) -> ServerSignal,
    {
        let von = match self.state.presence.holen(absender) {
            Some(t) => t,
            None => {
                tracing::warn!(absender = %absender, art, "Signal von unbekanntem Absender verworfen");
                return;
            }
        };

        let an = match self.state.presence.holen(ziel) {
            Some(t) => t,
            None => {
                tracing::warn!(
                    absender = %von.name,
                    ziel = %ziel,
                    art,
                    "Ziel unbekannt – Signal verworfen"
                );
                return;
            }
        };

        tracing::info!(von = %von.name, an = %an.name, art, "Signal weitergeleitet");
        self.state.hub.an_peer_senden(ziel, signal(von));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
