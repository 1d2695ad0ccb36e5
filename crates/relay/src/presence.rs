//! Praesenz-Registry – Wer ist mit dem Relay verbunden?
//!
//! Quelle der Wahrheit fuer "wer ist da": genau ein Eintrag pro offener
//! Verbindung, angelegt beim Verbinden, geloescht beim Trennen. Zusaetzlich
//! haelt die Registry pro Teilnehmer das Angekuendigt-Flag: erst nach der
//! Ankuendigung (OpenCamera) wird ein Teilnehmer fuer die anderen sichtbar.

use dashmap::DashMap;
use kamerad_core::types::{Participant, PeerId};
use std::sync::Arc;

use crate::error::{RelayError, RelayResult};
use crate::namen;

// ---------------------------------------------------------------------------
// PresenceRegistry
// ---------------------------------------------------------------------------

/// Eintrag eines verbundenen Teilnehmers
#[derive(Debug, Clone)]
struct Eintrag {
    teilnehmer: Participant,
    /// true sobald der Teilnehmer OpenCamera gesendet hat
    angekuendigt: bool,
}

/// Registry aller verbundenen Teilnehmer
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct PresenceRegistry {
    inner: Arc<PresenceRegistryInner>,
}

struct PresenceRegistryInner {
    /// Alle verbundenen Teilnehmer, indiziert nach PeerId
    teilnehmer: DashMap<PeerId, Eintrag>,
}

impl PresenceRegistry {
    /// Erstellt eine neue, leere Registry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(PresenceRegistryInner {
                teilnehmer: DashMap::new(),
            }),
        }
    }

    /// Registriert eine neue Verbindung und vergibt einen Anzeigenamen
    ///
    /// Schlaegt nur fehl wenn die PeerId bereits registriert ist – das ist
    /// eine Invarianten-Verletzung, kein Benutzerfehler.
    pub fn registrieren(&self, peer_id: PeerId) -> RelayResult<Participant> {
        let teilnehmer = Participant::neu(peer_id, namen::zufaelliger_name());

        let eintrag = Eintrag {
            teilnehmer: teilnehmer.clone(),
            angekuendigt: false,
        };

        match self.inner.teilnehmer.entry(peer_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                tracing::error!(peer_id = %peer_id, "PeerId doppelt registriert");
                Err(RelayError::DoppelteVerbindung(peer_id))
            }
            dashmap::mapref::entry::Entry::Vacant(platz) => {
                platz.insert(eintrag);
                tracing::info!(peer_id = %peer_id, name = %teilnehmer.name, "Teilnehmer verbunden");
                Ok(teilnehmer)
            }
        }
    }

    /// Entfernt einen Teilnehmer (Verbindung getrennt)
    ///
    /// Idempotent: doppelte Trenn-Signale sind kein Fehler. Gibt `true`
    /// zurueck wenn ein Eintrag entfernt wurde.
    pub fn entfernen(&self, peer_id: &PeerId) -> bool {
        match self.inner.teilnehmer.remove(peer_id) {
            Some((_, eintrag)) => {
                tracing::info!(
                    peer_id = %peer_id,
                    name = %eintrag.teilnehmer.name,
                    "Teilnehmer getrennt"
                );
                true
            }
            None => false,
        }
    }

    /// Markiert einen Teilnehmer als angekuendigt
    ///
    /// Gibt `true` nur beim ersten Mal zurueck; wiederholte Ankuendigungen
    /// und unbekannte PeerIds liefern `false`.
    pub fn ankuendigen(&self, peer_id: &PeerId) -> bool {
        match self.inner.teilnehmer.get_mut(peer_id) {
            Some(mut eintrag) => {
                if eintrag.angekuendigt {
                    tracing::debug!(peer_id = %peer_id, "Wiederholte Ankuendigung ignoriert");
                    false
                } else {
                    eintrag.angekuendigt = true;
                    true
                }
            }
            None => {
                tracing::warn!(peer_id = %peer_id, "Ankuendigung fuer unbekannten Teilnehmer");
                false
            }
        }
    }

    /// Gibt den Teilnehmer-Datensatz zurueck
    pub fn holen(&self, peer_id: &PeerId) -> Option<Participant> {
        self.inner
            .teilnehmer
            .get(peer_id)
            .map(|e| e.teilnehmer.clone())
    }

    /// Momentaufnahme aller registrierten Teilnehmer
    pub fn alle(&self) -> Vec<Participant> {
        self.inner
            .teilnehmer
            .iter()
            .map(|e| e.value().teilnehmer.clone())
            .collect()
    }

    /// Momentaufnahme aller Teilnehmer ausser einem (fuer Welcome)
    pub fn alle_ausser(&self, ausgeschlossen: &PeerId) -> Vec<Participant> {
        self.inner
            .teilnehmer
            .iter()
            .filter(|e| e.key() != ausgeschlossen)
            .map(|e| e.value().teilnehmer.clone())
            .collect()
    }

    /// Prueft ob ein Teilnehmer registriert ist
    pub fn ist_registriert(&self, peer_id: &PeerId) -> bool {
        self.inner.teilnehmer.contains_key(peer_id)
    }

    /// Gibt die Anzahl der registrierten Teilnehmer zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.teilnehmer.len()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
