//! Identitaets- und Teilnehmer-Typen fuer Kamerad
//!
//! Die PeerId verwendet das Newtype-Pattern um Verwechslungen mit anderen
//! UUIDs zur Compilezeit auszuschliessen. Sie ist gleichzeitig die
//! Verbindungs-Identitaet: ein Teilnehmer existiert genau solange wie
//! seine Verbindung zum Relay.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Teilnehmer-ID (identisch mit der Verbindungs-Identitaet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(pub Uuid);

impl PeerId {
    /// Erstellt eine neue zufaellige PeerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "peer:{}", self.0)
    }
}

/// Ein verbundener Teilnehmer
///
/// Der Anzeigename wird beim Verbindungsaufbau vom Relay vergeben und
/// bleibt fuer die Lebensdauer der Verbindung unveraenderlich.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Teilnehmer-ID (= Verbindungs-Identitaet)
    pub id: PeerId,
    /// Anzeigename, beim Verbinden vergeben
    pub name: String,
}

impl Participant {
    /// Erstellt einen neuen Teilnehmer
    pub fn neu(id: PeerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_id_ist_eindeutig() {
        let a = PeerId::new();
        let b = PeerId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn peer_id_serde_round_trip() {
        let id = PeerId::new();
        let json = serde_json::to_string(&id).unwrap();
        let decoded: PeerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, decoded);
    }

    #[test]
    fn peer_id_ordnung_ist_total() {
        // Die Glare-Aufloesung verlaesst sich auf eine deterministische
        // Ordnung zwischen zwei beliebigen IDs.
        let a = PeerId::new();
        let b = PeerId::new();
        assert_ne!(a.cmp(&b), std::cmp::Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn participant_anzeige() {
        let p = Participant::neu(PeerId::new(), "Mutiger Dachs");
        assert!(p.to_string().starts_with("Mutiger Dachs (peer:"));
    }
}
