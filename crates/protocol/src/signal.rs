//! Signaling-Nachrichten zwischen Client und Relay
//!
//! ## Design
//! - Tagged Enums fuer typsichere Nachrichtentypen, JSON via serde
//! - Kein Request/Response-Muster: Signaling ist in beide Richtungen
//!   fire-and-forget, der Sender bekommt keine Bestaetigung
//! - Beschreibungen und Kandidaten sind opake Payloads: das Relay leitet
//!   sie woertlich weiter und interpretiert ihren Inhalt nie

use kamerad_core::types::{Participant, PeerId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Opake Verhandlungs-Payloads
// ---------------------------------------------------------------------------

/// Sitzungsbeschreibung (historisch "SDP")
///
/// Wird vom externen Echtzeit-Transport erzeugt und verstanden.
/// Kamerad behandelt sie als opakes JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionDescription(pub serde_json::Value);

impl SessionDescription {
    /// Erstellt eine Beschreibung aus einem beliebigen JSON-Wert
    pub fn neu(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Netzwerkpfad-Kandidat (historisch "ICE-Kandidat")
///
/// Wie die Sitzungsbeschreibung ein opakes JSON des Transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateDescriptor(pub serde_json::Value);

impl CandidateDescriptor {
    /// Erstellt einen Kandidaten aus einem beliebigen JSON-Wert
    pub fn neu(value: serde_json::Value) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Client -> Relay
// ---------------------------------------------------------------------------

/// Nachrichten vom Client an das Relay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum ClientSignal {
    /// Lokale Medien sind bereit – Teilnehmer wird fuer andere sichtbar
    OpenCamera,
    /// Angebot an einen bestimmten Teilnehmer
    Offer {
        target: PeerId,
        description: SessionDescription,
    },
    /// Antwort an einen bestimmten Teilnehmer
    Answer {
        target: PeerId,
        description: SessionDescription,
    },
    /// Kandidat an einen bestimmten Teilnehmer
    Candidate {
        target: PeerId,
        candidate: CandidateDescriptor,
    },
}

// ---------------------------------------------------------------------------
// Relay -> Client
// ---------------------------------------------------------------------------

/// Nachrichten vom Relay an den Client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum ServerSignal {
    /// Begruessung direkt nach dem Verbinden – nur an den Neuankoemmling
    ///
    /// `participants` enthaelt alle bereits registrierten Teilnehmer,
    /// den Neuankoemmling selbst ausgenommen.
    Welcome {
        you: Participant,
        participants: Vec<Participant>,
    },
    /// Ein Teilnehmer hat sich angekuendigt (an alle anderen)
    Joined(Participant),
    /// Ein Teilnehmer hat die Verbindung getrennt (an alle anderen)
    Left { id: PeerId },
    /// Weitergeleitetes Angebot
    Offer {
        from: Participant,
        description: SessionDescription,
    },
    /// Weitergeleitete Antwort
    Answer {
        from: Participant,
        description: SessionDescription,
    },
    /// Weitergeleiteter Kandidat
    Candidate {
        from: Participant,
        candidate: CandidateDescriptor,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
