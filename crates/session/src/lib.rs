//! kamerad-session – Clientseitige Verhandlungslogik
//!
//! Dieser Crate implementiert die Teilnehmerseite von Kamerad: pro
//! entferntem Teilnehmer eine Verhandlungs-Sitzung, die Offer, Answer
//! und Kandidaten mit der Gegenseite austauscht bis der externe
//! Echtzeit-Transport verbunden ist. Der Transport selbst (Medien,
//! Verschluesselung, Congestion Control) liegt hinter dem
//! `PeerTransport`-Trait und ist nicht Teil dieses Crates.
//!
//! ## Architektur
//!
//! ```text
//! RelayVerbindung (TCP zum Relay)
//!     |  ServerSignal
//!     v
//! MeshContext (ein Task, verarbeitet Signale sequenziell)
//!     +-- PresenceAnnouncer   (OpenCamera genau einmal)
//!     +-- NegotiationSession  (pro Remote: Zustandsautomat)
//!     |       +-- CandidateStaging (Kandidaten vor der Remote-Beschreibung)
//!     +-- TransportFactory    (externer Echtzeit-Transport)
//! ```

pub mod announcer;
pub mod client;
pub mod error;
pub mod mesh;
pub mod negotiation;
pub mod staging;
pub mod transport;

// Bequeme Re-Exporte
pub use announcer::PresenceAnnouncer;
pub use client::RelayVerbindung;
pub use error::{SessionError, SessionResult};
pub use mesh::MeshContext;
pub use negotiation::{NegotiationSession, NegotiationState};
pub use staging::CandidateStaging;
pub use transport::{NeuerTransport, PeerTransport, TransportError, TransportFactory, TransportResult};
