//! kamerad-relay – Signaling-Relay (Serverseite)
//!
//! Dieser Crate implementiert das zentrale Relay fuer Kamerad. Es fuehrt
//! Buch darueber wer verbunden ist, leitet gezielte Verhandlungssignale
//! (Offer/Answer/Candidate) zwischen zwei Teilnehmern weiter und verteilt
//! Praesenz-Ereignisse (Joined/Left) an alle anderen. Den Inhalt der
//! Verhandlungs-Payloads interpretiert das Relay nie.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |
//!     v
//! SignalDispatcher
//!     +-- OpenCamera  -> Joined-Broadcast an alle anderen (einmalig)
//!     +-- Offer       -> gezielte Weiterleitung
//!     +-- Answer      -> gezielte Weiterleitung
//!     +-- Candidate   -> gezielte Weiterleitung
//!
//! PresenceRegistry – Wer ist verbunden, wer hat sich angekuendigt
//! SignalHub        – Send-Queues aller Clients, gezielt + an-alle-ausser
//! ```

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod namen;
pub mod presence;
pub mod state;
pub mod tcp;

// Bequeme Re-Exporte
pub use connection::ClientConnection;
pub use dispatcher::SignalDispatcher;
pub use error::{RelayError, RelayResult};
pub use hub::SignalHub;
pub use presence::PresenceRegistry;
pub use state::{RelayConfig, RelayState};
pub use tcp::SignalingServer;
