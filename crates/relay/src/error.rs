//! Fehlertypen fuer das Signaling-Relay

use kamerad_core::types::PeerId;
use thiserror::Error;

/// Fehlertyp fuer das Signaling-Relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Eine Verbindungs-Identitaet wurde doppelt registriert.
    /// Verletzt die Invariante "ein Eintrag pro offener Verbindung" und
    /// deutet auf einen Logikfehler hin, nie auf Benutzereingaben.
    #[error("Verbindungs-Identitaet doppelt registriert: {0}")]
    DoppelteVerbindung(PeerId),

    /// Senden an Client fehlgeschlagen (Queue geschlossen)
    #[error("Senden fehlgeschlagen")]
    SendFehler,

    /// Interner Fehler
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

/// Result-Typ fuer das Signaling-Relay
pub type RelayResult<T> = Result<T, RelayError>;
