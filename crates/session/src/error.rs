//! Fehlertypen fuer die clientseitige Verhandlungslogik

use thiserror::Error;

use crate::transport::TransportError;

/// Fehlertyp fuer die Sitzungsverwaltung
#[derive(Debug, Error)]
pub enum SessionError {
    /// IO-Fehler (TCP-Verbindung zum Relay)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Der externe Echtzeit-Transport hat einen Fehler gemeldet
    #[error("Transportfehler: {0}")]
    Transport(#[from] TransportError),

    /// Senden an das Relay fehlgeschlagen (Verbindung geschlossen)
    #[error("Senden an das Relay fehlgeschlagen")]
    SendFehler,
}

/// Result-Typ fuer die Sitzungsverwaltung
pub type SessionResult<T> = Result<T, SessionError>;
