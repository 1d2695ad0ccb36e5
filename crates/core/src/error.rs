//! Fehlertypen fuer Kamerad
//!
//! Zentraler Fehler-Enum fuer crate-uebergreifende Fehlerzustaende.
//! Relay und Session definieren eigene Fehler und konvertieren via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer Kamerad
pub type Result<T> = std::result::Result<T, KameradError>;

/// Alle moeglichen Fehler im Kamerad-System
#[derive(Debug, Error)]
pub enum KameradError {
    // --- Verbindung & Netzwerk ---
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Verbindung getrennt: {0}")]
    Getrennt(String),

    // --- Protokoll ---
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    // --- Teilnehmer ---
    #[error("Teilnehmer nicht gefunden: {0}")]
    TeilnehmerNichtGefunden(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl KameradError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = KameradError::Verbindung("Zieladresse unerreichbar".into());
        assert_eq!(
            e.to_string(),
            "Verbindung fehlgeschlagen: Zieladresse unerreichbar"
        );
    }

    #[test]
    fn intern_konstruktor() {
        let e = KameradError::intern("kaputt");
        assert!(matches!(e, KameradError::Intern(_)));
    }
}
