//! Kandidaten-Staging – Puffert Kandidaten vor der Remote-Beschreibung
//!
//! Verbindungskandidaten der Gegenseite koennen vor deren Offer/Answer
//! eintreffen (das Relay ordnet nur pro Verbindung, nicht ueber
//! Teilnehmer hinweg). Die Engine akzeptiert Kandidaten aber erst nach
//! gesetzter Remote-Beschreibung. Dieses Modul puffert sie bis dahin
//! und wendet sie dann in Ankunftsreihenfolge genau einmal an.

use kamerad_protocol::signal::CandidateDescriptor;

use crate::transport::PeerTransport;

/// Warteschlange fuer verfruehte Verbindungskandidaten
#[derive(Debug, Default)]
pub struct CandidateStaging {
    warteschlange: Vec<CandidateDescriptor>,
}

impl CandidateStaging {
    /// Erstellt eine leere Warteschlange
    pub fn neu() -> Self {
        Self::default()
    }

    /// Reiht einen Kandidaten ein
    pub fn aufnehmen(&mut self, kandidat: CandidateDescriptor) {
        self.warteschlange.push(kandidat);
    }

    /// Anzahl der wartenden Kandidaten
    pub fn anzahl(&self) -> usize {
        self.warteschlange.len()
    }

    /// true wenn keine Kandidaten warten
    pub fn ist_leer(&self) -> bool {
        self.warteschlange.is_empty()
    }

    /// Wendet alle wartenden Kandidaten in Ankunftsreihenfolge an
    ///
    /// Die Warteschlange ist danach leer – auch wenn einzelne Kandidaten
    /// fehlschlagen. Ein fehlgeschlagener Kandidat wird geloggt und
    /// uebersprungen; die Engine kommt typischerweise auch mit einer
    /// Teilmenge der Kandidaten zu einer Verbindung.
    pub async fn leeren(&mut self, transport: &dyn PeerTransport) -> usize {
        let wartend = std::mem::take(&mut self.warteschlange);
        let gesamt = wartend.len();
        let mut angewendet = 0;

        for kandidat in wartend {
            match transport.kandidat_anwenden(kandidat).await {
                Ok(()) => angewendet += 1,
                Err(e) => {
                    tracing::warn!(fehler = %e, "Gepufferter Kandidat abgelehnt");
                }
            }
        }

        if gesamt > 0 {
            tracing::debug!(angewendet, gesamt, "Kandidaten-Puffer geleert");
        }

        angewendet
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
