//! kamerad-core – Gemeinsame Grundtypen
//!
//! Enthaelt die Identitaets- und Teilnehmer-Typen sowie den zentralen
//! Fehler-Enum, die von allen anderen Kamerad-Crates verwendet werden.

pub mod error;
pub mod types;

pub use error::{KameradError, Result};
pub use types::{Participant, PeerId};
