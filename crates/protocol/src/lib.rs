//! kamerad-protocol – Signaling-Protokoll und Wire-Format
//!
//! Definiert die Nachrichten zwischen Client und Relay sowie den
//! Frame-Codec (u32 BE Laenge + JSON-Payload) fuer die TCP-Verbindung.

pub mod signal;
pub mod wire;

pub use signal::{
    CandidateDescriptor, ClientSignal, ServerSignal, SessionDescription,
};
pub use wire::{ClientCodec, ServerCodec, SignalCodec};
