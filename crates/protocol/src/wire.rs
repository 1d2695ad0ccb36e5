//! Wire-Format fuer die TCP-Verbindung zum Relay
//!
//! Frame-basiertes Protokoll: Laenge (u32 big-endian) + JSON-Payload.
//!
//! ```text
//! +--------+--------+--------+--------+----...----+
//! | Laenge (u32 BE) | 4 Bytes        | Payload    |
//! +--------+--------+--------+--------+----...----+
//! ```
//!
//! Der Codec ist generisch ueber Dekodier- und Kodier-Typ, damit Client
//! und Relay dasselbe Frame-Format mit vertauschten Richtungen nutzen:
//! das Relay dekodiert `ClientSignal` und kodiert `ServerSignal`, der
//! Client umgekehrt.

use bytes::{Buf, BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

use crate::signal::{ClientSignal, ServerSignal};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-maximale Frame-Groesse (256 KiB – Sitzungsbeschreibungen
/// bleiben weit darunter)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 256 * 1024;

/// Groesse des Laengen-Felds in Bytes
pub const LENGTH_FIELD_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// SignalCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer das Kamerad-Wire-Format
///
/// `In` ist der dekodierte (eingehende) Typ, `Out` der kodierte
/// (ausgehende). Siehe die Aliase [`ServerCodec`] und [`ClientCodec`].
#[derive(Debug)]
pub struct SignalCodec<In, Out> {
    /// Maximale erlaubte Frame-Groesse in Bytes
    max_frame_size: usize,
    _richtung: PhantomData<(In, Out)>,
}

/// Codec-Seite des Relays: liest ClientSignal, schreibt ServerSignal
pub type ServerCodec = SignalCodec<ClientSignal, ServerSignal>;

/// Codec-Seite des Clients: liest ServerSignal, schreibt ClientSignal
pub type ClientCodec = SignalCodec<ServerSignal, ClientSignal>;

impl<In, Out> SignalCodec<In, Out> {
    /// Erstellt einen neuen Codec mit Standard-Limits
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            _richtung: PhantomData,
        }
    }

    /// Erstellt einen Codec mit benutzerdefinierter maximaler Frame-Groesse
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            _richtung: PhantomData,
        }
    }

    /// Gibt die konfigurierte maximale Frame-Groesse zurueck
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl<In, Out> Default for SignalCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In, Out> Clone for SignalCodec<In, Out> {
    fn clone(&self) -> Self {
        Self {
            max_frame_size: self.max_frame_size,
            _richtung: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder-Implementierung
// ---------------------------------------------------------------------------

impl<In, Out> Decoder for SignalCodec<In, Out>
where
    In: DeserializeOwned,
{
    type Item = In;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Warte auf mindestens 4 Bytes fuer das Laengen-Feld
        if src.len() < LENGTH_FIELD_SIZE {
            return Ok(None);
        }

        // Laenge lesen (big-endian u32) ohne den Buffer zu veraendern
        let length = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

        // Maximale Frame-Groesse pruefen
        if length > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                    length, self.max_frame_size
                ),
            ));
        }

        // Pruefen ob der vollstaendige Frame bereits im Buffer ist
        let total_size = LENGTH_FIELD_SIZE + length;
        if src.len() < total_size {
            // Speicher vorbelegen um Reallocations zu vermeiden
            src.reserve(total_size - src.len());
            return Ok(None);
        }

        // Laengen-Feld verbrauchen
        src.advance(LENGTH_FIELD_SIZE);

        // Payload-Bytes extrahieren
        let payload = src.split_to(length);

        // JSON deserialisieren
        let signal: In = serde_json::from_slice(&payload).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON-Deserialisierung fehlgeschlagen: {}", e),
            )
        })?;

        Ok(Some(signal))
    }
}

// ---------------------------------------------------------------------------
// Encoder-Implementierung
// ---------------------------------------------------------------------------

impl<In, Out> Encoder<Out> for SignalCodec<In, Out>
where
    Out: Serialize,
{
    type Error = io::Error;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // JSON serialisieren
        let json = serde_json::to_vec(&item).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON-Serialisierung fehlgeschlagen: {}", e),
            )
        })?;

        // Groesse pruefen
        if json.len() > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Nachricht zu gross: {} Bytes (Maximum: {} Bytes)",
                    json.len(),
                    self.max_frame_size
                ),
            ));
        }

        // Laengen-Feld + Payload schreiben
        dst.reserve(LENGTH_FIELD_SIZE + json.len());
        dst.put_u32(json.len() as u32);
        dst.put_slice(&json);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ClientSignal, ServerSignal, SessionDescription};
    use kamerad_core::types::{Participant, PeerId};
    use serde_json::json;

    #[test]
    fn server_codec_encode_decode_gegenseiten() {
        // Relay kodiert ein ServerSignal, der Client dekodiert es
        let mut relay_seite = ServerCodec::new();
        let mut client_seite = ClientCodec::new();

        let original = ServerSignal::Joined(Participant::neu(PeerId::new(), "Dachs"));
        let mut buf = BytesMut::new();
        relay_seite.encode(original, &mut buf).unwrap();

        let decoded = client_seite
            .decode(&mut buf)
            .unwrap()
            .expect("Muss ein Signal enthalten");
        assert!(matches!(decoded, ServerSignal::Joined(p) if p.name == "Dachs"));
        assert!(buf.is_empty());
    }

    #[test]
    fn offer_round_trip_ueber_den_draht() {
        let ziel = PeerId::new();
        let mut encoder = ClientCodec::new();
        let mut buf = BytesMut::new();
        encoder
            .encode(
                ClientSignal::Offer {
                    target: ziel,
                    description: SessionDescription::neu(json!({"type": "offer", "sdp": "v=0"})),
                },
                &mut buf,
            )
            .unwrap();

        let mut decoder = ServerCodec::new();
        let decoded = decoder.decode(&mut buf).unwrap().expect("Signal erwartet");
        assert!(matches!(decoded, ClientSignal::Offer { target, .. } if target == ziel));
    }

    #[test]
    fn unvollstaendiger_frame() {
        let mut encoder = ClientCodec::new();
        let mut buf = BytesMut::new();
        encoder
            .encode(ClientSignal::OpenCamera, &mut buf)
            .unwrap();

        // Nur die Haelfte der Bytes behalten
        let half = buf.len() / 2;
        let mut partial = buf.split_to(half);

        let mut decoder = ServerCodec::new();
        let result = decoder.decode(&mut partial).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn zu_wenig_bytes_fuer_laengenfeld() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);
        let result = codec.decode(&mut buf).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn ablehnung_zu_grosser_frame() {
        let mut codec = ServerCodec::with_max_size(100);

        let mut buf = BytesMut::new();
        buf.put_u32(200);
        buf.put_slice(&[b'x'; 200]);

        let result = codec.decode(&mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn ablehnung_beim_encode_zu_grosse_nachricht() {
        let mut codec = ClientCodec::with_max_size(4);
        let mut buf = BytesMut::new();
        let result = codec.encode(ClientSignal::OpenCamera, &mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn mehrere_signale_im_buffer() {
        let mut encoder = ClientCodec::new();
        let mut buf = BytesMut::new();

        for _ in 0..3 {
            encoder
                .encode(ClientSignal::OpenCamera, &mut buf)
                .unwrap();
        }

        let mut decoder = ServerCodec::new();
        for _ in 0..3 {
            let signal = decoder.decode(&mut buf).unwrap().expect("Signal erwartet");
            assert!(matches!(signal, ClientSignal::OpenCamera));
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn ungueltiges_json_ist_fehler() {
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::new();
        let kaputt = b"kein json";
        buf.put_u32(kaputt.len() as u32);
        buf.put_slice(kaputt);

        let result = codec.decode(&mut buf);
        assert!(result.is_err());
    }
}
