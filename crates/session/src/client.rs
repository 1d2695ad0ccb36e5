//! Relay-Verbindung – TCP-Client zum Signaling-Relay
//!
//! Kapselt Socket, Codec und die beiden Pump-Tasks hinter zwei
//! mpsc-Kanaelen: ein Sender fuer Client-Signale ans Relay, ein
//! Receiver fuer Server-Signale vom Relay. Reisst die TCP-Verbindung
//! ab, enden beide Kanaele und damit die Mesh-Verarbeitung.

use futures_util::{SinkExt, StreamExt};
use kamerad_protocol::signal::{ClientSignal, ServerSignal};
use kamerad_protocol::wire::ClientCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use crate::error::SessionResult;
use crate::mesh::MeshContext;
use crate::transport::TransportFactory;

/// Groesse der Sende- und Empfangsqueue pro Verbindung
const KANAL_GROESSE: usize = 64;

/// Eine aufgebaute Verbindung zum Signaling-Relay
pub struct RelayVerbindung {
    ausgang: mpsc::Sender<ClientSignal>,
    eingang: mpsc::Receiver<ServerSignal>,
}

impl RelayVerbindung {
    /// Baut die TCP-Verbindung auf und startet die Pump-Tasks
    pub async fn verbinden(adresse: SocketAddr) -> SessionResult<Self> {
        let stream = TcpStream::connect(adresse).await?;
        tracing::info!(adresse = %adresse, "Mit Relay verbunden");

        let framed = Framed::new(stream, ClientCodec::new());
        let (mut sink, mut strom) = framed.split();

        let (ausgang_tx, mut ausgang_rx) = mpsc::channel::<ClientSignal>(KANAL_GROESSE);
        let (eingang_tx, eingang_rx) = mpsc::channel::<ServerSignal>(KANAL_GROESSE);

        // Schreib-Task: Queue -> Socket
        tokio::spawn(async move {
            while let Some(signal) = ausgang_rx.recv().await {
                if let Err(e) = sink.send(signal).await {
                    tracing::warn!(fehler = %e, "Senden ans Relay fehlgeschlagen");
                    break;
                }
            }
            tracing::debug!("Schreib-Task zum Relay beendet");
        });

        // Lese-Task: Socket -> Queue
        tokio::spawn(async move {
            loop {
                match strom.next().await {
                    Some(Ok(signal)) => {
                        if eingang_tx.send(signal).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(fehler = %e, "Frame-Lesefehler vom Relay");
                        break;
                    }
                    None => {
                        tracing::info!("Relay hat die Verbindung geschlossen");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            ausgang: ausgang_tx,
            eingang: eingang_rx,
        })
    }

    /// Sender fuer Client-Signale ans Relay
    pub fn ausgang(&self) -> mpsc::Sender<ClientSignal> {
        self.ausgang.clone()
    }

    /// Verbraucht die Verbindung und erzeugt den Mesh-Kontext
    ///
    /// Der zurueckgegebene Receiver gehoert in
    /// [`MeshContext::ausfuehren`]; er endet mit der TCP-Verbindung.
    pub fn mesh(
        self,
        factory: Arc<dyn TransportFactory>,
    ) -> (MeshContext, mpsc::Receiver<ServerSignal>) {
        (MeshContext::neu(factory, self.ausgang), self.eingang)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use kamerad_core::types::{Participant, PeerId};
    use kamerad_protocol::wire::ServerCodec;
    use tokio::net::TcpListener;

    /// Minimaler Relay-Ersatz: akzeptiert eine Verbindung mit ServerCodec
    async fn test_relay() -> (TcpListener, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let adresse = listener.local_addr().unwrap();
        (listener, adresse)
    }

    #[tokio::test]
    async fn signale_fliessen_in_beide_richtungen() {
        let (listener, adresse) = test_relay().await;

        let relay = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, ServerCodec::new());

            // Client-Signal empfangen
            let empfangen = framed.next().await.unwrap().unwrap();
            assert!(matches!(empfangen, ClientSignal::OpenCamera));

            // Server-Signal zurueckschicken
            let ich = Participant::neu(PeerId::new(), "Mutiger Fuchs");
            framed
                .send(ServerSignal::Welcome {
                    you: ich.clone(),
                    participants: vec![],
                })
                .await
                .unwrap();
            ich
        });

        let mut verbindung = RelayVerbindung::verbinden(adresse).await.unwrap();
        verbindung
            .ausgang()
            .send(ClientSignal::OpenCamera)
            .await
            .unwrap();

        let ich = relay.await.unwrap();
        match verbindung.eingang.recv().await.unwrap() {
            ServerSignal::Welcome { you, participants } => {
                assert_eq!(you, ich);
                assert!(participants.is_empty());
            }
            andere => panic!("Welcome erwartet, war {andere:?}"),
        }
    }

    #[tokio::test]
    async fn geschlossene_verbindung_beendet_den_eingang() {
        let (listener, adresse) = test_relay().await;

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let mut verbindung = RelayVerbindung::verbinden(adresse).await.unwrap();
        assert!(verbindung.eingang.recv().await.is_none());
    }
}
