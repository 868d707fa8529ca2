//! QUIC transport for the client.
//!
//! Provides [`ConnectedTransport`], which handles QUIC I/O for the realtime
//! protocol. This is a thin layer that encodes requests and decodes inbound
//! envelopes; connection lifecycle decisions stay in the Sans-IO
//! [`Session`](crate::session::Session).
//!
//! Each envelope travels on its own unidirectional stream, read to
//! completion in accept order so events reach the session one at a time in
//! arrival order. The first outbound stream carries the `hello` handshake;
//! the server's `helloReply` arrives on an inbound stream and is surfaced as
//! [`SessionEvent::TransportOpened`].

use std::{net::SocketAddr, sync::Arc};

use quinn::{ClientConfig, Endpoint, RecvStream};
use shareroom_proto::{
    ClientRequest, ProtocolError,
    envelope::{self, Inbound, MAX_ENVELOPE_SIZE},
    payloads::session::Hello,
};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::session::{DisconnectReason, SessionEvent};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Handle to a live QUIC connection.
///
/// Requests go out through `to_server`; transport facts (handshake
/// completion, decoded events, closes) come back through `events`, ready to
/// feed into [`Session::handle`](crate::session::Session::handle). An
/// internal task owns the QUIC I/O.
pub struct ConnectedTransport {
    /// Send requests to the server.
    pub to_server: mpsc::Sender<ClientRequest>,
    /// Receive transport facts from the connection.
    pub events: mpsc::Receiver<SessionEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedTransport {
    /// Stop the connection task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to a shareroom server via QUIC.
///
/// Returns a [`ConnectedTransport`] once the QUIC handshake completes. The
/// protocol handshake (`hello`/`helloReply`) runs on the spawned task; its
/// completion arrives as [`SessionEvent::TransportOpened`] on the events
/// channel.
pub async fn connect(server_addr: &str) -> Result<ConnectedTransport, TransportError> {
    let addr: SocketAddr = server_addr
        .parse()
        .map_err(|e| TransportError::Connection(format!("invalid address: {e}")))?;

    let client_config = insecure_client_config()?;
    let mut endpoint = Endpoint::client(SocketAddr::from(([0, 0, 0, 0], 0)))
        .map_err(|e| TransportError::Connection(format!("endpoint creation failed: {e}")))?;
    endpoint.set_default_client_config(client_config);

    let connection = endpoint
        .connect(addr, "localhost")
        .map_err(|e| TransportError::Connection(format!("connect failed: {e}")))?
        .await
        .map_err(|e| TransportError::Connection(format!("connection failed: {e}")))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<ClientRequest>(32);
    let (events_tx, events_rx) = mpsc::channel::<SessionEvent>(32);

    let handle = tokio::spawn(run_connection(connection, to_server_rx, events_tx));

    Ok(ConnectedTransport {
        to_server: to_server_tx,
        events: events_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and QUIC.
async fn run_connection(
    connection: quinn::Connection,
    mut to_server: mpsc::Receiver<ClientRequest>,
    events: mpsc::Sender<SessionEvent>,
) {
    if let Err(e) = send_request(&connection, &ClientRequest::Hello(Hello::current())).await {
        // A connection that cannot carry the handshake is unusable; tell
        // the session so it raises the failure notice and retries.
        tracing::warn!(error = %e, "handshake send failed");
        let _ = events.send(SessionEvent::ConnectFailed { error: e.to_string() }).await;
        connection.close(1u32.into(), b"handshake failed");
        return;
    }

    loop {
        tokio::select! {
            request = to_server.recv() => match request {
                Some(request) => {
                    if let Err(e) = send_request(&connection, &request).await {
                        tracing::warn!(error = %e, event = request.name(), "send failed");
                    }
                },
                // Sender dropped: the driver is done with this connection.
                None => {
                    connection.close(0u32.into(), b"client closed");
                    break;
                },
            },
            incoming = connection.accept_uni() => match incoming {
                // Streams are read to completion one at a time: accept order
                // defines the order events reach the session.
                Ok(recv) => {
                    if let Err(e) = handle_incoming_stream(recv, events.clone()).await {
                        tracing::warn!(error = %e, "incoming stream error");
                    }
                },
                Err(e) => {
                    let reason = classify_close(&e);
                    let _ = events.send(SessionEvent::TransportClosed { reason }).await;
                    break;
                },
            },
        }
    }
}

/// Map a QUIC close to the reconnect-relevant classification.
fn classify_close(error: &quinn::ConnectionError) -> DisconnectReason {
    match error {
        quinn::ConnectionError::ApplicationClosed(_) => DisconnectReason::ServerClosed,
        quinn::ConnectionError::LocallyClosed => DisconnectReason::LocalClosed,
        _ => DisconnectReason::TransportLost,
    }
}

/// Handle an incoming unidirectional stream (server -> client).
///
/// Envelopes with unknown event names are logged and dropped; they never
/// reach the session.
async fn handle_incoming_stream(
    mut recv: RecvStream,
    tx: mpsc::Sender<SessionEvent>,
) -> Result<(), TransportError> {
    let bytes = recv
        .read_to_end(MAX_ENVELOPE_SIZE)
        .await
        .map_err(|e| TransportError::Stream(format!("read failed: {e}")))?;

    let event = match envelope::decode_inbound(&bytes) {
        Ok(Inbound::HelloReply(reply)) => {
            SessionEvent::TransportOpened { connection_id: reply.connection_id }
        },
        Ok(Inbound::Event(event)) => SessionEvent::EventReceived(event),
        Err(ProtocolError::UnknownEvent { name }) => {
            tracing::warn!(event = %name, "dropping envelope with unknown event name");
            return Ok(());
        },
        Err(e) => return Err(TransportError::Protocol(format!("decode failed: {e}"))),
    };

    tx.send(event)
        .await
        .map_err(|e| TransportError::Stream(format!("channel send failed: {e}")))?;

    Ok(())
}

/// Send a request on a fresh unidirectional stream.
async fn send_request(
    connection: &quinn::Connection,
    request: &ClientRequest,
) -> Result<(), TransportError> {
    let bytes = envelope::encode_request(request)
        .map_err(|e| TransportError::Protocol(format!("encode failed: {e}")))?;

    let mut send = connection
        .open_uni()
        .await
        .map_err(|e| TransportError::Stream(format!("open failed: {e}")))?;

    send.write_all(&bytes)
        .await
        .map_err(|e| TransportError::Stream(format!("write failed: {e}")))?;

    send.finish().map_err(|e| TransportError::Stream(format!("finish failed: {e}")))?;

    Ok(())
}

/// Create an insecure client config that accepts any certificate.
///
/// WARNING: Development only. Production should verify certificates.
fn insecure_client_config() -> Result<ClientConfig, TransportError> {
    let mut crypto = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(InsecureCertVerifier))
        .with_no_client_auth();

    // Must match the server's ALPN protocol
    crypto.alpn_protocols = vec![b"shareroom".to_vec()];

    let mut config = ClientConfig::new(Arc::new(
        quinn::crypto::rustls::QuicClientConfig::try_from(crypto)
            .map_err(|e| TransportError::Connection(format!("tls config invalid: {e}")))?,
    ));

    let mut transport = quinn::TransportConfig::default();
    let idle = quinn::IdleTimeout::try_from(std::time::Duration::from_secs(30))
        .map_err(|e| TransportError::Connection(format!("idle timeout invalid: {e}")))?;
    transport.max_idle_timeout(Some(idle));
    config.transport_config(Arc::new(transport));

    Ok(config)
}

/// Certificate verifier that accepts any certificate (insecure, for
/// development).
#[derive(Debug)]
struct InsecureCertVerifier;

impl rustls::client::danger::ServerCertVerifier for InsecureCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
