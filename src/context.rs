//! The resolved, immutable TLS context and the socket factories it mints.

use rustls::client::ResolvesClientCert;
use rustls::crypto::CryptoProvider;
use rustls::server::{ClientHello, ResolvesServerCert, WebPkiClientVerifier};
use rustls::sign::CertifiedKey;
use rustls::{ClientConfig, ProtocolVersion, ServerConfig, SupportedProtocolVersion};
use rustls_pki_types::ServerName;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::{TlsAcceptor, TlsConnector, client, server};

use crate::material::{EngineError, IdentityManagers, TrustManagers, TrustMaterialError};

/// Which step of the fallback cascade produced a [`ResolvedContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Configured identity and configured trust.
    Configured,
    /// Configured identity, platform default trust.
    DefaultTrustStore,
    /// No identity, configured trust.
    DefaultKeyStore,
    /// No identity, platform default trust and protocol versions.
    PlatformDefault,
    /// Nothing could be built. The socket factories refuse to work.
    Unusable,
}

/// Hands out the same identity, or none, to every handshake.
#[derive(Debug)]
struct IdentityResolver(Option<Arc<CertifiedKey>>);

impl ResolvesClientCert for IdentityResolver {
    fn resolve(
        &self,
        _root_hint_subjects: &[&[u8]],
        _sigschemes: &[rustls::SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        self.0.clone()
    }

    fn has_certs(&self) -> bool {
        self.0.is_some()
    }
}

impl ResolvesServerCert for IdentityResolver {
    fn resolve(&self, _client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        self.0.clone()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Engine {
    client: Arc<ClientConfig>,
    server: Arc<ServerConfig>,
    versions: Vec<ProtocolVersion>,
}

impl Engine {
    /// Assemble client and server configurations. Without an identity the
    /// client offers no certificate and the server cannot complete
    /// handshakes. Clients of the server are verified against `trust` when
    /// they present a certificate.
    pub(crate) fn build(
        provider: Arc<CryptoProvider>,
        versions: &[&'static SupportedProtocolVersion],
        identity: Option<IdentityManagers>,
        trust: &TrustManagers,
    ) -> Result<Self, TrustMaterialError> {
        let identity = Arc::new(IdentityResolver(
            identity.map(|i| Arc::clone(i.certified_key())),
        ));
        let client = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_protocol_versions(versions)
            .map_err(EngineError::from)?
            .with_root_certificates(Arc::clone(trust.roots()))
            .with_client_cert_resolver(identity.clone());
        let verifier = WebPkiClientVerifier::builder_with_provider(
            Arc::clone(trust.roots()),
            Arc::clone(&provider),
        )
        .allow_unauthenticated()
        .build()
        .map_err(EngineError::from)?;
        let server = ServerConfig::builder_with_provider(provider)
            .with_protocol_versions(versions)
            .map_err(EngineError::from)?
            .with_client_cert_verifier(verifier)
            .with_cert_resolver(identity);
        Ok(Self {
            client: Arc::new(client),
            server: Arc::new(server),
            versions: versions.iter().map(|v| v.version).collect(),
        })
    }
}

fn unusable() -> std::io::Error {
    std::io::Error::other("TLS context is unusable: no default TLS configuration is available")
}

/// An immutable TLS context. Cheap to clone and safe to share between
/// threads; every factory it hands out uses the same underlying engine.
#[derive(Clone, Debug)]
pub struct ResolvedContext {
    engine: Option<Engine>,
    outcome: Outcome,
}

impl ResolvedContext {
    pub(crate) fn new(engine: Engine, outcome: Outcome) -> Self {
        Self {
            engine: Some(engine),
            outcome,
        }
    }

    pub(crate) fn unusable() -> Self {
        Self {
            engine: None,
            outcome: Outcome::Unusable,
        }
    }

    /// How the context was arrived at.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Whether the context can be used for handshakes at all.
    pub fn is_usable(&self) -> bool {
        self.engine.is_some()
    }

    /// Protocol versions the engine will negotiate. Empty if unusable.
    pub fn protocol_versions(&self) -> &[ProtocolVersion] {
        self.engine.as_ref().map(|e| &e.versions[..]).unwrap_or_default()
    }

    /// Factory for the client side of connections.
    pub fn client_socket_factory(&self) -> ClientSocketFactory {
        ClientSocketFactory(self.engine.as_ref().map(|e| Arc::clone(&e.client)))
    }

    /// Factory for the server side of connections.
    pub fn server_socket_factory(&self) -> ServerSocketFactory {
        ServerSocketFactory(self.engine.as_ref().map(|e| Arc::clone(&e.server)))
    }
}

/// Wraps outgoing streams in TLS.
#[derive(Clone, Debug)]
pub struct ClientSocketFactory(Option<Arc<ClientConfig>>);

impl ClientSocketFactory {
    /// The underlying rustls configuration, absent if the context is unusable.
    pub fn config(&self) -> Option<&Arc<ClientConfig>> {
        self.0.as_ref()
    }

    /// A [`TlsConnector`], absent if the context is unusable.
    pub fn connector(&self) -> Option<TlsConnector> {
        self.0.clone().map(TlsConnector::from)
    }

    /// Perform the client side of a handshake over `stream`.
    pub async fn connect<IO>(
        &self,
        server_name: ServerName<'static>,
        stream: IO,
    ) -> std::io::Result<client::TlsStream<IO>>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
    {
        match self.connector() {
            Some(connector) => connector.connect(server_name, stream).await,
            None => Err(unusable()),
        }
    }
}

/// Wraps accepted streams in TLS.
#[derive(Clone, Debug)]
pub struct ServerSocketFactory(Option<Arc<ServerConfig>>);

impl ServerSocketFactory {
    /// The underlying rustls configuration, absent if the context is unusable.
    pub fn config(&self) -> Option<&Arc<ServerConfig>> {
        self.0.as_ref()
    }

    /// A [`TlsAcceptor`], absent if the context is unusable.
    pub fn acceptor(&self) -> Option<TlsAcceptor> {
        self.0.clone().map(TlsAcceptor::from)
    }

    /// Perform the server side of a handshake over `stream`.
    pub async fn accept<IO>(&self, stream: IO) -> std::io::Result<server::TlsStream<IO>>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
    {
        match self.acceptor() {
            Some(acceptor) => acceptor.accept(stream).await,
            None => Err(unusable()),
        }
    }
}
