//! Contracts for the collaborators that supply identity and trust material.
//!
//! An [`IdentityMaterialSource`] yields the key and certificate chain this
//! endpoint presents, a [`TrustMaterialSource`] yields the trust anchors it
//! accepts from peers. Where the bytes come from is up to the implementor;
//! [`crate::files`] has implementations that read PEM files. Both report
//! failures with an error specific to their kind of material so that
//! [`crate::TlsContextResolver`] can decide which half of the configuration
//! to replace with platform defaults.

use rustls::RootCertStore;
use rustls::crypto::CryptoProvider;
use rustls::sign::CertifiedKey;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use std::sync::Arc;
use thiserror::Error;

/// Problems assembling the TLS engine itself rather than loading material.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The protocol name does not correspond to any supported TLS version.
    #[error("unsupported TLS protocol {0:?}")]
    UnsupportedProtocol(String),
    /// No [`CryptoProvider`] is available to build an engine with.
    #[error("no cryptographic provider is available")]
    NoCryptoProvider,
    /// rustls refused the provider and protocol version combination.
    #[error("{0}")]
    Rejected(#[from] rustls::Error),
    /// The peer certificate verifier could not be built from the trust anchors.
    #[error("{0}")]
    Verifier(#[from] rustls::server::VerifierBuilderError),
}

/// Failure to produce [`IdentityManagers`].
#[derive(Debug, Error)]
pub enum IdentityMaterialError {
    /// The configuration has no identity material.
    #[error("no identity material is configured")]
    Missing,
    /// The key store could not be read or holds no usable entries.
    #[error("{0}")]
    StoreAccess(#[from] std::io::Error),
    /// The private key uses an algorithm the crypto provider cannot load.
    #[error("unsupported private key: {0}")]
    UnsupportedAlgorithm(#[source] rustls::Error),
    /// The private key cannot be recovered for the certificate, typically
    /// because it belongs to a different certificate.
    #[error("private key does not match certificate: {0}")]
    SecretMismatch(#[source] rustls::Error),
}

/// Failure to produce [`TrustManagers`].
#[derive(Debug, Error)]
pub enum TrustMaterialError {
    /// The configuration has no trust material.
    #[error("no trust material is configured")]
    Missing,
    /// The trust store could not be read or holds no certificates.
    #[error("{0}")]
    StoreAccess(#[from] std::io::Error),
    /// A trust anchor was rejected, for example for an unsupported algorithm.
    #[error("unsupported trust anchor: {0}")]
    Unsupported(#[source] rustls::Error),
    /// The engine could not be assembled around the trust anchors.
    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// The two kinds of failure the resolver distinguishes between.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// The identity half of the configuration is unusable.
    #[error("identity material: {0}")]
    Identity(#[from] IdentityMaterialError),
    /// The trust half of the configuration is unusable.
    #[error("trust material: {0}")]
    Trust(#[from] TrustMaterialError),
}

/// Loaded identity credentials: a certificate chain and its signing key.
#[derive(Clone, Debug)]
pub struct IdentityManagers(Arc<CertifiedKey>);

impl IdentityManagers {
    /// Wrap an already loaded [`CertifiedKey`].
    pub fn new(certified_key: Arc<CertifiedKey>) -> Self {
        Self(certified_key)
    }

    /// Load a private key with `provider` and pair it with its certificate
    /// chain, checking that the two belong together.
    pub fn from_der(
        provider: &CryptoProvider,
        chain: Vec<CertificateDer<'static>>,
        key: PrivateKeyDer<'static>,
    ) -> Result<Self, IdentityMaterialError> {
        if chain.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no certificate found for identity",
            )
            .into());
        }
        let signing_key = provider
            .key_provider
            .load_private_key(key)
            .map_err(IdentityMaterialError::UnsupportedAlgorithm)?;
        let certified_key = CertifiedKey::new(chain, signing_key);
        certified_key
            .keys_match()
            .map_err(IdentityMaterialError::SecretMismatch)?;
        Ok(Self(Arc::new(certified_key)))
    }

    /// The loaded key and certificate chain.
    pub fn certified_key(&self) -> &Arc<CertifiedKey> {
        &self.0
    }
}

/// Loaded trust anchors.
#[derive(Clone, Debug)]
pub struct TrustManagers(Arc<RootCertStore>);

impl TrustManagers {
    /// Wrap an already populated [`RootCertStore`].
    pub fn new(roots: Arc<RootCertStore>) -> Self {
        Self(roots)
    }

    /// Build a store from DER certificates. Every certificate must be
    /// acceptable as a trust anchor and there must be at least one.
    pub fn from_certs(
        certs: impl IntoIterator<Item = CertificateDer<'static>>,
    ) -> Result<Self, TrustMaterialError> {
        let mut roots = RootCertStore::empty();
        for cert in certs {
            roots.add(cert).map_err(TrustMaterialError::Unsupported)?;
        }
        if roots.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "no trust anchors found",
            )
            .into());
        }
        Ok(Self(Arc::new(roots)))
    }

    /// The trust anchors.
    pub fn roots(&self) -> &Arc<RootCertStore> {
        &self.0
    }
}

/// Supplier of the credentials this endpoint presents during a handshake.
pub trait IdentityMaterialSource: Send + Sync + std::fmt::Debug {
    /// Load the identity, using `provider` to interpret the private key.
    fn materialize(
        &self,
        provider: &CryptoProvider,
    ) -> Result<IdentityManagers, IdentityMaterialError>;
}

/// Supplier of the trust anchors used to verify peers.
pub trait TrustMaterialSource: Send + Sync + std::fmt::Debug {
    /// Load the trust anchors.
    fn materialize(&self) -> Result<TrustManagers, TrustMaterialError>;
}
