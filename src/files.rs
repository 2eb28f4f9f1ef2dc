//! Identity and trust material read from PEM files on disk.
//!
//! # Command line flags
//!
//! | Flag             | Default | Meaning                 |
//! |------------------|---------|-------------------------|
//! | `--tls-protocol` | `TLS`   | Protocol to negotiate: `TLS`, `TLSv1.2` or `TLSv1.3` |
//! | `--key-path`     | None    | Name of file containing PEM-format X.509 private key |
//! | `--cert-path`    | None    | Name of file containing PEM-format X.509 certificate(s) |
//! | `--cacert`       | None    | Name of file containing PEM-format X.509 trust anchor certificate(s) |
//!
//! `--key-path` and `--cert-path` must be given together. Any flag left out
//! means the corresponding platform default is used.
use rustls::crypto::CryptoProvider;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::config::{TlsConfiguration, TlsProtocol};
use crate::material::{
    IdentityManagers, IdentityMaterialError, IdentityMaterialSource, TrustManagers,
    TrustMaterialError, TrustMaterialSource,
};

/// A [`TlsConfiguration`] backed by PEM files.
pub type FilesConfiguration = TlsConfiguration<KeyStoreFiles, TrustStoreFiles>;

/// Command line arguments describing a [`FilesConfiguration`]. These are
/// all optional.
#[derive(clap::Args, Debug, Default)]
#[group(id = "tls_context_args")]
pub struct Args {
    #[arg(
        long,
        help = "TLS protocol to negotiate: TLS, TLSv1.2 or TLSv1.3. Defaults to TLS."
    )]
    tls_protocol: Option<String>,

    #[arg(
        long,
        requires = "cert_path",
        help = "Path to TLS key in PEM format. If unset, no identity is presented to peers."
    )]
    key_path: Option<PathBuf>,

    #[arg(
        long,
        requires = "key_path",
        help = "Path to TLS certificate in PEM format. If unset, no identity is presented to peers."
    )]
    cert_path: Option<PathBuf>,

    #[arg(
        long,
        help = "Path to TLS root certificate for verifying peers, in PEM format. If unset, the system roots are used."
    )]
    cacert: Option<PathBuf>,
}

impl Args {
    /// Turn the flags into a configuration.
    pub fn into_configuration(self) -> FilesConfiguration {
        let identity = match (self.key_path, self.cert_path) {
            (Some(key_path), Some(cert_path)) => Some(KeyStoreFiles::new(key_path, cert_path)),
            _ => None,
        };
        TlsConfiguration::new(
            self.tls_protocol.map(TlsProtocol::from),
            identity,
            self.cacert.map(TrustStoreFiles::new),
        )
    }
}

/// A private key and certificate chain in two PEM files. Two instances are
/// equal if they name the same files.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyStoreFiles {
    key_path: PathBuf,
    cert_path: PathBuf,
}

impl KeyStoreFiles {
    /// Refer to a key file and a certificate file.
    pub fn new(key_path: impl Into<PathBuf>, cert_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            cert_path: cert_path.into(),
        }
    }

    /// Path to the private key.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Path to the certificate chain.
    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }
}

impl IdentityMaterialSource for KeyStoreFiles {
    fn materialize(
        &self,
        provider: &CryptoProvider,
    ) -> Result<IdentityManagers, IdentityMaterialError> {
        let key_pem = std::fs::read(&self.key_path)?;
        let key = rustls_pemfile::private_key(&mut Cursor::new(&key_pem))?.ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no private key found in {}", self.key_path.display()),
            )
        })?;
        let cert_pem = std::fs::read(&self.cert_path)?;
        let chain =
            rustls_pemfile::certs(&mut Cursor::new(&cert_pem)).collect::<Result<Vec<_>, _>>()?;
        if chain.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no certificate found in {}", self.cert_path.display()),
            )
            .into());
        }
        IdentityManagers::from_der(provider, chain, key)
    }
}

/// Trust anchor certificates in a PEM file. Two instances are equal if they
/// name the same file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrustStoreFiles {
    cacert_path: PathBuf,
}

impl TrustStoreFiles {
    /// Refer to a trust anchor file.
    pub fn new(cacert_path: impl Into<PathBuf>) -> Self {
        Self {
            cacert_path: cacert_path.into(),
        }
    }

    /// Path to the trust anchors.
    pub fn cacert_path(&self) -> &Path {
        &self.cacert_path
    }
}

impl TrustMaterialSource for TrustStoreFiles {
    fn materialize(&self) -> Result<TrustManagers, TrustMaterialError> {
        let pem = std::fs::read(&self.cacert_path)?;
        let certs =
            rustls_pemfile::certs(&mut Cursor::new(&pem)).collect::<Result<Vec<_>, _>>()?;
        if certs.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "no root certificates found in {}",
                    self.cacert_path.display()
                ),
            )
            .into());
        }
        TrustManagers::from_certs(certs)
    }
}
