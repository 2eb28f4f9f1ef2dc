//! Platform defaults used in place of unusable configured material.
//!
//! The [`CryptoProvider`] is the process-global default if one has been
//! installed, otherwise the built-in aws-lc-rs one. Default trust anchors
//! come from the operating system's certificate store, or from the
//! compiled-in Mozilla root program if the OS store yields nothing.

use lazy_static::lazy_static;
use rustls::RootCertStore;
use rustls::crypto::CryptoProvider;
use std::sync::Arc;

use crate::material::{TrustManagers, TrustMaterialError};

/// Source of the defaults [`crate::TlsContextResolver`] falls back to.
pub trait Platform: Send + Sync {
    /// The provider every engine is built with. `None` means the platform
    /// has no default algorithms at all.
    fn crypto_provider(&self) -> Option<Arc<CryptoProvider>>;

    /// Trust anchors to use when the configured ones are unusable.
    fn default_trust(&self) -> Result<TrustManagers, TrustMaterialError>;
}

lazy_static! {
    static ref SYSTEM_ROOTS: Arc<RootCertStore> = load_system_roots();
}

fn load_system_roots() -> Arc<RootCertStore> {
    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    roots.add_parsable_certificates(native.certs);
    if roots.is_empty() {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    Arc::new(roots)
}

/// The defaults of the machine we are running on.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPlatform;

impl Platform for SystemPlatform {
    fn crypto_provider(&self) -> Option<Arc<CryptoProvider>> {
        Some(
            CryptoProvider::get_default()
                .cloned()
                .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider())),
        )
    }

    fn default_trust(&self) -> Result<TrustManagers, TrustMaterialError> {
        Ok(TrustManagers::new(Arc::clone(&SYSTEM_ROOTS)))
    }
}
