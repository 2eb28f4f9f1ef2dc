//! Test PKI, material sources and platform, generated once per test binary.

use lazy_static::lazy_static;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair,
};
use rustls::crypto::CryptoProvider;
use rustls_pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::material::{
    IdentityManagers, IdentityMaterialError, IdentityMaterialSource, TrustManagers,
    TrustMaterialError, TrustMaterialSource,
};
use crate::platform::Platform;

pub(crate) struct Pem {
    pub(crate) cert: String,
    pub(crate) key: String,
}

pub(crate) struct TestPki {
    pub(crate) ca: Pem,
    pub(crate) user1: Pem,
    pub(crate) user2: Pem,
}

lazy_static! {
    pub(crate) static ref PKI: TestPki = generate();
}

fn leaf(name: &str, ca: &Certificate, ca_key: &KeyPair) -> Pem {
    let mut params = CertificateParams::new(vec![name.to_string()]).unwrap();
    params.distinguished_name.push(DnType::CommonName, name);
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
    ];
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, ca, ca_key).unwrap();
    Pem {
        cert: cert.pem(),
        key: key.serialize_pem(),
    }
}

fn generate() -> TestPki {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params
        .distinguished_name
        .push(DnType::CommonName, "tls_context test CA");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let ca_key = KeyPair::generate().unwrap();
    let ca = params.self_signed(&ca_key).unwrap();
    TestPki {
        user1: leaf("user1", &ca, &ca_key),
        user2: leaf("user2", &ca, &ca_key),
        ca: Pem {
            cert: ca.pem(),
            key: ca_key.serialize_pem(),
        },
    }
}

pub(crate) fn certs(pem: &str) -> Vec<CertificateDer<'static>> {
    rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

pub(crate) fn key(pem: &str) -> PrivateKeyDer<'static> {
    rustls_pemfile::private_key(&mut pem.as_bytes())
        .unwrap()
        .unwrap()
}

/// A PKCS#8 container holding nothing any provider can load.
pub(crate) fn junk_key() -> PrivateKeyDer<'static> {
    PrivatePkcs8KeyDer::from(vec![0x30, 0x03, 0x02, 0x01, 0x00]).into()
}

pub(crate) fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::aws_lc_rs::default_provider())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TestIdentity {
    User1,
    WrongSecret,
    Unsupported,
    Unreadable,
}

impl IdentityMaterialSource for TestIdentity {
    fn materialize(
        &self,
        provider: &CryptoProvider,
    ) -> Result<IdentityManagers, IdentityMaterialError> {
        match self {
            Self::User1 => {
                IdentityManagers::from_der(provider, certs(&PKI.user1.cert), key(&PKI.user1.key))
            }
            Self::WrongSecret => {
                IdentityManagers::from_der(provider, certs(&PKI.user1.cert), key(&PKI.user2.key))
            }
            Self::Unsupported => {
                IdentityManagers::from_der(provider, certs(&PKI.user1.cert), junk_key())
            }
            Self::Unreadable => Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "key store is not readable",
            )
            .into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TestTrust {
    Ca,
    Garbage,
    Empty,
}

impl TrustMaterialSource for TestTrust {
    fn materialize(&self) -> Result<TrustManagers, TrustMaterialError> {
        match self {
            Self::Ca => TrustManagers::from_certs(certs(&PKI.ca.cert)),
            Self::Garbage => TrustManagers::from_certs([CertificateDer::from(vec![1u8, 2, 3])]),
            Self::Empty => TrustManagers::from_certs(Vec::new()),
        }
    }
}

/// Trusts the test CA by default and counts how often that default is used.
pub(crate) struct TestPlatform {
    provider: Option<Arc<CryptoProvider>>,
    has_default_trust: bool,
    default_trust_loads: AtomicUsize,
}

impl TestPlatform {
    pub(crate) fn new() -> Self {
        Self {
            provider: Some(provider()),
            has_default_trust: true,
            default_trust_loads: AtomicUsize::new(0),
        }
    }

    pub(crate) fn without_crypto_provider() -> Self {
        Self {
            provider: None,
            ..Self::new()
        }
    }

    pub(crate) fn without_default_trust() -> Self {
        Self {
            has_default_trust: false,
            ..Self::new()
        }
    }

    pub(crate) fn default_trust_loads(&self) -> usize {
        self.default_trust_loads.load(Ordering::SeqCst)
    }
}

impl Platform for TestPlatform {
    fn crypto_provider(&self) -> Option<Arc<CryptoProvider>> {
        self.provider.clone()
    }

    fn default_trust(&self) -> Result<TrustManagers, TrustMaterialError> {
        self.default_trust_loads.fetch_add(1, Ordering::SeqCst);
        if self.has_default_trust {
            TrustManagers::from_certs(certs(&PKI.ca.cert))
        } else {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no platform trust store").into())
        }
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if record.target().starts_with(module_path!().split("::").next().unwrap()) {
            RECORDS.with(|r| {
                r.borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Run `f` and return the records this crate logged on the current thread
/// while it ran.
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<(log::Level, String)>) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    RECORDS.with(|r| r.borrow_mut().clear());
    let result = f();
    (result, RECORDS.with(|r| r.take()))
}
