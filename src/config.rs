//! The immutable configuration snapshot a context is resolved from.

use rustls::SupportedProtocolVersion;
use std::fmt;

use crate::material::EngineError;

/// Protocol name used when none is configured.
pub const DEFAULT_PROTOCOL: &str = "TLS";

static TLS12_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS12];
static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Name of the protocol to negotiate, such as `TLS` or `TLSv1.3`.
///
/// Any name is accepted here. Names that do not correspond to a supported
/// protocol are reported when a context is built from them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TlsProtocol(String);

impl TlsProtocol {
    /// Wrap a protocol name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The protocol name as configured.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The protocol versions this name enables. Matching is case-insensitive;
    /// `TLS`, `SSL` and `Default` enable every version rustls offers by
    /// default.
    pub fn versions(&self) -> Result<&'static [&'static SupportedProtocolVersion], EngineError> {
        match self.0.to_ascii_uppercase().as_str() {
            "TLS" | "SSL" | "DEFAULT" => Ok(rustls::DEFAULT_VERSIONS),
            "TLSV1.2" | "TLS1.2" => Ok(TLS12_ONLY),
            "TLSV1.3" | "TLS1.3" => Ok(TLS13_ONLY),
            _ => Err(EngineError::UnsupportedProtocol(self.0.clone())),
        }
    }
}

impl Default for TlsProtocol {
    fn default() -> Self {
        Self::new(DEFAULT_PROTOCOL)
    }
}

impl From<&str> for TlsProtocol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TlsProtocol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for TlsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A protocol name plus optional identity and trust material.
///
/// Two configurations are equal when they refer to the same identity and
/// trust material, where "absent" only equals "absent". The protocol name
/// does not take part in the comparison.
#[derive(Clone, Debug)]
pub struct TlsConfiguration<I, T> {
    protocol: TlsProtocol,
    identity: Option<I>,
    trust: Option<T>,
}

impl<I, T> TlsConfiguration<I, T> {
    /// Assemble a configuration. A missing protocol becomes
    /// [`DEFAULT_PROTOCOL`].
    pub fn new(protocol: Option<TlsProtocol>, identity: Option<I>, trust: Option<T>) -> Self {
        Self {
            protocol: protocol.unwrap_or_default(),
            identity,
            trust,
        }
    }

    /// The protocol to negotiate.
    pub fn protocol(&self) -> &TlsProtocol {
        &self.protocol
    }

    /// The identity material source, if configured.
    pub fn identity(&self) -> Option<&I> {
        self.identity.as_ref()
    }

    /// The trust material source, if configured.
    pub fn trust(&self) -> Option<&T> {
        self.trust.as_ref()
    }
}

impl<I: PartialEq, T: PartialEq> TlsConfiguration<I, T> {
    /// Whether `other` exists and refers to the same material as `self`.
    pub fn same_material(&self, other: Option<&Self>) -> bool {
        other.is_some_and(|other| self.identity == other.identity && self.trust == other.trust)
    }
}

impl<I: PartialEq, T: PartialEq> PartialEq for TlsConfiguration<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_material(Some(other))
    }
}

impl<I: Eq, T: Eq> Eq for TlsConfiguration<I, T> {}
