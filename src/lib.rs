//! Resilient TLS context resolution
//!
//! A [`TlsConfiguration`] names a protocol and, optionally, where to find
//! identity material (key and certificate chain) and trust material (trust
//! anchors). [`TlsContextResolver`] turns it into a [`ResolvedContext`]
//! from which client and server socket factories can be obtained.
//!
//! Resolution never fails. If the configured identity cannot be used the
//! context presents no identity; if the configured trust anchors cannot be
//! used those of the platform are used instead; if neither works the
//! context is built entirely from platform defaults. Each resolution logs
//! one record, through the [`log`] facade, describing which of these paths
//! was taken. Should even the platform defaults be unavailable, an error is
//! logged and the returned context reports [`ResolvedContext::is_usable`]
//! false and its socket factories fail every handshake.
//!
//! Material comes from implementors of [`IdentityMaterialSource`] and
//! [`TrustMaterialSource`]. Implementations that read PEM files named on
//! the command line are provided in [`files`].
//!
//! ```no_run
//! use tls_context::{TlsConfiguration, TlsContextResolver};
//! use tls_context::files::{KeyStoreFiles, TrustStoreFiles};
//!
//! let config = TlsConfiguration::new(
//!     Some("TLSv1.3".into()),
//!     Some(KeyStoreFiles::new("/etc/tls/key.pem", "/etc/tls/cert.pem")),
//!     Some(TrustStoreFiles::new("/etc/tls/ca.pem")),
//! );
//! let context = TlsContextResolver::new().resolve(&config);
//! let connector = context.client_socket_factory().connector();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod context;
#[cfg(feature = "files")]
pub mod files;
pub mod material;
pub mod platform;
pub mod resolver;
pub mod settings;
#[cfg(test)]
mod testdata;

pub use config::{DEFAULT_PROTOCOL, TlsConfiguration, TlsProtocol};
pub use context::{ClientSocketFactory, Outcome, ResolvedContext, ServerSocketFactory};
pub use material::{
    EngineError, IdentityManagers, IdentityMaterialError, IdentityMaterialSource, MaterialError,
    TrustManagers, TrustMaterialError, TrustMaterialSource,
};
pub use platform::{Platform, SystemPlatform};
pub use resolver::TlsContextResolver;
pub use settings::TlsSettings;
