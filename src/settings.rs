//! A configuration bundled with the context resolved from it.

use crate::config::TlsConfiguration;
use crate::context::{ClientSocketFactory, ResolvedContext, ServerSocketFactory};
use crate::material::{IdentityMaterialSource, TrustMaterialSource};
use crate::platform::Platform;
use crate::resolver::TlsContextResolver;

/// Owns a [`TlsConfiguration`] and the [`ResolvedContext`] computed from it
/// when the settings were created. The context is never recomputed.
///
/// Equality is that of the configurations, so reload logic can compare old
/// and new settings to decide whether anything needs rebuilding.
#[derive(Clone, Debug)]
pub struct TlsSettings<I, T> {
    configuration: TlsConfiguration<I, T>,
    context: ResolvedContext,
}

impl<I, T> TlsSettings<I, T>
where
    I: IdentityMaterialSource,
    T: TrustMaterialSource,
{
    /// Resolve `configuration` against the running system's defaults.
    pub fn new(configuration: TlsConfiguration<I, T>) -> Self {
        Self::with_resolver(configuration, &TlsContextResolver::new())
    }

    /// Resolve `configuration` with a specific resolver.
    pub fn with_resolver<P: Platform>(
        configuration: TlsConfiguration<I, T>,
        resolver: &TlsContextResolver<P>,
    ) -> Self {
        let context = resolver.resolve(&configuration);
        Self {
            configuration,
            context,
        }
    }
}

impl<I, T> TlsSettings<I, T> {
    /// The configuration the context was resolved from.
    pub fn configuration(&self) -> &TlsConfiguration<I, T> {
        &self.configuration
    }

    /// The resolved context.
    pub fn context(&self) -> &ResolvedContext {
        &self.context
    }

    /// Shorthand for the context's [`ResolvedContext::client_socket_factory`].
    pub fn client_socket_factory(&self) -> ClientSocketFactory {
        self.context.client_socket_factory()
    }

    /// Shorthand for the context's [`ResolvedContext::server_socket_factory`].
    pub fn server_socket_factory(&self) -> ServerSocketFactory {
        self.context.server_socket_factory()
    }
}

impl<I: PartialEq, T: PartialEq> PartialEq for TlsSettings<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.configuration == other.configuration
    }
}
