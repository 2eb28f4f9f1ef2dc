//! The fallback cascade that turns a [`TlsConfiguration`] into a
//! [`ResolvedContext`].
//!
//! Resolution takes at most three of the four steps below and always ends
//! in a context:
//!
//! | Step | Identity | Trust | Taken when |
//! |------|----------|-------|------------|
//! | 1 | configured | configured | always |
//! | 2 | configured | platform default | step 1 had a trust problem |
//! | 3 | none | configured | step 1 had an identity problem |
//! | 4 | none | platform default | step 2 or 3 failed |
//!
//! Step 4 also ignores the configured protocol name. If even step 4 is
//! impossible because the platform has no crypto provider or no default
//! trust, an unusable placeholder is returned and an error is logged.
//! Every resolution logs exactly one record saying which step won.

use std::fmt;

use crate::config::TlsConfiguration;
use crate::context::{Engine, Outcome, ResolvedContext};
use crate::material::{
    EngineError, IdentityMaterialError, IdentityMaterialSource, MaterialError,
    TrustMaterialError, TrustMaterialSource,
};
use crate::platform::{Platform, SystemPlatform};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Material {
    Configured,
    PlatformDefault,
}

/// Builds [`ResolvedContext`]s, falling back to the defaults of a
/// [`Platform`] when configured material is unusable.
#[derive(Debug, Default)]
pub struct TlsContextResolver<P = SystemPlatform> {
    platform: P,
}

impl TlsContextResolver<SystemPlatform> {
    /// A resolver using the defaults of the running system.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Platform> TlsContextResolver<P> {
    /// A resolver using the defaults of `platform`.
    pub fn with_platform(platform: P) -> Self {
        Self { platform }
    }

    /// The platform supplying defaults.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Resolve `config` into a context. Never fails; see the module
    /// documentation for the order in which material is tried.
    pub fn resolve<I, T>(&self, config: &TlsConfiguration<I, T>) -> ResolvedContext
    where
        I: IdentityMaterialSource,
        T: TrustMaterialSource,
    {
        match self.attempt(config, Material::Configured, Material::Configured) {
            Ok(engine) => {
                log::debug!("Creating TLS context with the given parameters");
                ResolvedContext::new(engine, Outcome::Configured)
            }
            Err(MaterialError::Trust(cause)) => {
                match self.attempt(config, Material::Configured, Material::PlatformDefault) {
                    Ok(engine) => {
                        log::debug!("Creating TLS context with default truststore: {cause}");
                        ResolvedContext::new(engine, Outcome::DefaultTrustStore)
                    }
                    Err(retry) => self.platform_default(format_args!("{cause}; then {retry}")),
                }
            }
            Err(MaterialError::Identity(cause)) => {
                match self.attempt(config, Material::PlatformDefault, Material::Configured) {
                    Ok(engine) => {
                        log::debug!("Creating TLS context with default keystore: {cause}");
                        ResolvedContext::new(engine, Outcome::DefaultKeyStore)
                    }
                    Err(retry) => self.platform_default(format_args!("{cause}; then {retry}")),
                }
            }
        }
    }

    fn attempt<I, T>(
        &self,
        config: &TlsConfiguration<I, T>,
        identity: Material,
        trust: Material,
    ) -> Result<Engine, MaterialError>
    where
        I: IdentityMaterialSource,
        T: TrustMaterialSource,
    {
        let provider = self
            .platform
            .crypto_provider()
            .ok_or(TrustMaterialError::Engine(EngineError::NoCryptoProvider))?;
        let versions = config
            .protocol()
            .versions()
            .map_err(TrustMaterialError::from)?;
        let identity = match identity {
            Material::Configured => Some(
                config
                    .identity()
                    .ok_or(IdentityMaterialError::Missing)?
                    .materialize(&provider)?,
            ),
            Material::PlatformDefault => None,
        };
        let trust = match trust {
            Material::Configured => config
                .trust()
                .ok_or(TrustMaterialError::Missing)?
                .materialize()?,
            Material::PlatformDefault => self.platform.default_trust()?,
        };
        Engine::build(provider, versions, identity, &trust).map_err(MaterialError::from)
    }

    fn platform_default(&self, reason: fmt::Arguments<'_>) -> ResolvedContext {
        let built = self
            .platform
            .crypto_provider()
            .ok_or(TrustMaterialError::Engine(EngineError::NoCryptoProvider))
            .and_then(|provider| {
                let trust = self.platform.default_trust()?;
                Engine::build(provider, rustls::DEFAULT_VERSIONS, None, &trust)
            });
        match built {
            Ok(engine) => {
                log::debug!("Creating TLS context with default configuration: {reason}");
                ResolvedContext::new(engine, Outcome::PlatformDefault)
            }
            Err(e) => {
                log::error!("Failed to create a TLS context with default configuration: {e}");
                ResolvedContext::unusable()
            }
        }
    }
}
