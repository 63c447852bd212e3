//! Everything one logical connection needs, wired together.

use std::sync::Arc;
use tracing::debug;

use crate::catalog::{Connection, PgCatalogLoader};
use crate::codec::ValueCodec;
use crate::config::CodecSettings;
use crate::defaults::DefaultValueExtractor;
use crate::dialect::{profile_for, DialectProfile};
use crate::quoting::{QuotingEngine, SessionFlags};
use crate::reflect::ColumnReflector;
use crate::registry::TypeRegistry;

#[derive(Debug)]
pub struct Session {
    settings: CodecSettings,
    profile: Arc<dyn DialectProfile>,
    flags: Arc<SessionFlags>,
    quoting: Arc<QuotingEngine>,
    registry: Arc<TypeRegistry>,
    codec: Arc<ValueCodec>,
    defaults: DefaultValueExtractor,
}

impl Session {
    /// Set up a session. Without a connection, catalog ids outside the
    /// built-in set resolve to `Unknown`.
    #[must_use]
    pub fn establish(settings: CodecSettings, connection: Option<Arc<dyn Connection>>) -> Self {
        let profile = profile_for(&settings);
        let flags = Arc::new(SessionFlags::new(settings.initial_backslash_escaping()));
        let quoting = Arc::new(QuotingEngine::new(
            Arc::clone(&profile),
            Arc::clone(&flags),
            settings.identifier_cache_capacity,
        ));

        let registry = match connection {
            Some(connection) if profile.uses_catalog_ids() => TypeRegistry::with_catalog(
                Arc::clone(&profile),
                connection,
                Box::new(PgCatalogLoader::new(settings.supports_ranges())),
            ),
            _ => TypeRegistry::new(Arc::clone(&profile)),
        };

        let codec = Arc::new(ValueCodec::new(Arc::clone(&profile), Arc::clone(&quoting)));
        let defaults = DefaultValueExtractor::new(Arc::clone(&profile), Arc::clone(&codec));

        debug!(
            dialect = settings.dialect.as_str(),
            server_version = settings.server_version,
            backslash_escaping = flags.backslash_escaping(),
            "session established"
        );

        Self {
            settings,
            profile,
            flags,
            quoting,
            registry: Arc::new(registry),
            codec,
            defaults,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    #[must_use]
    pub fn profile(&self) -> &Arc<dyn DialectProfile> {
        &self.profile
    }

    #[must_use]
    pub fn quoting(&self) -> &QuotingEngine {
        &self.quoting
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    #[must_use]
    pub const fn defaults(&self) -> &DefaultValueExtractor {
        &self.defaults
    }

    #[must_use]
    pub fn reflector(&self) -> ColumnReflector {
        ColumnReflector::new(Arc::clone(&self.registry), self.defaults.clone())
    }

    /// PostgreSQL `SET standard_conforming_strings`
    pub fn set_standard_conforming_strings(&self, enabled: bool) {
        self.set_backslash_escaping(!enabled);
    }

    pub fn set_backslash_escaping(&self, enabled: bool) {
        debug!(enabled, "string escaping mode changed");
        self.flags.set_backslash_escaping(enabled);
    }

    /// The physical connection was replaced: nothing learned from the old
    /// one is trusted.
    pub fn reconnected(&self) {
        self.registry.invalidate();
        self.quoting.clear_cache();
    }

    /// Types were added or dropped (`CREATE EXTENSION`, `CREATE TYPE`, ...).
    pub fn types_changed(&self) {
        self.registry.invalidate();
    }
}
