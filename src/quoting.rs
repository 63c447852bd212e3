//! Identifier and string-literal quoting.
//!
//! Quoting is not idempotent: quoting an already quoted identifier doubles its
//! delimiters again. Callers quote raw names exactly once.

use parking_lot::Mutex;
use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::dialect::DialectProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    /// Only `'` is special (SQL standard, `standard_conforming_strings = on`)
    Standard,
    /// Backslash is an escape character and must be doubled too
    BackslashEscaping,
}

/// Escape the body of a single-quoted literal.
#[must_use]
pub fn escape_string(text: &str, mode: EscapeMode) -> Cow<'_, str> {
    let needs_backslash = mode == EscapeMode::BackslashEscaping && text.contains('\\');
    if !text.contains('\'') && !needs_backslash {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\'' => escaped.push_str("''"),
            '\\' if mode == EscapeMode::BackslashEscaping => escaped.push_str("\\\\"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Session state that can change underneath a live connection.
///
/// Read on every quoting call, never captured.
#[derive(Debug)]
pub struct SessionFlags {
    backslash_escaping: AtomicBool,
}

impl SessionFlags {
    #[must_use]
    pub const fn new(backslash_escaping: bool) -> Self {
        Self { backslash_escaping: AtomicBool::new(backslash_escaping) }
    }

    #[must_use]
    pub fn backslash_escaping(&self) -> bool {
        self.backslash_escaping.load(Ordering::Acquire)
    }

    pub fn set_backslash_escaping(&self, enabled: bool) {
        self.backslash_escaping.store(enabled, Ordering::Release);
    }

    #[must_use]
    pub fn escape_mode(&self) -> EscapeMode {
        if self.backslash_escaping() {
            EscapeMode::BackslashEscaping
        } else {
            EscapeMode::Standard
        }
    }
}

/// Bounded memo of quoted identifiers; oldest entry goes first.
#[derive(Debug)]
struct IdentifierCache {
    capacity: usize,
    inner: Mutex<(HashMap<String, String>, VecDeque<String>)>,
}

impl IdentifierCache {
    fn new(capacity: usize) -> Self {
        Self { capacity, inner: Mutex::new((HashMap::new(), VecDeque::new())) }
    }

    fn get_or_insert_with(&self, key: &str, quote: impl FnOnce() -> String) -> String {
        if self.capacity == 0 {
            return quote();
        }
        if let Some(hit) = self.inner.lock().0.get(key) {
            return hit.clone();
        }

        let quoted = quote();
        let mut guard = self.inner.lock();
        let (map, order) = &mut *guard;
        if !map.contains_key(key) {
            while map.len() >= self.capacity {
                match order.pop_front() {
                    Some(oldest) => {
                        map.remove(&oldest);
                    }
                    None => break,
                }
            }
            map.insert(key.to_string(), quoted.clone());
            order.push_back(key.to_string());
        }
        quoted
    }

    fn len(&self) -> usize {
        self.inner.lock().0.len()
    }

    fn clear(&self) {
        let mut guard = self.inner.lock();
        guard.0.clear();
        guard.1.clear();
    }
}

#[derive(Debug)]
pub struct QuotingEngine {
    profile: Arc<dyn DialectProfile>,
    flags: Arc<SessionFlags>,
    identifiers: IdentifierCache,
}

impl QuotingEngine {
    #[must_use]
    pub fn new(profile: Arc<dyn DialectProfile>, flags: Arc<SessionFlags>, cache_capacity: usize) -> Self {
        Self { profile, flags, identifiers: IdentifierCache::new(cache_capacity) }
    }

    /// Quote a possibly schema-qualified name: `public.users` -> `"public"."users"`.
    ///
    /// Only the first separator outside delimiters splits; a separator inside a
    /// delimited part is part of the name.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        self.identifiers.get_or_insert_with(name, || match self.split_qualified(name) {
            Some((schema, object)) => format!(
                "{}{}{}",
                self.quote_column_name(schema),
                self.profile.schema_separator(),
                self.quote_column_name(object)
            ),
            None => self.quote_column_name(name),
        })
    }

    /// Quote a single name part; separators are not interpreted.
    #[must_use]
    pub fn quote_column_name(&self, name: &str) -> String {
        let (open, close) = self.profile.identifier_delimiters();
        let folded = self.profile.fold_identifier(name);
        let mut quoted = String::with_capacity(folded.len() + 2);
        quoted.push(open);
        for ch in folded.chars() {
            if ch == close {
                quoted.push(close);
            }
            quoted.push(ch);
        }
        quoted.push(close);
        quoted
    }

    /// `'text'` with the escaping rules of `mode`
    #[must_use]
    pub fn quote_string_literal(&self, text: &str, mode: EscapeMode) -> String {
        format!("'{}'", escape_string(text, mode))
    }

    /// `'text'` escaped for the session's current mode
    #[must_use]
    pub fn quote_string(&self, text: &str) -> String {
        self.quote_string_literal(text, self.flags.escape_mode())
    }

    #[must_use]
    pub fn escape_mode(&self) -> EscapeMode {
        self.flags.escape_mode()
    }

    #[must_use]
    pub fn cached_identifiers(&self) -> usize {
        self.identifiers.len()
    }

    pub fn clear_cache(&self) {
        self.identifiers.clear();
    }

    fn split_qualified<'a>(&self, name: &'a str) -> Option<(&'a str, &'a str)> {
        let (open, close) = self.profile.identifier_delimiters();
        let separator = self.profile.schema_separator();
        let mut inside = false;
        for (index, ch) in name.char_indices() {
            if open == close && ch == open {
                inside = !inside;
            } else if ch == open {
                inside = true;
            } else if ch == close {
                inside = false;
            } else if ch == separator && !inside {
                return Some((&name[..index], &name[index + ch.len_utf8()..]));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CodecSettings, DialectKind};
    use crate::dialect::profile_for;

    fn engine(kind: DialectKind) -> QuotingEngine {
        let profile = profile_for(&CodecSettings::for_dialect(kind));
        QuotingEngine::new(profile, Arc::new(SessionFlags::new(false)), 16)
    }

    #[test]
    fn test_escape_string_modes() {
        assert_eq!(escape_string("plain", EscapeMode::Standard), "plain");
        assert_eq!(escape_string("it's", EscapeMode::Standard), "it''s");
        assert_eq!(escape_string("a\\b", EscapeMode::Standard), "a\\b");
        assert_eq!(escape_string("a\\b'c", EscapeMode::BackslashEscaping), "a\\\\b''c");
    }

    #[test]
    fn test_quote_identifier_per_dialect() {
        assert_eq!(engine(DialectKind::Postgres).quote_identifier("users"), "\"users\"");
        assert_eq!(engine(DialectKind::Mysql).quote_identifier("ta`ble"), "`ta``ble`");
        assert_eq!(engine(DialectKind::Mssql).quote_identifier("dbo.my]table"), "[dbo].[my]]table]");
        assert_eq!(engine(DialectKind::Oracle).quote_identifier("users"), "\"USERS\"");
        assert_eq!(engine(DialectKind::Sqlite).quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_schema_split_once_outside_delimiters() {
        let pg = engine(DialectKind::Postgres);
        assert_eq!(pg.quote_identifier("public.users"), "\"public\".\"users\"");
        assert_eq!(pg.quote_identifier("a.b.c"), "\"a\".\"b.c\"");
        assert_eq!(pg.quote_column_name("public.users"), "\"public.users\"");
    }

    #[test]
    fn test_quoting_is_not_idempotent() {
        let pg = engine(DialectKind::Postgres);
        let once = pg.quote_identifier("users");
        let twice = pg.quote_identifier(&once);
        assert_eq!(twice, "\"\"\"users\"\"\"");
        assert_ne!(once, twice);
    }

    #[test]
    fn test_session_mode_is_read_per_call() {
        let profile = profile_for(&CodecSettings::for_dialect(DialectKind::Postgres));
        let flags = Arc::new(SessionFlags::new(false));
        let quoting = QuotingEngine::new(profile, Arc::clone(&flags), 16);

        assert_eq!(quoting.quote_string("a\\b"), "'a\\b'");
        flags.set_backslash_escaping(true);
        assert_eq!(quoting.quote_string("a\\b"), "'a\\\\b'");
        assert_eq!(quoting.quote_string_literal("a\\b", EscapeMode::Standard), "'a\\b'");
    }

    #[test]
    fn test_identifier_cache_is_bounded() {
        let profile = profile_for(&CodecSettings::for_dialect(DialectKind::Postgres));
        let quoting = QuotingEngine::new(profile, Arc::new(SessionFlags::new(false)), 2);
        for name in ["a", "b", "c", "a"] {
            let _ = quoting.quote_identifier(name);
        }
        assert_eq!(quoting.cached_identifiers(), 2);
        assert_eq!(quoting.quote_identifier("b"), "\"b\"");

        quoting.clear_cache();
        assert_eq!(quoting.cached_identifiers(), 0);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let profile = profile_for(&CodecSettings::for_dialect(DialectKind::Mysql));
        let quoting = QuotingEngine::new(profile, Arc::new(SessionFlags::new(true)), 0);
        assert_eq!(quoting.quote_identifier("t"), "`t`");
        assert_eq!(quoting.cached_identifiers(), 0);
    }
}
