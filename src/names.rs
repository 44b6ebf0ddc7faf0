use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

/// Appended to the name a generator function is derived from.
pub const GENERATOR_SUFFIX: &str = "_mobxFlow";

/// Base of the namespace import's local name (`mobx_1`, `mobx_2`, ...).
pub const IMPORT_BASE: &str = "mobx";

static NOT_IDENT_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_$]").expect("static regex"));

// -----------------------------------------------------------------------------
// Allocator
// -----------------------------------------------------------------------------

/// Every identifier symbol seen in a unit plus every name handed out since.
/// Uniqueness is per unit, not per lexical scope.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn collect<N: VisitWith<NameCollector>>(node: &N) -> Self {
        let mut collector = NameCollector::default();
        node.visit_with(&mut collector);
        Self { taken: collector.names }
    }

    #[cfg(test)]
    fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// `base_1`, `base_2`, ...; never `base` itself.
    pub fn reserve_numbered(&mut self, base: &str) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// `base` when free, otherwise the first free `base_N`.
    pub fn reserve(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        self.reserve_numbered(base)
    }
}

#[derive(Default)]
pub struct NameCollector {
    names: HashSet<String>,
}

impl Visit for NameCollector {
    fn visit_ident(&mut self, n: &Ident) {
        self.names.insert(n.sym.to_string());
    }
}

// -----------------------------------------------------------------------------
// Name derivation
// -----------------------------------------------------------------------------

/// Turn arbitrary key text into something usable as an identifier prefix.
pub fn sanitize(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let mut out = NOT_IDENT_CHAR.replace_all(raw, "_").into_owned();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    Some(out)
}

/// Name of a property/method key. Computed keys have none.
pub fn key_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(i) => Some(i.sym.to_string()),
        PropName::Str(s) => sanitize(&s.value.to_string()),
        PropName::Num(n) => sanitize(&n.value.to_string()),
        PropName::Computed(_) | PropName::BigInt(_) => None,
    }
}

pub fn private_key_name(key: &PrivateName) -> Option<String> {
    sanitize(key.name.as_ref())
}

/// Base name for a generator: `fn` -> `fn_mobxFlow`.
pub fn generator_base(name: &str) -> String {
    format!("{name}{GENERATOR_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_names_skip_taken() {
        let mut names = UniqueNames::default();
        names.taken.insert("mobx_1".into());
        names.taken.insert("mobx_2".into());
        assert_eq!(names.reserve_numbered(IMPORT_BASE), "mobx_3");
        assert_eq!(names.reserve_numbered(IMPORT_BASE), "mobx_4");
    }

    #[test]
    fn reserve_prefers_bare_base() {
        let mut names = UniqueNames::default();
        assert_eq!(names.reserve("fn_mobxFlow"), "fn_mobxFlow");
        assert_eq!(names.reserve("fn_mobxFlow"), "fn_mobxFlow_1");
        assert_eq!(names.reserve("fn_mobxFlow"), "fn_mobxFlow_2");
        assert!(names.is_taken("fn_mobxFlow_1"));
    }

    #[test]
    fn sanitizes_literal_keys() {
        assert_eq!(sanitize("load-data").as_deref(), Some("load_data"));
        assert_eq!(sanitize("0").as_deref(), Some("_0"));
        assert_eq!(sanitize("$ok").as_deref(), Some("$ok"));
        assert_eq!(sanitize(""), None);
    }

    #[test]
    fn generator_base_appends_suffix() {
        assert_eq!(generator_base("fn"), "fn_mobxFlow");
    }
}
