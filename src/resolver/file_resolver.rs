use std::collections::HashSet;

/// Source extensions probed when a specifier omits one, in priority order.
/// The first hit wins, so `.ts` shadows a sibling `.tsx` or `.js` with the same stem.
pub const CODE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".vue", ".svelte"];

/// The outcome of resolving a single import specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Resolved to a canonical path present in the snapshot.
    Resolved { path: String },
    /// No candidate exists in the snapshot: an external package, a non-source asset,
    /// or a genuinely broken path.
    Unresolved { specifier: String, reason: String },
}

impl Resolution {
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Resolved { path } => Some(path),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Normalise `specifier` against the directory of `origin` into a candidate base path.
///
/// `.` segments are dropped and `..` pops one directory; popping past the root is a
/// no-op. A leading `/` anchors the specifier at the snapshot root instead of
/// `origin`'s directory.
pub fn candidate_base(origin: &str, specifier: &str) -> String {
    let mut parts: Vec<&str> = if specifier.starts_with('/') {
        Vec::new()
    } else {
        crate::tree::parent_dir(origin)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect()
    };

    for seg in specifier.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

/// Every path tried for `base`, in resolution order: exact, `base + ext`, then
/// `base/index + ext`.
pub fn candidates(base: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(1 + CODE_EXTENSIONS.len() * 2);
    out.push(base.to_owned());
    out.extend(CODE_EXTENSIONS.iter().map(|ext| format!("{base}{ext}")));
    out.extend(CODE_EXTENSIONS.iter().map(|ext| format!("{base}/index{ext}")));
    out
}

/// Resolve one specifier written in `origin` against the set of known canonical paths.
///
/// A specifier that already is a known canonical path (no leading `.` or `/`) resolves
/// to itself, so a second resolution pass over a resolved tree changes nothing.
pub fn resolve_import_path(origin: &str, specifier: &str, known: &HashSet<&str>) -> Resolution {
    if !crate::parser::is_local_specifier(specifier) && known.contains(specifier) {
        return Resolution::Resolved {
            path: specifier.to_owned(),
        };
    }
    let base = candidate_base(origin, specifier);
    match candidates(&base).into_iter().find(|c| known.contains(c.as_str())) {
        Some(path) => Resolution::Resolved { path },
        None => Resolution::Unresolved {
            specifier: specifier.to_owned(),
            reason: format!("no project file matches '{base}' with any known extension"),
        },
    }
}
