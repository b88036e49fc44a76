use std::sync::OnceLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// `import ... from "./x"` in its default, named, namespace and mixed forms, plus the
/// bare side-effect form `import "./x"`. Capture 1 is the specifier.
const IMPORT_PATTERN: &str = r#"import\s+(?:type\s+)?(?:(?:\*\s+as\s+[\w$]+|\{[^}]*\}|[\w$]+(?:\s*,\s*(?:\{[^}]*\}|\*\s+as\s+[\w$]+))?)\s+from\s+)?['"]([^'"]+)['"]"#;

/// `export default function|class|const|let|var Name`.
const EXPORT_DEFAULT_DECL_PATTERN: &str =
    r"export\s+default\s+(?:async\s+)?(?:abstract\s+)?(?:function\*?|class|const|let|var)\s+([\w$]+)";

/// `export default Name;` for a capitalised identifier.
const EXPORT_DEFAULT_IDENT_PATTERN: &str = r"export\s+default\s+([A-Z][\w$]*)\s*;";

/// `export { a, b as c }`. Capture 1 is the brace body.
const EXPORT_LIST_PATTERN: &str = r"export\s*\{([^}]+)\}";

/// `export function|class|const|let|var|interface|type|enum Name`.
const EXPORT_NAMED_PATTERN: &str = r"export\s+(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(?:function\*?|class|const|let|var|interface|type|enum)\s+([\w$]+)";

const ALIAS_PATTERN: &str = r"\s+as\s+";

// ---------------------------------------------------------------------------
// Regex cache
// ---------------------------------------------------------------------------

static IMPORT_RE: OnceLock<Regex> = OnceLock::new();
static EXPORT_DEFAULT_DECL_RE: OnceLock<Regex> = OnceLock::new();
static EXPORT_DEFAULT_IDENT_RE: OnceLock<Regex> = OnceLock::new();
static EXPORT_LIST_RE: OnceLock<Regex> = OnceLock::new();
static EXPORT_NAMED_RE: OnceLock<Regex> = OnceLock::new();
static ALIAS_RE: OnceLock<Regex> = OnceLock::new();

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    // Patterns are compile-time constants covered by the tests below.
    cell.get_or_init(|| Regex::new(pattern).expect("invalid built-in pattern"))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Relative (`./`, `../`) or absolute (`/`) specifiers can point into the project;
/// bare package names cannot.
pub fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.starts_with('/')
}

/// Local import specifiers in source order. Duplicates are kept.
pub fn extract_imports(content: &str) -> Vec<String> {
    cached(&IMPORT_RE, IMPORT_PATTERN)
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|spec| is_local_specifier(spec))
        .map(str::to_owned)
        .collect()
}

/// Exported names, deduplicated, in order of first appearance across the four
/// export forms (default declarations, default identifiers, lists, named declarations).
pub fn extract_exports(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        let name = name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    };

    for re in [
        cached(&EXPORT_DEFAULT_DECL_RE, EXPORT_DEFAULT_DECL_PATTERN),
        cached(&EXPORT_DEFAULT_IDENT_RE, EXPORT_DEFAULT_IDENT_PATTERN),
    ] {
        for caps in re.captures_iter(content) {
            if let Some(m) = caps.get(1) {
                push(m.as_str());
            }
        }
    }

    let alias = cached(&ALIAS_RE, ALIAS_PATTERN);
    for caps in cached(&EXPORT_LIST_RE, EXPORT_LIST_PATTERN).captures_iter(content) {
        let Some(body) = caps.get(1) else { continue };
        for item in body.as_str().split(',') {
            // `b as c` exports `c`.
            if let Some(name) = alias.split(item.trim()).last() {
                push(name);
            }
        }
    }

    for caps in cached(&EXPORT_NAMED_RE, EXPORT_NAMED_PATTERN).captures_iter(content) {
        if let Some(m) = caps.get(1) {
            push(m.as_str());
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        for p in [
            IMPORT_PATTERN,
            EXPORT_DEFAULT_DECL_PATTERN,
            EXPORT_DEFAULT_IDENT_PATTERN,
            EXPORT_LIST_PATTERN,
            EXPORT_NAMED_PATTERN,
            ALIAS_PATTERN,
        ] {
            assert!(Regex::new(p).is_ok(), "pattern failed to compile: {p}");
        }
    }

    #[test]
    fn test_import_forms() {
        let src = r#"
            import React from 'react';
            import Foo from "./foo";
            import { a, b as c } from './x';
            import * as ns from '../ns';
            import Def, { named } from "./mixed";
            import './side-effect.css';
            import type { T } from './types';
            import { z } from '/abs/z';
        "#;
        assert_eq!(
            extract_imports(src),
            vec![
                "./foo",
                "./x",
                "../ns",
                "./mixed",
                "./side-effect.css",
                "./types",
                "/abs/z"
            ]
        );
    }

    #[test]
    fn test_multiline_import_list() {
        let src = "import {\n  one,\n  two,\n} from './many';";
        assert_eq!(extract_imports(src), vec!["./many"]);
    }

    #[test]
    fn test_bare_packages_discarded() {
        let src = "import x from 'lodash';\nimport { y } from '@scope/pkg';";
        assert!(extract_imports(src).is_empty());
    }

    #[test]
    fn test_export_list_alias_wins() {
        let src = "const a = 1; const b = 2;\nexport { a, b as c };";
        assert_eq!(extract_exports(src), vec!["a", "c"]);
    }

    #[test]
    fn test_export_forms_in_scan_order() {
        let src = r#"
            export const value = 1;
            export function helper() {}
            export interface Shape {}
            export type Id = string;
            export enum Color { Red }
            export class Widget {}
            export default function App() {}
        "#;
        assert_eq!(
            extract_exports(src),
            vec!["App", "value", "helper", "Shape", "Id", "Color", "Widget"]
        );
    }

    #[test]
    fn test_export_default_identifier_and_dedup() {
        let src = "function Panel() {}\nexport default Panel;\nexport { Panel };";
        assert_eq!(extract_exports(src), vec!["Panel"]);
    }

    #[test]
    fn test_lowercase_default_identifier_ignored() {
        assert!(extract_exports("export default panel;").is_empty());
    }

    #[test]
    fn test_malformed_input_yields_nothing() {
        let src = "import { from ; export { ; export default ;; import";
        assert!(extract_imports(src).is_empty());
        assert!(extract_exports(src).is_empty());
    }
}
