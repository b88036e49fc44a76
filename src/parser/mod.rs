pub mod imports;

use serde::Serialize;

pub use imports::{extract_exports, extract_imports, is_local_specifier};

/// Result of scanning one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extracted {
    /// Raw local import specifiers, in source order.
    pub imports: Vec<String>,
    /// Exported symbol names, deduplicated.
    pub exports: Vec<String>,
}

impl Extracted {
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.exports.is_empty()
    }
}

/// Lexically scan `content` for import and export statements.
///
/// This is a best-effort scan, not a parse: malformed input never fails, it just yields
/// fewer matches. Dynamic `import()` and `export * from` are not recognised.
pub fn extract(content: &str) -> Extracted {
    Extracted {
        imports: extract_imports(content),
        exports: extract_exports(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_statements_yields_empty() {
        let out = extract("const x = 1;\nfunction f() { return x; }\n");
        assert!(out.is_empty());
        assert_eq!(out, Extracted::default());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_imports_and_exports_together() {
        let out = extract("import { foo } from './a';\nexport const bar = foo + 1;\n");
        assert_eq!(out.imports, vec!["./a"]);
        assert_eq!(out.exports, vec!["bar"]);
    }
}
