//! Test file naming conventions per ecosystem
//!
//! Each rule maps a group of file extensions to the glob a matching test file
//! name follows. Rules are evaluated in order and the first match wins; the
//! groups do not overlap.

/// A glob describing the file name of a test file (no directory part)
pub type SearchPattern = String;

/// One entry of the convention table
#[derive(Debug, Clone, Copy)]
pub struct ConventionRule {
    /// Extensions covered by this rule, each with its leading dot
    pub extensions: &'static [&'static str],
    /// Builds the test file name glob from a base name and extension
    pub template: fn(base_name: &str, extension: &str) -> SearchPattern,
}

impl ConventionRule {
    pub fn applies_to(&self, extension: &str) -> bool {
        self.extensions.contains(&extension)
    }
}

pub static CONVENTIONS: &[ConventionRule] = &[
    // Foo.test.ts, Foo.spec.tsx, ...
    ConventionRule {
        extensions: &[".tsx", ".jsx", ".js", ".ts"],
        template: |base, ext| format!("{}.**{}", base, ext),
    },
    ConventionRule {
        extensions: &[".cs", ".swift"],
        template: |base, ext| format!("{}Tests{}", base, ext),
    },
    ConventionRule {
        extensions: &[".java", ".php"],
        template: |base, ext| format!("{}Test{}", base, ext),
    },
    ConventionRule {
        extensions: &[".py"],
        template: |base, ext| format!("test_{}{}", base, ext),
    },
    // foo_test.go, foo_spec.rb, ...
    ConventionRule {
        extensions: &[".rb", ".go", ".cpp"],
        template: |base, ext| format!("{}_**{}", base, ext),
    },
];

/// Resolves the test file name glob for an implementation file.
///
/// # Arguments
/// * `base_name` - File name without its extension; glob metacharacters in
///   it are escaped, so `[id]` matches literally
/// * `extension` - Extension including the leading dot
///
/// # Returns
/// * `Some(SearchPattern)` - Glob for the first rule covering `extension`
/// * `None` - If no rule covers the extension (unsupported)
pub fn resolve(base_name: &str, extension: &str) -> Option<SearchPattern> {
    CONVENTIONS
        .iter()
        .find(|rule| rule.applies_to(extension))
        .map(|rule| (rule.template)(&globset::escape(base_name), extension))
}
