//! Source-embedded suppression directives.
//!
//! Supports directives like:
//! ```text
//! // viewlint:ignore(capture-discipline) reason="bridging legacy delegate"
//! // viewlint:ignore(all)
//! ```
//!
//! A directive silences matching findings that start on its own line
//! (trailing directive) or on the line directly below it (directive
//! on its own line).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One parsed suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    /// File the directive appears in.
    pub file: PathBuf,
    /// Line of the directive (1-indexed).
    pub line: usize,
    /// Rule ids silenced; `all` silences every rule.
    pub rules: BTreeSet<String>,
    /// Optional reason text.
    pub reason: Option<String>,
}

impl Suppression {
    /// Tests whether this directive silences a finding by the given
    /// rule starting at `line` in `file`.
    #[must_use]
    pub fn silences(&self, file: &Path, line: usize, rule_id: &str) -> bool {
        self.file == file
            && (line == self.line || line == self.line + 1)
            && (self.rules.contains(rule_id) || self.rules.contains("all"))
    }
}

/// Scans unit source for suppression directives.
#[must_use]
pub fn scan(file: &Path, source: &str) -> Vec<Suppression> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            parse_directive(line).map(|(rules, reason)| Suppression {
                file: file.to_path_buf(),
                line: idx + 1,
                rules,
                reason,
            })
        })
        .collect()
}

/// Parses a directive out of one source line, if present.
fn parse_directive(line: &str) -> Option<(BTreeSet<String>, Option<String>)> {
    let comment_start = line.find("//")?;
    let comment = line[comment_start + 2..].trim();
    let directive = comment.strip_prefix("viewlint:")?.trim();
    let body = directive.strip_prefix("ignore(")?;
    let paren_end = body.find(')')?;

    let rules: BTreeSet<String> = body[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if rules.is_empty() {
        return None;
    }

    let rest = body[paren_end + 1..].trim();
    let reason = rest.strip_prefix("reason=").and_then(|r| {
        let r = r.trim();
        let inner = r.strip_prefix('"')?;
        let end = inner.find('"')?;
        Some(inner[..end].to_string())
    });

    Some((rules, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_trailing_and_standalone_directives() {
        let source = r#"struct ProfileView {
    // viewlint:ignore(capture-discipline)
    var onTap: () -> Void
    let rows = items.enumerated() // viewlint:ignore(stable-identity) reason="static fixture"
}"#;
        let found = scan(Path::new("Profile.ui"), source);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].line, 2);
        assert!(found[0].rules.contains("capture-discipline"));
        assert_eq!(found[0].reason, None);
        assert_eq!(found[1].line, 4);
        assert_eq!(found[1].reason.as_deref(), Some("static fixture"));
    }

    #[test]
    fn directive_silences_same_and_next_line() {
        let s = Suppression {
            file: PathBuf::from("Profile.ui"),
            line: 10,
            rules: ["stable-identity".to_string()].into_iter().collect(),
            reason: None,
        };
        let file = Path::new("Profile.ui");
        assert!(s.silences(file, 10, "stable-identity"));
        assert!(s.silences(file, 11, "stable-identity"));
        assert!(!s.silences(file, 12, "stable-identity"));
        assert!(!s.silences(file, 11, "body-size-limit"));
        assert!(!s.silences(Path::new("Other.ui"), 11, "stable-identity"));
    }

    #[test]
    fn ignore_all_silences_every_rule() {
        let found = scan(Path::new("V.ui"), "// viewlint:ignore(all)\n");
        assert_eq!(found.len(), 1);
        assert!(found[0].silences(Path::new("V.ui"), 2, "anything"));
    }

    #[test]
    fn multiple_rules_in_one_directive() {
        let found = scan(
            Path::new("V.ui"),
            "// viewlint:ignore(body-size-limit, state-ownership)\n",
        );
        assert_eq!(found[0].rules.len(), 2);
    }

    #[test]
    fn plain_comments_are_not_directives() {
        assert!(scan(Path::new("V.ui"), "// just a note\nlet x = 1\n").is_empty());
        assert!(scan(Path::new("V.ui"), "// viewlint:ignore()\n").is_empty());
    }
}
