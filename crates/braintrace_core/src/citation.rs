//! Splits assistant text into plain lines and cited-entity lines.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationLine {
    /// Trimmed line text; blank lines are kept as empty strings.
    Text(String),
    Citation { entity_name: String },
}

impl CitationLine {
    pub fn is_citation(&self) -> bool {
        matches!(self, CitationLine::Citation { .. })
    }

    /// Entity name for citations, trimmed text otherwise.
    pub fn entity_name(&self) -> &str {
        match self {
            CitationLine::Text(text) => text,
            CitationLine::Citation { entity_name } => entity_name,
        }
    }
}

/// Parses `text` line by line. With `known` set, a dash line is a citation
/// only when its name is in the universe; without it every dash line with a
/// non-empty name is.
///
/// Always returns one entry per `\n`-separated line.
pub fn parse_citations(text: &str, known: Option<&HashSet<String>>) -> Vec<CitationLine> {
    text.split('\n')
        .map(|line| classify_line(line, known))
        .collect()
}

fn classify_line(line: &str, known: Option<&HashSet<String>>) -> CitationLine {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('-') else {
        return CitationLine::Text(trimmed.to_string());
    };
    let candidate = rest.trim_start_matches(['\t', ' ']);
    if candidate.is_empty() {
        return CitationLine::Text(trimmed.to_string());
    }
    let accepted = match known {
        Some(universe) => universe.contains(candidate),
        None => true,
    };
    if accepted {
        CitationLine::Citation {
            entity_name: candidate.to_string(),
        }
    } else {
        CitationLine::Text(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn line_count_matches_newlines_plus_one() {
        let text = "첫 줄\n\n- 지구\n   \n끝\n";
        let lines = parse_citations(text, None);
        assert_eq!(lines.len(), text.matches('\n').count() + 1);
        assert_eq!(lines[1], CitationLine::Text(String::new()));
        assert_eq!(lines[5], CitationLine::Text(String::new()));
    }

    #[test]
    fn strips_dash_tabs_and_spaces() {
        let lines = parse_citations("  -\t\t 중력  ", None);
        assert_eq!(
            lines,
            vec![CitationLine::Citation {
                entity_name: "중력".into()
            }]
        );
    }

    #[test]
    fn strict_mode_requires_known_name() {
        let known = universe(&["지구"]);
        let lines = parse_citations("- 지구\n- 목록 항목", Some(&known));
        assert!(lines[0].is_citation());
        assert_eq!(lines[1], CitationLine::Text("- 목록 항목".into()));
    }

    #[test]
    fn known_citation_is_citation_in_both_modes() {
        let known = universe(&["지구"]);
        assert!(parse_citations("- 지구", Some(&known))[0].is_citation());
        assert!(parse_citations("- 지구", None)[0].is_citation());
    }

    #[test]
    fn bare_dash_degrades_to_text() {
        let lines = parse_citations("-\n - \t", None);
        assert_eq!(
            lines,
            vec![CitationLine::Text("-".into()), CitationLine::Text("-".into())]
        );
        // Even a universe containing the empty name cannot make it a citation.
        let known = universe(&[""]);
        assert!(!parse_citations("-", Some(&known))[0].is_citation());
    }

    #[test]
    fn only_one_leading_dash_is_stripped() {
        let lines = parse_citations("--구분선", None);
        assert_eq!(
            lines,
            vec![CitationLine::Citation {
                entity_name: "-구분선".into()
            }]
        );
    }
}
