use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[\w/-]+").expect("valid tag regex"));
static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\]]+\]\]").expect("valid wikilink regex"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(#{1,6})(?:\s+(.*))?$").expect("valid heading regex"));
static OPEN_TODO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+\[ \]\s+(.+)$").expect("valid checklist regex"));

const MIN_TOKEN_CHARS: usize = 3;

/// Lowercased alphanumeric runs of at least three characters, in order, duplicates kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Unique hashtags in first-seen order.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    push_tags(&mut tags, text);
    tags
}

/// Append hashtags from `text` that `tags` does not hold yet.
pub fn push_tags(tags: &mut Vec<String>, text: &str) {
    for m in TAG_RE.find_iter(text) {
        if !tags.iter().any(|tag| tag == m.as_str()) {
            tags.push(m.as_str().to_string());
        }
    }
}

/// A markdown ATX heading: level and the text after the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    pub level: usize,
    pub text: &'a str,
}

pub fn parse_heading(line: &str) -> Option<Heading<'_>> {
    let caps = HEADING_RE.captures(line)?;
    Some(Heading {
        level: caps.get(1)?.as_str().len(),
        text: caps.get(2).map_or("", |m| m.as_str().trim()),
    })
}

/// Heading text with hashtags removed and whitespace collapsed.
pub fn heading_title(text: &str) -> String {
    TAG_RE
        .replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of an unchecked checklist item, trimmed.
pub fn open_todo_text(line: &str) -> Option<&str> {
    let text = OPEN_TODO_RE.captures(line)?.get(1)?.as_str().trim();
    (!text.is_empty()).then_some(text)
}

/// Targets of every `[[WikiLink]]` on a line, alias and section stripped.
pub fn wikilink_targets(text: &str) -> Vec<String> {
    WIKILINK_RE
        .find_iter(text)
        .filter_map(|m| parse_wikilink_target(m.as_str()))
        .collect()
}

fn parse_wikilink_target(wikilink: &str) -> Option<String> {
    if !(wikilink.starts_with("[[") && wikilink.ends_with("]]")) {
        return None;
    }

    let inner = &wikilink[2..wikilink.len().saturating_sub(2)];
    let sanitized = sanitize_link_name(inner);
    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

fn sanitize_link_name(raw: &str) -> String {
    raw.split(['|', '#'])
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_short_and_punctuation() {
        assert_eq!(
            tokenize("Q3 Roadmap: API-review w/ Design!"),
            vec!["roadmap", "api", "review", "design"]
        );
        assert_eq!(tokenize("go go gophers gophers"), vec!["gophers", "gophers"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn tags_keep_first_seen_order_without_duplicates() {
        assert_eq!(
            extract_tags("### Standup #team #daily-sync and #team again #area/infra"),
            vec!["#team", "#daily-sync", "#area/infra"]
        );
        assert!(extract_tags("## Notes").is_empty());
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert_eq!(extract_tags("#Team #team"), vec!["#Team", "#team"]);
    }

    #[test]
    fn tags_inside_code_are_still_tags() {
        assert_eq!(extract_tags("`#not-really`"), vec!["#not-really"]);
    }

    #[test]
    fn headings() {
        assert_eq!(
            parse_heading("### Standup #team"),
            Some(Heading {
                level: 3,
                text: "Standup #team"
            })
        );
        assert_eq!(
            parse_heading("  ## Notes  "),
            Some(Heading {
                level: 2,
                text: "Notes"
            })
        );
        assert_eq!(parse_heading("##"), Some(Heading { level: 2, text: "" }));
        assert_eq!(parse_heading("#tag at line start"), None);
        assert_eq!(parse_heading("####### seven"), None);
        assert_eq!(parse_heading("plain"), None);
    }

    #[test]
    fn heading_title_strips_tags() {
        assert_eq!(heading_title("Standup #team #daily-sync"), "Standup");
        assert_eq!(heading_title("Project  #x Alpha"), "Project Alpha");
        assert_eq!(heading_title("#only-tags"), "");
    }

    #[test]
    fn open_todos() {
        assert_eq!(
            open_todo_text("- [ ] Follow up with design team "),
            Some("Follow up with design team")
        );
        assert_eq!(open_todo_text("    * [ ] nested"), Some("nested"));
        assert_eq!(open_todo_text("- [x] done"), None);
        assert_eq!(open_todo_text("- [ ]   "), None);
        assert_eq!(open_todo_text("[ ] no bullet"), None);
    }

    #[test]
    fn wikilinks() {
        assert_eq!(
            wikilink_targets("see [[2024-01-15|standup]] and [[_daily/2024-01-16#Notes]]"),
            vec!["2024-01-15", "_daily/2024-01-16"]
        );
        assert!(wikilink_targets("broken [[ link").is_empty());
        assert!(wikilink_targets("[[|alias]]").is_empty());
    }
}
