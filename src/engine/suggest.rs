use std::collections::HashSet;

use super::Engine;
use super::text::tokenize;
use crate::model::note::{MeetingNote, TagSuggestion};
use crate::vault::Vault;

/// Points for one token against a candidate tag.
#[derive(Debug, Clone, Copy)]
struct Weights {
    whole: u32,
    part_exact: u32,
    part_overlap: u32,
}

const HEADING_WEIGHTS: Weights = Weights {
    whole: 10,
    part_exact: 15,
    part_overlap: 5,
};

const BODY_WEIGHTS: Weights = Weights {
    whole: 3,
    part_exact: 5,
    part_overlap: 1,
};

const MAX_REASON_TOKENS: usize = 3;

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// A vault tag broken down for matching: bare lowercased name and its `/`/`-` parts.
#[derive(Debug)]
struct Candidate<'t> {
    tag: &'t str,
    name: String,
    parts: Vec<String>,
}

impl<'t> Candidate<'t> {
    fn new(tag: &'t str) -> Self {
        let name = tag.trim_start_matches('#').to_lowercase();
        let parts = name
            .split(['/', '-'])
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        Self { tag, name, parts }
    }

    fn score_token(&self, token: &str, weights: Weights) -> u32 {
        let mut score = 0;
        if overlaps(&self.name, token) {
            score += weights.whole;
        }
        for part in &self.parts {
            if part == token {
                score += weights.part_exact;
            } else if overlaps(part, token) {
                score += weights.part_overlap;
            }
        }
        score
    }

    fn matches_token(&self, token: &str) -> bool {
        overlaps(&self.name, token) || self.parts.iter().any(|part| overlaps(part, token))
    }

    fn suggestion(&self, heading: &[String], body: &[String]) -> Option<TagSuggestion> {
        let score: u32 = heading
            .iter()
            .map(|token| self.score_token(token, HEADING_WEIGHTS))
            .chain(body.iter().map(|token| self.score_token(token, BODY_WEIGHTS)))
            .sum();
        if score == 0 {
            return None;
        }

        let mut seen = HashSet::new();
        let reasons: Vec<&str> = heading
            .iter()
            .chain(body)
            .map(String::as_str)
            .filter(|token| self.matches_token(token) && seen.insert(*token))
            .take(MAX_REASON_TOKENS)
            .collect();

        let reason = if reasons.is_empty() {
            "Related".to_string()
        } else {
            format!("Matches: {}", reasons.join(", "))
        };

        Some(TagSuggestion {
            tag: self.tag.to_string(),
            score,
            reason,
        })
    }
}

impl<V: Vault> Engine<'_, V> {
    /// Distinct tags used anywhere in the vault, first-seen order.
    pub fn vault_tags(&self) -> Vec<String> {
        let docs = match self.vault.list_all_documents() {
            Ok(docs) => docs,
            Err(err) => {
                tracing::warn!("cannot enumerate vault documents: {err}");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        docs.iter()
            .filter_map(|doc| self.vault.document_tags(doc))
            .flatten()
            .filter(|tag| seen.insert(tag.clone()))
            .collect()
    }

    /// Vault tags the note lacks, scored against its heading and body words.
    pub fn suggest_tags(&self, note: &MeetingNote) -> Vec<TagSuggestion> {
        let present: HashSet<String> = note.tags.iter().map(|tag| tag.to_lowercase()).collect();
        let heading_tokens = tokenize(&note.heading);
        let body_tokens = tokenize(&note.body);

        let pool = self.vault_tags();
        let mut suggestions: Vec<TagSuggestion> = pool
            .iter()
            .filter(|tag| !present.contains(&tag.to_lowercase()))
            .filter_map(|tag| Candidate::new(tag).suggestion(&heading_tokens, &body_tokens))
            .collect();

        suggestions.sort_by(|a, b| b.score.cmp(&a.score));
        suggestions.truncate(self.max_suggestions);
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::NotesConfig;
    use std::path::Path;

    use crate::vault::memory::MemoryVault;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn candidate_parts_split_on_slash_and_dash() {
        let c = Candidate::new("#Area/Daily-Sync");
        assert_eq!(c.name, "area/daily-sync");
        assert_eq!(c.parts, vec!["area", "daily", "sync"]);
    }

    #[test]
    fn heading_weights_accumulate() {
        // "design": whole overlap (10) + exact part (15)
        let c = Candidate::new("#design");
        assert_eq!(c.score_token("design", HEADING_WEIGHTS), 25);
        // "alpha" inside "project-alpha": whole (10) + exact part "alpha" (15)
        let c = Candidate::new("#project-alpha");
        assert_eq!(c.score_token("alpha", HEADING_WEIGHTS), 25);
        // "projects" overlaps part "project" (5) only
        assert_eq!(c.score_token("projects", HEADING_WEIGHTS), 5);
        assert_eq!(c.score_token("beta", HEADING_WEIGHTS), 0);
    }

    #[test]
    fn body_weights_are_lower() {
        let c = Candidate::new("#project-alpha");
        assert_eq!(c.score_token("alpha", BODY_WEIGHTS), 8);
        assert_eq!(c.score_token("projects", BODY_WEIGHTS), 1);
    }

    #[test]
    fn heading_match_beats_single_body_match() {
        let c = Candidate::new("#roadmap");
        let in_heading = c.suggestion(&tokens(&["roadmap"]), &[]).unwrap();
        let in_body = c.suggestion(&[], &tokens(&["roadmap"])).unwrap();
        assert!(in_heading.score > in_body.score);
    }

    #[test]
    fn zero_score_is_dropped() {
        let c = Candidate::new("#finance");
        assert!(c.suggestion(&tokens(&["roadmap"]), &tokens(&["design"])).is_none());
    }

    #[test]
    fn reason_lists_first_three_unique_tokens() {
        let c = Candidate::new("#api-review");
        let s = c
            .suggestion(
                &tokens(&["api", "review"]),
                &tokens(&["api", "unrelated", "reviews", "apis"]),
            )
            .unwrap();
        assert_eq!(s.reason, "Matches: api, review, reviews");
    }

    fn engine_fixture() -> MemoryVault {
        MemoryVault::new()
            .with(
                "_daily/2024-01-15.md",
                "## Notes\n### Design review #meeting\nwalked through the roadmap\n",
            )
            .with("projects.md", "#design #roadmap #Meeting #finance #design-system\n")
    }

    #[test]
    fn suggests_ranked_vault_tags_not_on_note() {
        let vault = engine_fixture();
        let config = NotesConfig::default();
        let engine = Engine::new(&vault, &config, 10);
        let note = engine
            .parse_document(Path::new("_daily/2024-01-15.md"))
            .remove(0);

        let suggestions = engine.suggest_tags(&note);
        let tags: Vec<&str> = suggestions.iter().map(|s| s.tag.as_str()).collect();

        // #Meeting is already present (case-insensitively), #finance never matches.
        assert_eq!(tags, vec!["#design", "#design-system", "#roadmap"]);
        assert_eq!(suggestions[0].score, 25);
        assert_eq!(suggestions[0].reason, "Matches: design");
        assert_eq!(suggestions[1].score, 25);
        assert_eq!(suggestions[2].score, 8);
        assert_eq!(suggestions[2].reason, "Matches: roadmap");
    }

    #[test]
    fn shortlist_is_capped() {
        let tags: Vec<String> = (0..15).map(|i| format!("#sync{i}")).collect();
        let vault = MemoryVault::new()
            .with("_daily/2024-01-15.md", "## Notes\n### Sync\n")
            .with("tags.md", &tags.join(" "));
        let config = NotesConfig::default();
        let engine = Engine::new(&vault, &config, 10);
        let note = engine
            .parse_document(Path::new("_daily/2024-01-15.md"))
            .remove(0);

        assert_eq!(engine.suggest_tags(&note).len(), 10);
    }
}
