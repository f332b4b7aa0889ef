use super::Engine;
use crate::model::note::MeetingNote;
use crate::vault::Vault;

impl<V: Vault> Engine<'_, V> {
    /// Other notes sharing at least one tag, most shared tags first, then newest.
    pub fn related_notes(&self, note: &MeetingNote) -> Vec<MeetingNote> {
        if note.tags.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, MeetingNote)> = self
            .parse_all()
            .into_iter()
            .filter(|other| !other.same_position(note))
            .filter_map(|other| {
                let shared = note.shared_tag_count(&other);
                (shared > 0).then_some((shared, other))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.date_key.cmp(&a.1.date_key)));
        scored.into_iter().map(|(_, other)| other).collect()
    }
}
