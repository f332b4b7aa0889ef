/// Panel interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal mode — browse the note list.
    #[default]
    Normal,
    /// Focus in the related-notes list of the selected note.
    Related,
    /// Fuzzy heading filter (`/` prefix).
    Filter,
    /// Command line (`:` prefix).
    Command,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Related => "RELATED",
            Mode::Filter => "FILTER",
            Mode::Command => "COMMAND",
        }
    }
}
