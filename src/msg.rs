use crossterm::event::KeyEvent;
use std::path::PathBuf;

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Resize,

    // -- Vault
    FileChanged(PathBuf),

    // -- System
    Tick,
}
