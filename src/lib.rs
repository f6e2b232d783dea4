// src/lib.rs
// =============================================================================
// Library half of release-notes. The binary in main.rs only parses arguments
// and decides where the rendered HTML goes; everything that talks to GitHub or
// builds notes lives here so it can be tested without a terminal.
// =============================================================================

pub mod github;
pub mod notes;
