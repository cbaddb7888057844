use std::io::{self, Write};

/// The two audio cues of the timer: one when work begins, one when a rest
/// begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Start,
    Finish,
}

/// Something that can sound a cue. Playback is fire-and-forget: the engine
/// never learns whether it happened, and a failing player must not surface
/// errors into the timer.
pub trait CuePlayer {
    fn play(&mut self, cue: Cue);
}

/// Plays cues as terminal bells: one BEL for the start cue, two for the
/// finish cue. Write errors are swallowed here, not propagated.
pub struct TerminalBell<W: Write = io::Stdout> {
    out: W,
}

impl TerminalBell {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> CuePlayer for TerminalBell<W> {
    fn play(&mut self, cue: Cue) {
        let bells: &[u8] = match cue {
            Cue::Start => b"\x07",
            Cue::Finish => b"\x07\x07",
        };
        let _ = self.out.write_all(bells);
        let _ = self.out.flush();
    }
}

/// Player for muted runs; drops every cue.
#[derive(Debug, Default)]
pub struct SilentCue;

impl CuePlayer for SilentCue {
    fn play(&mut self, _cue: Cue) {}
}
