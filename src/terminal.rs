//! Raw-mode terminal lifecycle shared by the flows.

use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;

use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};

pub type SessionTerminal = Terminal<CrosstermBackend<Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Enter the alternate screen in raw mode and hand back the terminal.
pub fn init() -> io::Result<SessionTerminal> {
    PANIC_HOOK.call_once(install_panic_hook);
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

/// Leave raw mode and the alternate screen. Both steps are attempted even
/// when the first fails; the flows run this on every exit path, before any
/// store flushing, so a draw error still gives the shell back.
pub fn restore() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = io::stdout().execute(LeaveAlternateScreen).map(|_| ());
    raw.and(screen)
}

/// Leave the terminal usable when a panic unwinds past a draw loop.
fn install_panic_hook() {
    let original = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore();
        original(info);
    }));
}
