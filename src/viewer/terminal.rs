//! Terminal backend for the viewer.
//!
//! [`TerminalSession`] puts the terminal into raw mode on the alternate
//! screen and restores it when dropped. While a session is live a panic hook
//! restores the terminal before the panic message is printed, and
//! [`CrosstermKeys`] turns SIGINT/SIGTERM into [`Key::Interrupt`] so that a
//! signal ends the session like `q` does. Frames are composed in a ratatui
//! buffer and flushed through ratatui's diffing crossterm backend.

use crate::viewer::input::{Key, KeySource};
use crate::viewer::session::ViewerError;
use crate::viewer::target::{Region, RenderError, RenderTarget, Size, Style};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, terminal,
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style as TuiStyle},
    widgets::{Block, Clear, Widget},
    Terminal,
};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::io::{self, IsTerminal, Stdout};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// How often the key reader checks for a pending signal.
const SIGNAL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Set while the alternate screen is up. Restoring is a no-op once cleared,
/// so the panic hook and `Drop` can both call it.
static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    buffer: Buffer,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen.
    pub fn start() -> Result<Self, ViewerError> {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            return Err(ViewerError::NotATerminal);
        }

        terminal::enable_raw_mode().map_err(ViewerError::Terminal)?;

        SCREEN_ACTIVE.store(true, Ordering::SeqCst);

        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide) {
            restore_terminal();
            return Err(ViewerError::Terminal(err));
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(err) => {
                restore_terminal();
                return Err(ViewerError::Terminal(err));
            }
        };

        install_panic_hook();

        Ok(Self {
            terminal,
            buffer: Buffer::empty(Rect::default()),
        })
    }

    fn check_region(&self, region: Region) -> Result<Rect, RenderError> {
        let area = self.buffer.area;
        if region.bottom() > area.height || region.right() > area.width {
            return Err(RenderError::OutOfBounds {
                row: region.bottom(),
                col: region.right(),
            });
        }
        Ok(Rect::new(region.col, region.row, region.width, region.height))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore_terminal();
        // take_hook panics on a panicking thread; the hook is harmless there
        // since the screen is already released
        if !std::thread::panicking() {
            let _ = panic::take_hook();
        }
    }
}

/// Restore the terminal before the previous hook prints the panic message.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
}

/// Clear the screen flag, reporting whether it was set.
fn release_screen() -> bool {
    SCREEN_ACTIVE.swap(false, Ordering::SeqCst)
}

fn restore_terminal() {
    if !release_screen() {
        return;
    }
    let _ = terminal::disable_raw_mode();
    let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show);
}

fn tui_style(style: Style) -> TuiStyle {
    match style {
        Style::Normal => TuiStyle::default(),
        Style::Header => TuiStyle::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        Style::Highlight => TuiStyle::default().fg(Color::Black).bg(Color::White),
        Style::Bold => TuiStyle::default().add_modifier(Modifier::BOLD),
    }
}

impl RenderTarget for TerminalSession {
    fn size(&mut self) -> Result<Size, RenderError> {
        let (width, height) = terminal::size()?;
        let area = Rect::new(0, 0, width, height);
        if self.buffer.area != area {
            self.buffer.resize(area);
        }
        Ok(Size::new(width, height))
    }

    fn write_text(
        &mut self,
        row: u16,
        col: u16,
        text: &str,
        style: Style,
    ) -> Result<(), RenderError> {
        let area = self.buffer.area;
        let len = text.chars().count() as u16;
        if row >= area.height || col.saturating_add(len) > area.width {
            return Err(RenderError::OutOfBounds { row, col });
        }
        self.buffer.set_string(col, row, text, tui_style(style));
        Ok(())
    }

    fn draw_border(&mut self, region: Region) -> Result<(), RenderError> {
        let rect = self.check_region(region)?;
        Block::bordered().render(rect, &mut self.buffer);
        Ok(())
    }

    fn clear(&mut self, region: Region) -> Result<(), RenderError> {
        let rect = self.check_region(region)?;
        Clear.render(rect, &mut self.buffer);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let buffer = &self.buffer;
        self.terminal.draw(|frame| frame.buffer_mut().merge(buffer))?;
        Ok(())
    }
}

/// Process-wide flag raised by SIGINT or SIGTERM. Registered once.
fn interrupt_flag() -> Arc<AtomicBool> {
    static FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();
    FLAG.get_or_init(|| {
        let flag = Arc::new(AtomicBool::new(false));
        for signal in [SIGINT, SIGTERM] {
            if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&flag)) {
                tracing::warn!(signal, error = %e, "failed to register signal handler");
            }
        }
        flag
    })
    .clone()
}

/// Reads keys from the terminal. Waits indefinitely for a key, but a raised
/// interrupt flag is reported as [`Key::Interrupt`] within one poll interval.
pub struct CrosstermKeys {
    interrupted: Arc<AtomicBool>,
}

impl CrosstermKeys {
    /// Keys from the terminal, with SIGINT and SIGTERM mapped to interrupts.
    pub fn new() -> Self {
        Self::with_flag(interrupt_flag())
    }

    pub fn with_flag(interrupted: Arc<AtomicBool>) -> Self {
        Self { interrupted }
    }
}

impl Default for CrosstermKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> Result<Key, ViewerError> {
        loop {
            if self.interrupted.swap(false, Ordering::Relaxed) {
                return Ok(Key::Interrupt);
            }
            if !event::poll(SIGNAL_POLL_INTERVAL).map_err(ViewerError::Input)? {
                continue;
            }
            match event::read().map_err(ViewerError::Input)? {
                Event::Key(key) if key.kind != KeyEventKind::Release => return Ok(map_key(key)),
                Event::Resize(_, _) => return Ok(Key::Resize),
                _ => continue,
            }
        }
    }
}

/// Raw mode swallows SIGINT, so Ctrl-C arrives as a key and maps to an interrupt.
pub fn map_key(key: KeyEvent) -> Key {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Key::Interrupt;
    }
    match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_key() {
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key(plain(KeyCode::Up)), Key::Up);
        assert_eq!(map_key(plain(KeyCode::Down)), Key::Down);
        assert_eq!(map_key(plain(KeyCode::Char('a'))), Key::Char('a'));
        assert_eq!(map_key(plain(KeyCode::Enter)), Key::Other);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Key::Interrupt
        );
    }

    #[test]
    fn test_raised_flag_reads_as_interrupt() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut keys = CrosstermKeys::with_flag(Arc::clone(&flag));
        assert_eq!(keys.next_key().unwrap(), Key::Interrupt);
        // The flag is consumed so the next session is not ended by the same signal
        assert!(!flag.load(Ordering::Relaxed));
    }

    #[test]
    fn test_signal_registration_shares_one_flag() {
        let a = interrupt_flag();
        let b = interrupt_flag();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_screen_released_once() {
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);
        assert!(release_screen());
        assert!(!release_screen());
        // Nothing to undo once released
        restore_terminal();
        assert!(!SCREEN_ACTIVE.load(Ordering::SeqCst));
    }

    #[test]
    fn test_styles_are_distinct() {
        assert_ne!(tui_style(Style::Highlight), tui_style(Style::Normal));
        assert_ne!(tui_style(Style::Header), tui_style(Style::Bold));
    }
}
