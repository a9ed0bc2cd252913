pub mod screen;

use std::io::{self, Stdout};
use std::time::Instant;

use crossterm::cursor::Show;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::controller::Controller;
use crate::output::RenderSink;

pub use screen::{draw, ScreenSink};

/// Lines moved per Up/Down key.
const SCROLL_STEP: isize = 3;

/// What a keypress asks for, independent of the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Insert(char),
    Backspace,
    ClearSearch,
    SubmitSearch,
    NextSort,
    PrevSort,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ScrollUp,
    ScrollDown,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn translate(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(Command::Quit),
        KeyCode::Char('u') if ctrl => Some(Command::ClearSearch),
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => None,
        KeyCode::Char(c) => Some(Command::Insert(c)),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Enter => Some(Command::SubmitSearch),
        KeyCode::Tab => Some(Command::NextSort),
        KeyCode::BackTab => Some(Command::PrevSort),
        KeyCode::Right | KeyCode::PageDown => Some(Command::NextPage),
        KeyCode::Left | KeyCode::PageUp => Some(Command::PrevPage),
        KeyCode::Home => Some(Command::FirstPage),
        KeyCode::End => Some(Command::LastPage),
        KeyCode::Up => Some(Command::ScrollUp),
        KeyCode::Down => Some(Command::ScrollDown),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Text typed into the search prompt. Kept apart from the controller's
/// applied term, which trails it by the debounce interval.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchBox {
    text: String,
}

impl SearchBox {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn push(&mut self, c: char) {
        self.text.push(c);
    }

    fn pop(&mut self) -> bool {
        self.text.pop().is_some()
    }

    fn clear(&mut self) -> bool {
        let changed = !self.text.is_empty();
        self.text.clear();
        changed
    }
}

/// Feeds one command to the controller. Edits arm the debounced search;
/// Enter applies it right away.
pub fn apply_command<S: RenderSink>(
    controller: &mut Controller<'_, S>,
    search: &mut SearchBox,
    command: Command,
    now: Instant,
) -> Flow {
    match command {
        Command::Insert(c) => {
            search.push(c);
            controller.on_search_input(search.text(), now);
        }
        Command::Backspace => {
            if search.pop() {
                controller.on_search_input(search.text(), now);
            }
        }
        Command::ClearSearch => {
            if search.clear() {
                controller.on_search_input(search.text(), now);
            }
        }
        Command::SubmitSearch => controller.apply_search(search.text()),
        Command::NextSort => {
            let mode = controller.state().sort_mode.next();
            controller.on_sort_change(mode);
        }
        Command::PrevSort => {
            let mode = controller.state().sort_mode.previous();
            controller.on_sort_change(mode);
        }
        Command::NextPage => {
            controller.next_page();
        }
        Command::PrevPage => {
            controller.prev_page();
        }
        Command::FirstPage => {
            controller.first_page();
        }
        Command::LastPage => {
            controller.last_page();
        }
        Command::ScrollUp => controller.sink_mut().scroll(-SCROLL_STEP),
        Command::ScrollDown => controller.sink_mut().scroll(SCROLL_STEP),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// The interactive terminal: ratatui over crossterm on stdout.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Leaves raw mode and the alternate screen. Errors are ignored so this is
/// safe to call from a panic hook or twice in a row.
pub fn restore_screen() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
}

/// Runs a cleanup closure when dropped, including during unwinding.
pub struct RestoreOnDrop<F: FnMut()> {
    cleanup: F,
}

impl<F: FnMut()> RestoreOnDrop<F> {
    pub fn new(cleanup: F) -> Self {
        Self { cleanup }
    }
}

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.cleanup)();
    }
}

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_screen();
        original(info);
    }));
}

/// Raw mode on the alternate screen. A panic restores the terminal before
/// its message is printed.
pub fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    install_panic_hook();
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

/// Runs the interactive view until the user quits. The controller must
/// not have been started yet.
pub async fn run(
    terminal: &mut Tui,
    controller: &mut Controller<'_, ScreenSink>,
    mut search: SearchBox,
) -> io::Result<()> {
    let mut events = EventStream::new();
    controller.start();

    loop {
        terminal.draw(|frame| draw(frame, controller.sink_mut(), &search))?;

        let deadline = controller.next_deadline();
        tokio::select! {
            _ = wait_until(deadline) => {
                controller.poll(Instant::now());
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        let Some(command) = translate(key) else {
                            continue;
                        };
                        let now = Instant::now();
                        if apply_command(controller, &mut search, command, now) == Flow::Quit {
                            break;
                        }
                    }
                    // Resize needs no handling; the next draw uses the new size.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                    None => break,
                }
            }
        }
    }

    tracing::debug!(search = search.text(), "interactive view closed");
    Ok(())
}

/// Shows the load failure and waits for a quit key. Nothing else is
/// interactive without a catalog.
pub async fn show_error(
    terminal: &mut Tui,
    sink: &mut ScreenSink,
    message: &str,
) -> io::Result<()> {
    sink.render_error(message);
    let search = SearchBox::default();
    let mut events = EventStream::new();
    loop {
        terminal.draw(|frame| draw(frame, sink, &search))?;
        match events.next().await {
            Some(Ok(Event::Key(key))) => match translate(key) {
                Some(Command::Quit) => break,
                Some(Command::ScrollUp) => sink.scroll(-SCROLL_STEP),
                Some(Command::ScrollDown) => sink.scroll(SCROLL_STEP),
                _ => {}
            },
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::output::PageView;
    use crate::pipeline::{PipelineOptions, SortMode};
    use std::cell::Cell;
    use std::panic::AssertUnwindSafe;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSink {
        renders: usize,
        last_titles: Vec<String>,
        scrolled: isize,
    }

    impl RenderSink for CountingSink {
        fn render(&mut self, view: &PageView<'_>) {
            self.renders += 1;
            self.last_titles = view.items.iter().map(|p| p.title.clone()).collect();
        }

        fn render_error(&mut self, _message: &str) {}

        fn scroll(&mut self, lines: isize) {
            self.scrolled += lines;
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn translates_navigation_keys() {
        assert_eq!(translate(key(KeyCode::Right)), Some(Command::NextPage));
        assert_eq!(translate(key(KeyCode::PageUp)), Some(Command::PrevPage));
        assert_eq!(translate(key(KeyCode::BackTab)), Some(Command::PrevSort));
        assert_eq!(translate(key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(translate(key(KeyCode::Char('s'))), Some(Command::Insert('s')));
        assert_eq!(
            translate(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(
            translate(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(Command::ClearSearch)
        );
        assert_eq!(
            translate(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );
        assert_eq!(translate(key(KeyCode::F(5))), None);
    }

    #[test]
    fn typing_is_debounced_until_enter() {
        let catalog = vec![Product::new("Laufschuh", 10.0), Product::new("Kaffee", 5.0)];
        let mut c = Controller::new(&catalog, PipelineOptions::default(), CountingSink::default())
            .with_debounce(Duration::from_millis(300));
        c.start();
        let mut search = SearchBox::default();
        let now = Instant::now();
        for ch in "kaf".chars() {
            apply_command(&mut c, &mut search, Command::Insert(ch), now);
        }
        assert_eq!(search.text(), "kaf");
        assert_eq!(c.sink().renders, 1);
        assert!(c.has_pending_search());

        apply_command(&mut c, &mut search, Command::SubmitSearch, now);
        assert!(!c.has_pending_search());
        assert_eq!(c.sink().last_titles, vec!["Kaffee"]);
    }

    #[test]
    fn backspace_on_empty_box_does_nothing() {
        let catalog = vec![Product::new("a", 1.0)];
        let mut c = Controller::new(&catalog, PipelineOptions::default(), CountingSink::default());
        c.start();
        let mut search = SearchBox::default();
        apply_command(&mut c, &mut search, Command::Backspace, Instant::now());
        apply_command(&mut c, &mut search, Command::ClearSearch, Instant::now());
        assert!(!c.has_pending_search());
    }

    #[test]
    fn tab_cycles_sort_and_quit_stops() {
        let catalog = vec![Product::new("a", 1.0)];
        let mut c = Controller::new(&catalog, PipelineOptions::default(), CountingSink::default());
        c.start();
        let mut search = SearchBox::default();
        apply_command(&mut c, &mut search, Command::NextSort, Instant::now());
        assert_eq!(c.state().sort_mode, SortMode::PriceAsc);
        apply_command(&mut c, &mut search, Command::PrevSort, Instant::now());
        assert_eq!(c.state().sort_mode, SortMode::Default);
        assert_eq!(
            apply_command(&mut c, &mut search, Command::Quit, Instant::now()),
            Flow::Quit
        );
    }

    #[test]
    fn arrow_keys_scroll_the_page() {
        assert_eq!(translate(key(KeyCode::Up)), Some(Command::ScrollUp));
        assert_eq!(translate(key(KeyCode::Down)), Some(Command::ScrollDown));

        let catalog: Vec<Product> = (1..=12)
            .map(|i| Product::new(format!("Deal {i:02}"), i as f64))
            .collect();
        let mut c = Controller::new(&catalog, PipelineOptions::default(), CountingSink::default());
        c.start();
        let mut search = SearchBox::default();
        apply_command(&mut c, &mut search, Command::ScrollDown, Instant::now());
        apply_command(&mut c, &mut search, Command::ScrollDown, Instant::now());
        apply_command(&mut c, &mut search, Command::ScrollUp, Instant::now());
        assert_eq!(c.sink().scrolled, SCROLL_STEP);
        assert_eq!(c.sink().renders, 1);
    }

    #[test]
    fn guard_runs_cleanup_when_unwinding() {
        let restored = Rc::new(Cell::new(false));
        let flag = Rc::clone(&restored);
        let result = std::panic::catch_unwind(AssertUnwindSafe(move || {
            let _guard = RestoreOnDrop::new(move || flag.set(true));
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert!(restored.get());
    }
}
