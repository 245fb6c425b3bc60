//! Interactive Markdown reader.
//!
//! Scroll with the arrow keys, `j`/`k` and the page keys. `]`/`[` step through links,
//! `}`/`{` through headings, `Enter` follows the selected link and `q` quits. Links to
//! `#anchors` jump within the document; other destinations are shown in the status line.
//! `r` reloads the file from disk and `?` lists every key.
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use mdkit::MarkdownView;
use mdkit::core::crossterm_input::input_event_from_crossterm;
use mdkit::core::help::HelpBar;
use mdkit::core::help::HelpBarOptions;
use mdkit::core::input::InputEvent;
use mdkit::core::input::KeyCode;
use mdkit::core::keymap;
use mdkit::core::keymap::Binding;
use mdkit::core::keymap::Keymap;
use mdkit::markdown::view::MarkdownViewOptions;
use mdkit::markdown::view::ViewAction;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use tracing_subscriber::EnvFilter;

/// Read a Markdown file in the terminal.
#[derive(Parser)]
#[command(name = "mdreader", version, about)]
struct Cli {
    /// Keep long lines whole and scroll horizontally instead of wrapping.
    #[arg(long)]
    no_wrap: bool,

    /// Markdown file to read.
    path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Reload,
    Help,
}

struct App {
    path: PathBuf,
    view: MarkdownView,
    help: HelpBar,
    commands: Keymap<Command>,
    status: String,
    show_help: bool,
}

impl App {
    fn new(cli: &Cli, source: &str) -> Self {
        let options = MarkdownViewOptions {
            wrap: !cli.no_wrap,
            ..MarkdownViewOptions::default()
        };
        let mut view = MarkdownView::with_options(options);
        let name = cli.path.file_name().unwrap_or(cli.path.as_os_str());
        view.set_name(name.to_string_lossy());
        view.set_highlighter(Some(mdkit::default_highlighter()));
        view.set_markdown(source);

        let commands = Keymap::new()
            .bind(
                Binding::new("q", "quit", vec![keymap::key_char('q'), keymap::key_ctrl('c')]),
                Command::Quit,
            )
            .bind(
                Binding::new("r", "reload", vec![keymap::key_char('r')]),
                Command::Reload,
            )
            .bind(
                Binding::new("?", "help", vec![keymap::key_char('?')]),
                Command::Help,
            );
        let mut bindings: Vec<Binding> = commands.bindings().cloned().collect();
        bindings.extend(view.help_bar().bindings().iter().cloned());
        let help = match &view.options().theme {
            Some(theme) => HelpBar::with_options(bindings, HelpBarOptions::themed(theme)),
            None => HelpBar::new(bindings),
        };
        Self {
            path: cli.path.clone(),
            view,
            help,
            commands,
            status: String::new(),
            show_help: false,
        }
    }

    /// Every key the reader answers to, as `(keys, description)` rows.
    fn key_rows(&self) -> Vec<(String, String)> {
        let scroll = &self.view.options().scroll.keymap;
        self.commands
            .bindings()
            .chain(self.help.bindings().iter().skip(self.commands.bindings().count()))
            .chain(scroll.bindings())
            .map(|b| {
                let keys: Vec<String> = b.keys.iter().map(ToString::to_string).collect();
                (keys.join(" "), b.help_desc.clone())
            })
            .collect()
    }

    fn reload(&mut self) {
        match fs::read_to_string(&self.path) {
            Ok(source) => {
                self.view.set_markdown(&source);
                self.status = "reloaded".to_string();
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "reload failed");
                self.status = format!("reload failed: {error}");
            }
        }
    }

    /// Returns `true` when the reader should exit.
    fn handle(&mut self, event: InputEvent) -> bool {
        if self.show_help {
            if let InputEvent::Key(key) = &event
                && (key.code == KeyCode::Esc || self.commands.action(key) == Some(Command::Help))
            {
                self.show_help = false;
            }
            return false;
        }
        if let InputEvent::Key(key) = &event
            && let Some(command) = self.commands.action(key)
        {
            match command {
                Command::Quit => return true,
                Command::Reload => {
                    self.reload();
                    return false;
                }
                Command::Help => {
                    self.show_help = true;
                    return false;
                }
            }
        }
        match self.view.handle_event_action(event) {
            ViewAction::Open(destination) => {
                tracing::info!(%destination, "open link");
                self.status = format!("link: {destination}");
            }
            ViewAction::Redraw => {
                self.status = self
                    .view
                    .selected_destination()
                    .map(str::to_owned)
                    .unwrap_or_default();
            }
            ViewAction::None => {}
        }
        false
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let [body, status, help] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(f.area());

        let buf = f.buffer_mut();
        self.view.render_ref(body, buf);
        mdkit::core::render::render_str_clipped(
            status.x,
            status.y,
            0,
            status.width,
            buf,
            &self.status,
            Style::default().add_modifier(Modifier::DIM),
        );
        self.help.render_ref(help, buf);

        if self.show_help {
            self.draw_help(f, body);
        }
    }

    fn draw_help(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = self.key_rows();
        let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        let lines: Vec<Line<'_>> = rows
            .into_iter()
            .map(|(keys, desc)| {
                Line::from(vec![
                    Span::styled(
                        format!("{keys:>key_width$}"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::raw(desc),
                ])
            })
            .collect();
        let width = lines
            .iter()
            .map(Line::width)
            .max()
            .unwrap_or(0)
            .saturating_add(2)
            .min(usize::from(area.width));
        let height = (lines.len() + 2).min(usize::from(area.height));
        let popup = centered(area, width as u16, height as u16);

        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(lines).block(Block::default().title(" Keys ").borders(Borders::ALL)),
            popup,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_env("MDKIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let source = fs::read_to_string(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let mut app = App::new(&cli, &source);

    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    res
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|f| app.draw(f))?;
            dirty = false;
        }

        if crossterm::event::poll(Duration::from_millis(250))?
            && let Some(event) = input_event_from_crossterm(crossterm::event::read()?)
        {
            if app.handle(event) {
                return Ok(());
            }
            dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdkit::core::input::KeyEvent;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    const DOC: &str = "# Title\n\nSee [docs](https://x.dev) and [below](#more).\n\n## More\n\nend\n";

    fn app() -> App {
        let cli = Cli::parse_from(["mdreader", "notes.md"]);
        App::new(&cli, DOC)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle(InputEvent::Key(KeyEvent::new(code)))
    }

    #[test]
    fn quits_on_q() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Down));
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn selected_links_show_in_the_status_line() {
        let mut app = app();
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.status, "https://x.dev");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status, "link: https://x.dev");
    }

    #[test]
    fn reload_failure_is_reported() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Char('r')));
        assert!(app.status.starts_with("reload failed"));
        assert_eq!(app.view.markdown(), DOC);
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(app.show_help);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn key_rows_cover_commands_navigation_and_scrolling() {
        let rows = app().key_rows();
        assert_eq!(rows[0], ("q ctrl+c".to_string(), "quit".to_string()));
        assert!(rows.iter().any(|(k, d)| k == "]" && d == "next link"));
        assert!(rows.iter().any(|(k, d)| k == "pgdown ctrl+f space" && d == "page down"));
    }

    #[test]
    fn draws_body_status_and_help() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let row = |y: u16| -> String {
            (0..40).map(|x| buf[(x, y)].symbol().to_string()).collect()
        };
        assert!(row(0).starts_with("# Title"));
        assert!(row(7).starts_with("q quit"));
    }
}
