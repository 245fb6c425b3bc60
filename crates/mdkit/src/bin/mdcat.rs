//! Renders a Markdown file to standard output.
use std::fs;
use std::io;
use std::io::IsTerminal;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::bail;
use clap::Parser;
use mdkit::Document;
use mdkit::Renderer;
use mdkit::RendererOptions;
use mdkit::core::theme::Theme;
use mdkit::markdown::render::Geometry;
use mdkit::markdown::render::ImageEncoderKind;
use tracing_subscriber::EnvFilter;

/// Render Markdown with colours, wrapping and inline images.
#[derive(Parser)]
#[command(name = "mdcat", version, about)]
struct Cli {
    /// Wrap width in columns; `0` disables wrapping. Defaults to the terminal width.
    #[arg(short, long)]
    width: Option<usize>,

    /// Draw images inline. Defaults to on when writing to a terminal.
    #[arg(short, long, value_name = "BOOL")]
    images: Option<bool>,

    /// Show link text only, without destinations.
    #[arg(short = 'H', long)]
    hyperlinks: bool,

    /// Do not pad lines with spaces up to the wrap width.
    #[arg(long)]
    no_pad: bool,

    /// Colour theme (`pulumi` or `none`). Giving one forces colour on a pipe.
    #[arg(long)]
    theme: Option<String>,

    /// Markdown file to render.
    path: PathBuf,
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
    let options = options(&cli)?;
    tracing::debug!(
        width = options.word_wrap,
        themed = options.theme.is_some(),
        images = options.images.enabled,
        "rendering"
    );

    let doc = Document::parse(&source);
    let renderer = Renderer::new(options).with_highlighter(mdkit::default_highlighter());
    let mut out = io::BufWriter::new(io::stdout().lock());
    renderer
        .render(&mut out, &doc)
        .with_context(|| format!("failed to render {}", cli.path.display()))?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

fn options(cli: &Cli) -> anyhow::Result<RendererOptions> {
    let tty = io::stdout().is_terminal();
    let theme = match cli.theme.as_deref() {
        None if tty => Some(Theme::pulumi()),
        None | Some("none") => None,
        Some(name) => match Theme::by_name(name) {
            Some(theme) => Some(theme),
            None => bail!("unknown theme {name:?}"),
        },
    };

    let geometry = geometry();
    let word_wrap = cli.width.unwrap_or(usize::from(geometry.columns));

    let mut options = RendererOptions {
        theme,
        word_wrap,
        soft_break: word_wrap != 0,
        hyperlinks: cli.hyperlinks,
        pad: !cli.no_pad,
        geometry,
        ..RendererOptions::default()
    };
    options.images.enabled = cli.images.unwrap_or(tty);
    options.images.content_root = content_root(&cli.path);
    if word_wrap != 0 {
        options.images.max_width = word_wrap;
    }
    options.images.encoder = match std::env::var("TERM") {
        Ok(term) if term == "xterm-kitty" => ImageEncoderKind::Kitty,
        _ => ImageEncoderKind::HalfBlock,
    };
    Ok(options)
}

/// Terminal size in cells and pixels; zeros when stdout is not a terminal.
fn geometry() -> Geometry {
    match crossterm::terminal::window_size() {
        Ok(size) => Geometry {
            columns: size.columns,
            rows: size.rows,
            pixel_width: u32::from(size.width),
            pixel_height: u32::from(size.height),
        },
        Err(error) => {
            tracing::debug!(%error, "no terminal size");
            let (columns, rows) = crossterm::terminal::size().unwrap_or((0, 0));
            Geometry {
                columns,
                rows,
                ..Geometry::default()
            }
        }
    }
}

fn content_root(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
