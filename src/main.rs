//! ted - a minimal full-screen terminal text editor
//!
//! ted edits one text file at a time directly inside the terminal, with a
//! full-screen display refreshed on every keystroke.
//!
//! # Quick Start
//!
//! ```text
//! ted              # Start with an empty buffer
//! ted notes.txt    # Edit a file
//! ```
//!
//! # Keybindings
//!
//! | Key | Action |
//! |-----|--------|
//! | Ctrl+S | Save (prompts for a name on a new buffer) |
//! | Ctrl+Q | Quit (press repeatedly to discard unsaved changes) |
//! | Ctrl+F | Incremental search (arrows step between matches) |
//! | Arrows, Home, End, PgUp, PgDn | Navigation |
//! | Backspace, Delete | Delete before / under the cursor |
//! | Enter | Insert a newline |

mod buffer;
mod config;
mod core;
mod editor;
mod ui;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::buffer::{Document, RenderOpts};
use crate::config::Config;
use crate::core::input::read_key;
use crate::core::term::Terminal;
use crate::editor::{search, Editor, Outcome};
use crate::ui::Screen;

/// Version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line arguments
struct Args {
    /// File to edit; absent starts an empty buffer
    file: Option<PathBuf>,
}

fn print_version() {
    eprintln!("ted {}", VERSION);
}

fn print_help() {
    eprintln!("ted {} - a minimal full-screen terminal text editor", VERSION);
    eprintln!();
    eprintln!("Usage: ted [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keybindings:");
    eprintln!("  Ctrl+S                Save (prompts for a name on a new buffer)");
    eprintln!("  Ctrl+Q                Quit (press repeatedly to discard unsaved changes)");
    eprintln!("  Ctrl+F                Incremental search");
    eprintln!("  Arrows/Home/End       Move the cursor");
    eprintln!("  PgUp/PgDn             Move a full window");
    eprintln!("  Backspace/Delete      Delete before / under the cursor");
    eprintln!();
    eprintln!("Configuration: ~/.ted/config.toml");
    eprintln!("Log file:      ~/.ted/ted.log");
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut file = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
            arg => {
                if file.is_some() {
                    return Err("Only one file can be edited at a time".to_string());
                }
                file = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(Args { file })
}

/// Initialize logging to `~/.ted/ted.log`; the screen itself is never
/// written to by the logger
fn init_logging() {
    let log_path = config::home_dir()
        .map(|h| h.join(".ted").join("ted.log"))
        .unwrap_or_else(|| PathBuf::from("ted.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            return ExitCode::FAILURE;
        }
    };

    init_logging();
    info!("ted {} starting...", VERSION);

    let config = Config::load();

    if let Err(e) = run(args, &config) {
        // The terminal is already restored by the time we get here
        eprintln!("ted: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Set up the terminal, load the document, run the loop, and restore the
/// terminal on every exit path
fn run(args: Args, config: &Config) -> anyhow::Result<()> {
    let opts = RenderOpts {
        tab_stop: config.tab_stop,
        highlight_numbers: config.highlight_numbers,
    };

    let mut term = Terminal::new();
    term.enable_raw_mode()
        .context("failed to enable raw terminal mode")?;

    // From here on the Terminal guard restores cooked mode, even on panic
    let (rows, cols) = match term.window_size() {
        Ok(size) => size,
        Err(e) => {
            term.disable_raw_mode();
            return Err(e).context("failed to query window size");
        }
    };
    info!("window size: {}x{}", cols, rows);

    let doc = match &args.file {
        Some(path) => match Document::open(path, opts) {
            Ok(doc) => {
                info!("opened {} ({} lines)", path.display(), doc.len());
                doc
            }
            Err(e) => {
                term.disable_raw_mode();
                error!("failed to open {}: {}", path.display(), e);
                return Err(e).context(format!("failed to open {}", path.display()));
            }
        },
        None => Document::new(opts),
    };

    let mut editor = Editor::new(doc, config, rows, cols);
    editor.set_status("HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find");
    let mut screen = Screen::new();

    let result = main_loop(&mut editor, &mut term, &mut screen);

    let _ = screen.clear();
    term.disable_raw_mode();

    if let Err(ref e) = result {
        error!("fatal: {:#}", e);
    } else {
        info!("ted exiting");
    }
    result
}

/// One iteration per keystroke: refresh, read, dispatch
fn main_loop(editor: &mut Editor, term: &mut Terminal, screen: &mut Screen) -> anyhow::Result<()> {
    loop {
        screen.refresh(editor)?;
        let key = read_key(term)?;
        match editor.process_keypress(key) {
            Outcome::Continue => {}
            Outcome::Quit => break,
            Outcome::Save => editor.save(term, screen)?,
            Outcome::Find => search::find(editor, term, screen)?,
        }
    }
    Ok(())
}
