use chrono::Local;
use clap::Parser;
use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use log::info;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use typeahead_core::core::engine::{DEFAULT_MAX_MISTAKES, DEFAULT_SUGGESTION_LIMIT};
use typeahead_core::loader::{load_path, sample_skills};
use typeahead_core::{SkillVocabulary, Typeahead, TypeaheadConfig};

const PROMPT: &str = ">>> ";

/// Suggest skills while you type
#[derive(Parser)]
struct Cli {
    /// Word list (one skill per line, optional tab-separated frequency) or JSON array of skills.
    /// Uses a small built-in vocabulary when omitted.
    #[arg(long)]
    vocab: Option<PathBuf>,
    /// Print the suggestions for this input and exit
    #[arg(long)]
    query: Option<String>,
    /// Print suggestions as a JSON array
    #[arg(long)]
    json: bool,
    /// Suggestions shown for a matched prefix
    #[arg(long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
    limit: usize,
    /// Mistyped letters corrected before falling back
    #[arg(long, default_value_t = DEFAULT_MAX_MISTAKES)]
    max_mistakes: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("LOG_LEVEL", "warn"))
        .format(|buf, record| {
            let level_style = buf.default_level_style(record.level()).bold();
            writeln!(
                buf,
                "{}|{level_style}{:7}{level_style:#}|{:10}| {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let vocab = match &args.vocab {
        Some(path) => load_path(path)?,
        None => SkillVocabulary::build(sample_skills())?,
    };
    info!(
        "Vocabulary: {} skills, longest {} characters, {} distinct characters",
        vocab.len(),
        vocab.max_length(),
        vocab.characters().len()
    );

    let config = TypeaheadConfig {
        max_mistakes: args.max_mistakes,
        suggestion_limit: args.limit,
        ..TypeaheadConfig::default()
    };
    let typeahead = Typeahead::with_config(&vocab, config);

    if let Some(query) = &args.query {
        print_suggestions(&typeahead.suggest(query), args.json)?;
        return Ok(());
    }

    println!("Input something to test the typeahead ([Tab] complete, [Enter] accept, [Esc] quit)");
    if let Some(line) = run_prompt(&typeahead)? {
        println!("{}", line);
    }
    Ok(())
}

fn print_suggestions(suggestions: &[String], json: bool) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string(suggestions)?)?;
    } else {
        for word in suggestions {
            writeln!(stdout, "{}", word)?;
        }
    }
    Ok(())
}

/// Leaves raw mode when dropped, so errors can't strand the terminal.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

enum Action {
    Continue,
    Accept,
    Quit,
}

/// Re-suggests on every keystroke. Returns the accepted line, if any.
fn run_prompt(typeahead: &Typeahead) -> io::Result<Option<String>> {
    let _raw = RawMode::enable()?;
    let mut stdout = io::stdout();
    let mut input = String::new();
    let mut selected = 0;

    loop {
        let suggestions = typeahead.suggest(&input);
        selected = selected.min(suggestions.len().saturating_sub(1));
        render(&mut stdout, &input, &suggestions, selected)?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        let action = handle_key(key, &mut input, &mut selected, &suggestions);
        if let Action::Continue = action {
            continue;
        }
        // Drop the candidate list before leaving the prompt line.
        render(&mut stdout, &input, &[], 0)?;
        queue!(stdout, Print("\r\n"))?;
        stdout.flush()?;
        return Ok(match action {
            Action::Accept => Some(input),
            _ => None,
        });
    }
}

fn handle_key(key: KeyEvent, input: &mut String, selected: &mut usize, suggestions: &[String]) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::Continue;
    }
    match key.code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
        KeyCode::Enter => return Action::Accept,
        // Completions replace everything typed so far.
        KeyCode::Tab => {
            if let Some(choice) = suggestions.get(*selected) {
                *input = choice.clone();
                *selected = 0;
            }
        }
        KeyCode::Up => *selected = selected.saturating_sub(1),
        KeyCode::Down => {
            if *selected + 1 < suggestions.len() {
                *selected += 1;
            }
        }
        KeyCode::Backspace => {
            input.pop();
            *selected = 0;
        }
        KeyCode::Char(c) => {
            input.push(c);
            *selected = 0;
        }
        _ => {}
    }
    Action::Continue
}

fn render(out: &mut impl Write, input: &str, suggestions: &[String], selected: usize) -> io::Result<()> {
    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::FromCursorDown),
        Print(PROMPT),
        Print(input)
    )?;
    for (i, word) in suggestions.iter().enumerate() {
        queue!(out, Print("\r\n  "))?;
        if i == selected {
            queue!(out, Print(word.clone().reverse()))?;
        } else {
            queue!(out, Print(word))?;
        }
    }
    if !suggestions.is_empty() {
        queue!(out, MoveUp(suggestions.len() as u16))?;
    }
    let column = PROMPT.chars().count() + input.chars().count();
    queue!(out, MoveToColumn(column as u16))?;
    out.flush()
}
