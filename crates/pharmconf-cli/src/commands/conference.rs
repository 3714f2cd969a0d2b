//! Conference command - interactive item-by-item review over stdin.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use pharmconf_core::conference::{Classification, ConferenceSession};
use pharmconf_core::error::{PharmconfError, SessionError};
use pharmconf_core::models::config::PharmconfConfig;
use pharmconf_core::report::render_text_review;
use pharmconf_core::workflow::{enter_conference_mode, generate_report};

use super::config::load_config;
use super::load_order;

/// Shown when there is nothing to review.
pub const EMPTY_ORDER_MESSAGE: &str = "Nenhuma lista de medicamentos carregada.";

const HELP: &str = "\
Commands:
  next, n           go to the next item
  prev, p           go to the previous item
  set, s <text>     record the available quantity (no text clears it)
  show              show the current item
  summary           show progress and classification counts
  list              list every item with its status
  report [path]     write the audit report PDF
  help              show this help
  quit, q           end the conference";

/// Arguments for the conference command.
#[derive(Args)]
pub struct ConferenceArgs {
    /// Input file (PDF, or text with --text-input)
    #[arg(required = true)]
    input: PathBuf,

    /// Treat the input as already extracted UTF-8 text
    #[arg(long)]
    text_input: bool,

    /// Write the audit report here when the conference ends
    #[arg(short, long)]
    report: Option<PathBuf>,
}

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Next,
    Previous,
    Set(String),
    Show,
    Summary,
    List,
    Report(Option<PathBuf>),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse an input line; `None` for blank lines.
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_start();
        if line.trim().is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Previous,
            // The text is kept as typed; classification trims it.
            "set" | "s" => Self::Set(rest.to_string()),
            "show" => Self::Show,
            "summary" => Self::Summary,
            "list" => Self::List,
            "report" => {
                let path = rest.trim();
                Self::Report((!path.is_empty()).then(|| PathBuf::from(path)))
            }
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }
}

pub async fn run(args: ConferenceArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let order = load_order(&args.input, args.text_input, &config)?;

    let session = match enter_conference_mode(order) {
        Ok(session) => session,
        Err(PharmconfError::Session(SessionError::NothingLoaded)) => {
            anyhow::bail!(EMPTY_ORDER_MESSAGE)
        }
        Err(e) => return Err(e.into()),
    };

    info!("Starting conference of {} items", session.total());

    let pb = ProgressBar::new(session.total() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut repl = Repl::new(session, &config, pb);
    repl.run(stdin.lock(), stdout.lock())?;

    let session = repl.finish();
    if let Some(path) = &args.report {
        write_report(&session, &config, path)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            path.display()
        );
    }

    Ok(())
}

fn write_report(
    session: &ConferenceSession,
    config: &PharmconfConfig,
    path: &Path,
) -> anyhow::Result<()> {
    let report = generate_report(session, config)?;
    fs::write(path, &report.bytes)?;
    debug!("Wrote {} bytes of {} to {}", report.bytes.len(), report.mime_type, path.display());
    Ok(())
}

/// Read-eval-print loop over a conference session.
struct Repl<'a> {
    session: ConferenceSession,
    config: &'a PharmconfConfig,
    pb: ProgressBar,
}

impl<'a> Repl<'a> {
    fn new(session: ConferenceSession, config: &'a PharmconfConfig, pb: ProgressBar) -> Self {
        Self { session, config, pb }
    }

    /// Process commands until `quit` or end of input.
    fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> anyhow::Result<()> {
        writeln!(out, "{}", HELP)?;
        writeln!(out)?;
        self.show(&mut out)?;

        for line in input.lines() {
            let Some(command) = Command::parse(&line?) else {
                continue;
            };
            debug!("Conference command: {:?}", command);

            match command {
                Command::Next => {
                    if !self.session.next() {
                        writeln!(out, "{}", style("Already at the last item.").yellow())?;
                    }
                    self.show(&mut out)?;
                }
                Command::Previous => {
                    if !self.session.previous() {
                        writeln!(out, "{}", style("Already at the first item.").yellow())?;
                    }
                    self.show(&mut out)?;
                }
                Command::Set(text) => {
                    self.session.set_current_available(text);
                    self.show(&mut out)?;
                }
                Command::Show => self.show(&mut out)?,
                Command::Summary => self.print_summary(&mut out)?,
                Command::List => write!(out, "{}", render_text_review(self.session.order()))?,
                Command::Report(path) => {
                    let path = path.unwrap_or_else(|| PathBuf::from(&self.config.report.file_name));
                    match write_report(&self.session, self.config, &path) {
                        Ok(()) => writeln!(
                            out,
                            "{} Report written to {}",
                            style("✓").green(),
                            path.display()
                        )?,
                        Err(e) => writeln!(out, "{} {}", style("✗").red(), e)?,
                    }
                }
                Command::Help => writeln!(out, "{}", HELP)?,
                Command::Quit => break,
                Command::Unknown(word) => {
                    writeln!(out, "Unknown command '{}'. Type 'help' for the list.", word)?
                }
            }
        }

        self.print_summary(&mut out)?;
        Ok(())
    }

    fn finish(self) -> ConferenceSession {
        self.pb.finish_and_clear();
        self.session
    }

    fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let summary = self.session.summary();
        let item = self.session.current();
        let class = self.session.current_classification();

        self.pb.set_position(summary.position as u64 + 1);
        self.pb.set_message(format!("{}%", summary.progress_percent));

        writeln!(out, "{} {}", style(format!("Item {}:", summary.label())).bold(), item.name)?;
        writeln!(out, "  Lote: {} | Und.: {}", item.batch_lot, item.unit)?;
        writeln!(
            out,
            "  Solicitado: {} | Disponível: {} [{}]",
            item.quantity_requested,
            item.available_display(),
            styled_label(class)
        )?;
        Ok(())
    }

    fn print_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let summary = self.session.summary();
        let counts = self.session.counts();

        writeln!(out, "Progresso: {} ({}%)", summary.label(), summary.progress_percent)?;
        writeln!(
            out,
            "Completos: {} | Parciais: {} | Zerados: {} | Pendentes: {}",
            counts.complete, counts.partial, counts.zero, counts.unset
        )?;
        Ok(())
    }
}

fn styled_label(class: Classification) -> console::StyledObject<&'static str> {
    let label = style(class.label());
    match class {
        Classification::Unset => label.dim(),
        Classification::Zero => label.red(),
        Classification::Partial => label.yellow(),
        Classification::Complete => label.green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmconf_core::models::order::{LineItem, Order, OrderHeader};

    fn session() -> ConferenceSession {
        let item = |sequence: u64, name: &str, requested: u64| LineItem {
            sequence,
            active_ingredient_code: 100 + sequence,
            name: name.to_string(),
            batch_lot: format!("L{}", sequence),
            unit: "CP".to_string(),
            quantity_requested: requested,
            quantity_available: String::new(),
        };
        let order = Order::new(
            OrderHeader::default(),
            vec![item(1, "DIPIRONA", 10), item(2, "OMEPRAZOL", 5), item(3, "SORO", 2)],
        );
        ConferenceSession::start(order).unwrap()
    }

    fn run_script(script: &str) -> (ConferenceSession, String) {
        let config = PharmconfConfig::default();
        let mut repl = Repl::new(session(), &config, ProgressBar::hidden());
        let mut out = Vec::new();
        repl.run(script.as_bytes(), &mut out).unwrap();
        (repl.finish(), String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("n"), Some(Command::Next));
        assert_eq!(Command::parse("  PREV"), Some(Command::Previous));
        assert_eq!(Command::parse("set  7 "), Some(Command::Set(" 7 ".to_string())));
        assert_eq!(Command::parse("s"), Some(Command::Set(String::new())));
        assert_eq!(Command::parse("report"), Some(Command::Report(None)));
        assert_eq!(
            Command::parse("report out.pdf"),
            Some(Command::Report(Some(PathBuf::from("out.pdf"))))
        );
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse("jump 3"), Some(Command::Unknown("jump".to_string())));
    }

    #[test]
    fn test_review_script() {
        let (session, out) = run_script("set 10\nn\ns 2\nn\ns 0\nn\nq\n");

        assert_eq!(session.position(), 2);
        let counts = session.counts();
        assert_eq!((counts.complete, counts.partial, counts.zero, counts.unset), (1, 1, 1, 0));
        assert!(out.contains("Already at the last item."));
        assert!(out.contains("Completos: 1 | Parciais: 1 | Zerados: 1 | Pendentes: 0"));
    }

    #[test]
    fn test_set_without_text_clears() {
        let (session, _) = run_script("s 4\ns\n");
        assert_eq!(session.current().quantity_available, "");
        assert_eq!(session.current_classification(), Classification::Unset);
    }

    #[test]
    fn test_prev_at_start_is_noop() {
        let (session, out) = run_script("p\n");
        assert_eq!(session.position(), 0);
        assert!(out.contains("Already at the first item."));
    }

    #[test]
    fn test_eof_ends_session() {
        let (session, out) = run_script("n\n");
        assert_eq!(session.position(), 1);
        assert!(out.contains("Progresso: 2 de 3 (66%)"));
    }

    #[test]
    fn test_list_shows_every_item() {
        let (_, out) = run_script("s abc\nlist\n");
        assert!(out.contains("1. DIPIRONA"));
        assert!(out.contains("Disponível: abc [Pendente]"));
        assert!(out.contains("3. SORO"));
    }
}
