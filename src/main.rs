//! CLI entry point for `mailreply`.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use mailreply::config::{self, Config};
use mailreply::parser::{body, source};
use mailreply::{preview, ReplyComposer, ThreadingMode};

#[derive(Parser)]
#[command(
    name = "mailreply",
    version,
    about = "Resolve message bodies and compose threaded replies from provider message files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the best textual body of a message
    Body {
        /// Provider JSON document or raw .eml file
        path: PathBuf,
        /// Skip parts with malformed base64 instead of decoding them best-effort
        #[arg(long)]
        strict: bool,
    },
    /// Print list previews (id, subject, body) for one or more messages
    Preview {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
        /// Reduce HTML bodies to plain text
        #[arg(long)]
        strip_html: bool,
    },
    /// Compose a reply and print the provider send request
    Reply {
        /// The message being replied to
        path: PathBuf,
        /// Reply text
        #[arg(long, required_unless_present = "body_file", conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the reply text from a file ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        body_file: Option<PathBuf>,
        /// Threading strategy for In-Reply-To / References
        #[arg(long, value_enum)]
        threading: Option<ThreadingMode>,
        /// Value of the From header
        #[arg(long)]
        from: Option<String>,
        /// Print the unencoded RFC 5322 message instead of the send request
        #[arg(long)]
        raw: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Body { path, strict } => cmd_body(&path, strict, &config),
        Commands::Preview {
            paths,
            json,
            strip_html,
        } => cmd_preview(&paths, json, strip_html, &config),
        Commands::Reply {
            path,
            body,
            body_file,
            threading,
            from,
            raw,
        } => {
            let text = match (body, body_file) {
                (Some(text), _) => text,
                (None, Some(file)) => read_body_file(&file)?,
                (None, None) => anyhow::bail!("A reply body is required (--body or --body-file)"),
            };
            cmd_reply(&path, &text, threading, from, raw, &config)
        }
        Commands::Config { init } => cmd_config(&config, init),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailreply.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Resolve and print the body of a message.
fn cmd_body(path: &Path, strict: bool, config: &Config) -> anyhow::Result<()> {
    let parsed = source::load_message(path)?;

    let mut options = config.resolve.options();
    options.strict |= strict;

    let text = body::resolve_required(&parsed.root, &options)?;
    println!("{text}");
    Ok(())
}

/// Print previews for each message file.
fn cmd_preview(
    paths: &[PathBuf],
    json: bool,
    strip_html: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut preview_config = config.preview.clone();
    preview_config.strip_html |= strip_html;
    let options = config.resolve.options();

    let mut previews = Vec::with_capacity(paths.len());
    for path in paths {
        let parsed = source::load_message(path)?;
        previews.push(preview::build_preview(
            &parsed.original.id,
            &parsed.original.headers,
            &parsed.root,
            &options,
            &preview_config,
        ));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
        return Ok(());
    }

    for p in &previews {
        println!();
        println!("  {:<10} {}", "Id", p.id);
        println!("  {:<10} {}", "Subject", p.subject);
        println!();
        for line in p.body.lines() {
            println!("    {line}");
        }
    }
    println!();
    Ok(())
}

/// Compose a reply and print the send request (or the raw message).
fn cmd_reply(
    path: &Path,
    text: &str,
    threading: Option<ThreadingMode>,
    from: Option<String>,
    raw: bool,
    config: &Config,
) -> anyhow::Result<()> {
    if text.is_empty() {
        anyhow::bail!("Reply body is empty");
    }

    let parsed = source::load_message(path)?;

    let mut composer = ReplyComposer::from_config(&config.compose);
    if let Some(mode) = threading {
        composer = composer.with_threading(mode);
    }
    if let Some(from) = from {
        composer = composer.with_from(from);
    }

    if raw {
        let draft = composer.draft(&parsed.original, text)?;
        print!("{}", draft.to_rfc5322());
        return Ok(());
    }

    let encoded = composer.compose(&parsed.original, text)?;
    println!("{}", serde_json::to_string_pretty(&encoded)?);
    Ok(())
}

/// Print the effective configuration, optionally persisting it.
fn cmd_config(config: &Config, init: bool) -> anyhow::Result<()> {
    if init {
        config::save_config(config)?;
    }
    match config::config_file_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config directory available)"),
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn read_body_file(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read reply body '{}': {e}", path.display()))
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailreply", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
