use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use core_feed::{
    channel, load_inspector_config, load_inspector_config_from_env, project, read_batch,
    roster_lines, view_title, FeedConsumer, InspectorConfig, ReconnectPolicy, Session,
    ViewSelector, ViewWindow,
};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};

mod app;
mod ui;

use app::InspectorApp;

const ACTION_COLUMN_WIDTH: usize = 30;

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Braid fingerprint inspector", long_about = None)]
struct Cli {
    /// WebSocket endpoint publishing fingerprint snapshots.
    #[arg(long)]
    endpoint: Option<String>,
    /// Initial view: `global`, `g`, `0`, or a seat number 1-10.
    #[arg(long, default_value = "global")]
    view: ViewSelector,
    /// Read newline-delimited snapshots from stdin and print them instead of streaming.
    #[arg(long)]
    stdin: bool,
    /// Number of trailing steps to show.
    #[arg(long)]
    window: Option<usize>,
    /// Give up after the first disconnect.
    #[arg(long)]
    no_reconnect: bool,
    /// Inspector config file; overrides BRAID_INSPECTOR_CONFIG_PATH.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> InspectorConfig {
        let (mut config, metadata) = match &self.config {
            Some(path) => load_inspector_config(Some(path.clone())),
            None => load_inspector_config_from_env(),
        };
        if let Some(path) = metadata.path() {
            info!(path = %path.display(), "Using inspector config override");
        }
        if let Some(endpoint) = &self.endpoint {
            config.feed.endpoint = endpoint.clone();
        }
        if let Some(size) = self.window {
            config.view.window_size = size;
        }
        if self.no_reconnect {
            config.feed.reconnect = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.stdin {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .with_writer(std::io::stderr)
            .init();
        let config = cli.load_config();
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        return run_batch(&cli.view, &config, stdin.lock(), &mut stdout.lock());
    }

    let (log_tx, log_rx) = mpsc::channel::<String>();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_tx.clone(),
        })
        .init();

    let config = cli.load_config();
    run_live(cli.view, config, log_rx).await
}

async fn run_live(
    selector: ViewSelector,
    config: InspectorConfig,
    log_rx: mpsc::Receiver<String>,
) -> Result<()> {
    let consumer = FeedConsumer::new(
        config.feed.endpoint.clone(),
        config.feed.reconnect_policy(),
    );
    info!(
        endpoint = consumer.endpoint(),
        reconnect = !matches!(config.feed.reconnect_policy(), ReconnectPolicy::Disabled),
        "Connecting to fingerprint feed"
    );

    let (sender, receiver) = channel();
    let (shutdown_tx, mut shutdown_rx) = unbounded_channel::<()>();

    let window = config.view.window();
    let tick_interval = config.render.tick_interval();
    let max_logs = config.render.max_logs;
    let ui_handle = std::thread::spawn(move || -> Result<()> {
        let app = InspectorApp::new(
            receiver,
            shutdown_tx,
            log_rx,
            selector,
            window,
            tick_interval,
            max_logs,
        )?;
        app.run()
    });

    tokio::select! {
        _ = consumer.run(sender) => {
            warn!("Feed consumer stopped; press 'q' to exit");
            let _ = shutdown_rx.recv().await;
        }
        _ = shutdown_rx.recv() => info!("Inspector requested shutdown"),
    }

    let joined = tokio::task::spawn_blocking(move || ui_handle.join()).await?;
    joined.map_err(|_| eyre!("inspector UI thread panicked"))?
}

/// Ingest every line of `input` through a fresh session and print the
/// selected view as plain text.
fn run_batch<R: BufRead, W: Write>(
    selector: &ViewSelector,
    config: &InspectorConfig,
    input: R,
    out: &mut W,
) -> Result<()> {
    let (sender, mut receiver) = channel();
    let summary = read_batch(input, &sender)?;
    drop(sender);
    info!(
        accepted = summary.accepted,
        skipped = summary.skipped,
        "batch.read"
    );

    let mut session = Session::new();
    let report = session.drain(&mut receiver);
    if report.resets > 0 {
        info!(resets = report.resets, "batch.resets_applied");
    }

    write_projection(out, &session, selector, config.view.window())?;
    Ok(())
}

fn write_projection<W: Write>(
    out: &mut W,
    session: &Session,
    selector: &ViewSelector,
    window: ViewWindow,
) -> std::io::Result<()> {
    let history = session.history().snapshot();
    let projection = project(history, selector, window);

    writeln!(out, "{}", view_title(selector, session.registry(), &projection))?;
    writeln!(out)?;
    for line in roster_lines(session.registry()) {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    writeln!(out, "{:>6}  {:>8}  {:>10}  Action", "Step", "Writhe", "Burau")?;

    let rows = &history[history.len() - projection.len()..];
    for (index, snapshot) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:>6}  {:>8}  {:>10.4}  {}",
            projection.steps[index],
            projection.primary[index],
            projection.secondary[index],
            truncate_action(&snapshot.action)
        )?;
    }
    Ok(())
}

fn truncate_action(action: &str) -> String {
    if action.chars().count() > ACTION_COLUMN_WIDTH {
        let head: String = action.chars().take(ACTION_COLUMN_WIDTH).collect();
        format!("{head}...")
    } else {
        action.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(args: &[&str], input: &str) -> String {
        let cli = Cli::parse_from(
            std::iter::once("braid_inspector").chain(args.iter().copied()),
        );
        let config = cli.load_config();
        let mut out = Vec::new();
        run_batch(&cli.view, &config, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn long_actions_are_truncated() {
        assert_eq!(truncate_action("check"), "check");
        let long = "a".repeat(31);
        assert_eq!(truncate_action(&long), format!("{}...", "a".repeat(30)));
        assert_eq!(truncate_action(&"b".repeat(30)), "b".repeat(30));
    }

    #[test]
    fn batch_prints_global_view_of_latest_hand() {
        let input = concat!(
            r#"{"step": 0, "action": "deal", "global": {"writhe": 0, "burau": 1.0}, "#,
            r#""players": {"1": {"name": "[S1] Ann", "writhe": 0, "complexity": 0.0}}}"#,
            "\n",
            r#"{"step": 1, "action": "Ann raises", "global": {"writhe": 2, "burau": 1.5}}"#,
            "\n",
            "garbage\n",
            r#"{"step": 0, "action": "next hand", "global": {"writhe": 0, "burau": 1.0}}"#,
            "\n",
        );
        let output = batch(&["--stdin"], input);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "WATCHING: GLOBAL - next hand");
        assert_eq!(lines[2], "[G] GLOBAL VIEW");
        assert_eq!(lines[4], "[1] Ann (Seat 1)");
        assert_eq!(lines.len(), 8);
        assert!(lines[7].trim_start().starts_with('0'));
        assert!(lines[7].ends_with("next hand"));
    }

    #[test]
    fn batch_entity_view_and_window() {
        let mut input = String::new();
        for step in 0..5 {
            input.push_str(&format!(
                r#"{{"step": {step}, "action": "s{step}", "players": {{"7": {{"name": "[S3] Cy", "writhe": {step}, "complexity": 0.5}}}}}}"#
            ));
            input.push('\n');
        }
        let output = batch(&["--stdin", "--view", "3", "--window", "2"], &input);
        let lines: Vec<&str> = output.lines().collect();
        // Selector "3" names entity id "3", which never appeared.
        assert_eq!(lines[0], "WATCHING: SEAT 3 (Seat 3) - s4");
        let rows: Vec<&str> = lines.iter().skip(7).copied().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with("s3"));
        assert!(rows[1].ends_with("s4"));
    }

    #[test]
    fn batch_honours_config_window() {
        let path = std::env::temp_dir().join(format!(
            "braid_inspector_batch_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"view": {"window_size": 3}}"#).unwrap();
        let input: String = (0..6)
            .map(|step| format!("{{\"step\": {step}, \"action\": \"s{step}\"}}\n"))
            .collect();
        let config_arg = path.to_string_lossy().into_owned();
        let output = batch(&["--stdin", "--config", &config_arg], &input);
        std::fs::remove_file(&path).unwrap();

        let rows: Vec<&str> = output.lines().skip(5).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].ends_with("s3"));
        assert!(rows[2].ends_with("s5"));
    }

    #[test]
    fn batch_with_no_input_waits() {
        let output = batch(&["--stdin"], "");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "WATCHING: GLOBAL - Waiting for data...");
        assert_eq!(lines[2], "Waiting for players...");
        assert_eq!(lines.len(), 5);
    }
}
