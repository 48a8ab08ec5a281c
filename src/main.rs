use focus_playback::config::Settings;
use focus_playback::init_app_dirs;
use focus_playback::playback::FocusChange;
use focus_playback::service::{PlaybackHandle, PlaybackService};
use focus_playback::sim::{simulated_platform, SimHandles, SimOptions};
use focus_playback::ui::{Cli, ShellCommand};
use std::error::Error;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments and initialize CLI
    let cli = Cli::new();
    let args = &cli.args;

    init_app_dirs()?;

    let config_path = match &args.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => Settings::default_path(),
    };
    let mut settings = Settings::load(&config_path)?;

    // Command-line arguments win over the config file
    if let Some(level) = &args.log_level {
        settings.log_level = level.clone();
    }
    if let Some(duck) = args.duck_volume {
        settings.duck_volume = duck;
    }
    settings.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(config = %config_path.display(), "Starting playback shell");

    let (collaborators, sim) = simulated_platform(SimOptions {
        auto_prepare: true,
        probe_sources: !args.no_probe,
        ..SimOptions::default()
    });
    let (service, handle) = PlaybackService::new(collaborators, &settings);
    let service_task = tokio::spawn(service.run());

    let mut updates = handle.subscribe_updates();
    let printer = {
        let cli = Cli { args: cli.args.clone() };
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => cli.display_update(&update),
                    Err(RecvError::Lagged(missed)) => warn!(missed, "Update printer lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    };

    cli.display_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                cli.display_error(&e);
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = execute(&cli, &handle, &sim, command).await {
            cli.display_error(e.as_ref());
        }
    }

    handle.shutdown().await?;
    service_task.await?;
    drop(handle);
    printer.await?;
    Ok(())
}

async fn execute(
    cli: &Cli,
    handle: &PlaybackHandle,
    sim: &SimHandles,
    command: ShellCommand,
) -> Result<(), Box<dyn Error>> {
    match command {
        ShellCommand::Play(track) => handle.play(track).await?,
        ShellCommand::Pause => handle.pause().await?,
        ShellCommand::Seek(position_ms) => handle.seek_to(position_ms).await?,
        ShellCommand::Stop => handle.stop(true).await?,
        ShellCommand::Focus(focus) => {
            if !sim.focus.change(FocusChange::from(focus)) {
                println!("no focus listener registered");
            }
        }
        ShellCommand::Unplug => {
            if !sim.unplug.unplug() {
                println!("nothing is listening for unplug events");
            }
        }
        ShellCommand::Complete => {
            if !sim.engine.complete() {
                println!("no render engine");
            }
        }
        ShellCommand::Fail { code, extra } => {
            if !sim.engine.fail(code, extra) {
                println!("no render engine");
            }
        }
        ShellCommand::Advance(ms) => sim.engine.advance(ms),
        ShellCommand::Status => cli.display_snapshot(&handle.snapshot().await?),
        ShellCommand::Help => cli.display_help(),
        ShellCommand::Quit => {}
    }
    Ok(())
}
