use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{sleep_until, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cuecard::config::{PresentationDocument, StartMode};
use cuecard::input::{Key, KeyBindings};
use cuecard::kernel::controller::Controller;
use cuecard::kernel::reactor::{Reactor, ReactorHandle};
use cuecard::kernel::time::Millis;
use cuecard::outputs::{ConsoleRenderer, MockAudioBackend};
use cuecard::presets::{Preset, TYPEWRITER_PAIRS};
use cuecard::typewriter::{Typewriter, TypewriterFrame, TypewriterTiming};

/// Timed question/subtitle presentations in the terminal.
#[derive(Parser, Debug)]
#[command(name = "cuecard")]
#[command(about = "Run a timed, audio-synchronized presentation script in the terminal")]
struct Cli {
    /// Built-in script to run
    #[arg(long, env = "CUECARD_PRESET", default_value = "brand-questions")]
    preset: Preset,

    /// JSON script file (overrides --preset)
    #[arg(long, env = "CUECARD_SCRIPT")]
    script: Option<PathBuf>,

    /// Start playing immediately
    #[arg(long)]
    autoplay: bool,

    /// Wrap back to the first segment after the last one
    #[arg(long = "loop")]
    looping: bool,

    /// Start with audio muted
    #[arg(long)]
    muted: bool,

    /// Run the rotating headline typewriter instead of a presentation
    #[arg(long)]
    typewriter: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let shutdown = CancellationToken::new();
    spawn_ctrl_c(shutdown.clone());

    if cli.typewriter {
        return run_typewriter(shutdown).await;
    }

    let mut doc = match &cli.script {
        Some(path) => PresentationDocument::load(path)
            .with_context(|| format!("loading script {}", path.display()))?,
        None => cli
            .preset
            .document()
            .with_context(|| format!("building preset {}", cli.preset))?,
    };
    if cli.autoplay {
        doc.config.start_mode = StartMode::Autoplay;
    }
    doc.config.looping |= cli.looping;
    doc.config.start_muted |= cli.muted;

    let bindings = KeyBindings::new(doc.config.control_style);
    let renderer = ConsoleRenderer::stdout(doc.script.len());
    let audio = MockAudioBackend::new();
    let controller = Controller::new(doc.script, doc.config);
    let (mut reactor, handle) = Reactor::new(controller, renderer, audio, 64);

    let reactor_shutdown = handle.shutdown_token();
    let outer = shutdown.clone();
    tokio::spawn(async move {
        outer.cancelled().await;
        reactor_shutdown.cancel();
    });

    println!("Keys: [enter]=space  left/right  r=restart  m=mute  q=quit");
    // The input thread gets a clone: stdin closing must not end the run.
    spawn_console_input(handle.clone(), bindings);

    reactor.mount();
    reactor.run().await;
    drop(handle);

    let snapshot = reactor.controller().telemetry.snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => info!("Session telemetry:\n{}", json),
        Err(e) => error!("Failed to encode telemetry: {}", e),
    }
    Ok(())
}

fn spawn_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, stopping");
        }
        shutdown.cancel();
    });
}

// Plain thread: a pending stdin read must not hold the runtime open at exit.
fn spawn_console_input(handle: ReactorHandle, bindings: KeyBindings) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("q") {
                handle.shutdown();
                break;
            }
            let Some(command) = bindings.command_for(Key::from_console(&line)) else {
                continue;
            };
            if let Err(e) = handle.blocking_send(command) {
                error!("Failed to send command: {}", e);
                break;
            }
        }
    });
}

async fn run_typewriter(shutdown: CancellationToken) -> Result<()> {
    let mut typewriter = Typewriter::new(TYPEWRITER_PAIRS, TypewriterTiming::default())?;
    let epoch = Instant::now();
    let now = || Millis(epoch.elapsed().as_millis() as u64);

    let mut heading = String::new();
    let mut show = |frame: TypewriterFrame| {
        if frame.heading != heading {
            println!("\n# {}", frame.heading);
            heading = frame.heading;
        }
        println!("  {}", frame.text);
    };

    show(typewriter.start(now()));
    while let Some(due) = typewriter.deadline() {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep_until(epoch + Duration::from_millis(due.as_u64())) => {
                for frame in typewriter.tick(now()) {
                    show(frame);
                }
            }
        }
    }
    typewriter.stop();
    Ok(())
}
