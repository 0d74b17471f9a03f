//! VoiceDrawer - terminal harness
//!
//! Mounts a drawer controller on the simulated platform. Each stdin line
//! is spoken to the simulated recognizer, except for these commands:
//! `:tap`, `:flip`, `:listen`, `:dismiss`, `:quit`.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use voicedrawer::config::Config;
use voicedrawer::platform::sim::{SimCameraEngine, SimPermissions, SimSpeechEngine};
use voicedrawer::platform::{CameraSlot, Platform, SpeechSlot};
use voicedrawer::DrawerController;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON config override file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Answer the microphone prompt with "deny"
    #[arg(long)]
    deny_microphone: bool,

    /// Answer the camera prompt with "deny"
    #[arg(long)]
    deny_camera: bool,

    /// Simulate a device without a speech recognizer
    #[arg(long)]
    no_speech: bool,

    /// Simulate a platform that grants permissions without prompting
    #[arg(long)]
    implicit_permissions: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let level = if verbose { Level::DEBUG } else { Level::INFO };
        let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("🗄️ VoiceDrawer v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load(args.config.as_deref())?;

    let speech = SimSpeechEngine::new(!args.no_speech);
    let speaker = speech.speaker();
    let platform = Platform::new(
        SimPermissions {
            microphone: !args.deny_microphone,
            camera: !args.deny_camera,
            implicit: args.implicit_permissions,
        },
        SpeechSlot::speech(speech),
        CameraSlot::camera(SimCameraEngine::new()),
    );

    let mut handle = DrawerController::spawn(config.clone(), platform)?;

    // Print every snapshot change until the controller goes away
    let mut updates = handle.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_notice = 0;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            println!("{}", snapshot.summary());
            if let Some(notice) = snapshot.notice.filter(|n| n.id > last_notice) {
                last_notice = notice.id;
                println!("⚠️  {}", notice.message);
            }
        }
    });

    info!(
        "✅ Ready - say '{}' or '{}', or type :tap :flip :listen :dismiss :quit",
        config.open_phrase, config.close_phrase
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            ":quit" => break,
            ":tap" => handle.on_drawer_toggle_tap(),
            ":flip" => handle.on_camera_flip_tap(),
            ":listen" => handle.on_listen_tap(),
            ":dismiss" => handle.dismiss_notice(),
            text => {
                if !speaker.say(text) {
                    warn!("Recognizer is not listening, '{}' was not heard", text);
                }
            }
        }
    }

    handle.unmount().await;
    printer.await?;
    info!("👋 VoiceDrawer stopped");
    Ok(())
}
