//! Drawer Controller
//!
//! Orchestrates permissions, speech, camera and the drawer animator.
//!
//! The controller runs as a single task and is the only writer of screen
//! state. The hosting screen talks to it through a [`ControllerHandle`]:
//! taps become messages, and state comes back as [`ScreenSnapshot`]s on a
//! watch channel.
//!
//! **Mount sequence** (strictly ordered):
//! 1. Microphone permission
//! 2. Speech availability (only if the microphone was granted)
//! 3. Camera permission, then the camera handle (only if granted)
//! 4. Transcript subscription and, with `auto_listen`, speech start

use crate::camera::CameraSession;
use crate::commands::CommandInterpreter;
use crate::config::Config;
use crate::drawer::DrawerAnimator;
use crate::error::{DrawerError, DrawerResult};
use crate::permissions::{Capability, PermissionGateway};
use crate::platform::{CameraSlot, Platform, SpeechSlot};
use crate::snapshot::{Notice, ScreenSnapshot};
use crate::speech::{ListeningState, SpeechSession, Transcript, TranscriptStream};
use futures::future::OptionFuture;
use std::collections::VecDeque;
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Messages from the hosting screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    ToggleDrawer,
    FlipCamera,
    ToggleListening,
    DismissNotice,
    Unmount,
}

/// Outcome of a mount step that may be interrupted by an unmount
enum Step<T> {
    Done(T),
    Unmounted,
}

/// Await a mount step, buffering taps and giving up on unmount
async fn step<F: Future>(
    fut: F,
    commands: &mut mpsc::UnboundedReceiver<UiCommand>,
    pending: &mut VecDeque<UiCommand>,
) -> Step<F::Output> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            biased;
            out = &mut fut => return Step::Done(out),
            cmd = commands.recv() => match cmd {
                Some(UiCommand::Unmount) | None => {
                    debug!("Unmount during mount, abandoning step");
                    return Step::Unmounted;
                }
                Some(cmd) => pending.push_back(cmd),
            },
        }
    }
}

/// Await a mount step that must not be abandoned.
/// Returns the output and whether an unmount arrived meanwhile.
async fn shielded<F: Future>(
    fut: F,
    commands: &mut mpsc::UnboundedReceiver<UiCommand>,
    pending: &mut VecDeque<UiCommand>,
) -> (F::Output, bool) {
    tokio::pin!(fut);
    let mut unmount = false;
    loop {
        tokio::select! {
            biased;
            out = &mut fut => return (out, unmount),
            cmd = commands.recv(), if !unmount => match cmd {
                Some(UiCommand::Unmount) | None => {
                    debug!("Unmount during camera open, finishing open first");
                    unmount = true;
                }
                Some(cmd) => pending.push_back(cmd),
            },
        }
    }
}

pub struct DrawerController {
    config: Config,
    interpreter: CommandInterpreter,
    permissions: PermissionGateway,
    speech_slot: SpeechSlot,
    camera_slot: CameraSlot,
    speech: Option<SpeechSession>,
    camera: Option<CameraSession>,
    transcripts: Option<TranscriptStream>,
    drawer: DrawerAnimator,
    voice_enabled: bool,
    mounted: bool,
    last_transcript: Option<Transcript>,
    notice: Option<Notice>,
    notices_sent: u64,
    snapshot: watch::Sender<ScreenSnapshot>,
}

impl DrawerController {
    /// Mount a controller on the current tokio runtime.
    ///
    /// Fails with `DrawerError::Config` before touching any device if the
    /// config would not work (for example an empty command phrase).
    pub fn spawn(config: Config, platform: Platform) -> DrawerResult<ControllerHandle> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ScreenSnapshot::default());

        let controller = Self {
            interpreter: CommandInterpreter::from_config(&config),
            drawer: DrawerAnimator::new(config.animation_duration()),
            config,
            permissions: PermissionGateway::new(platform.permissions),
            speech_slot: platform.speech,
            camera_slot: platform.camera,
            speech: None,
            camera: None,
            transcripts: None,
            voice_enabled: false,
            mounted: false,
            last_transcript: None,
            notice: None,
            notices_sent: 0,
            snapshot: snapshot_tx,
        };
        let task = tokio::spawn(controller.run(rx));

        Ok(ControllerHandle {
            commands: tx,
            snapshot: snapshot_rx,
            task: Some(task),
        })
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<UiCommand>) {
        let mut pending = VecDeque::new();

        if self.mount(&mut commands, &mut pending).await {
            let mut live = true;
            while let Some(cmd) = pending.pop_front() {
                if !self.handle(cmd).await {
                    live = false;
                    break;
                }
            }
            if live {
                self.event_loop(&mut commands).await;
            }
        }

        self.teardown();
    }

    /// Returns false if an unmount arrived before mount finished
    async fn mount(
        &mut self,
        commands: &mut mpsc::UnboundedReceiver<UiCommand>,
        pending: &mut VecDeque<UiCommand>,
    ) -> bool {
        info!("🚀 Mounting drawer controller");

        // 1. Microphone
        let Step::Done(microphone) = step(
            self.permissions.request(Capability::Microphone),
            commands,
            pending,
        )
        .await
        else {
            return false;
        };
        self.publish();

        // 2. Speech availability
        if microphone.is_granted() {
            let Step::Done(lease) = step(self.speech_slot.acquire(), commands, pending).await
            else {
                return false;
            };
            let mut session = SpeechSession::new(lease);
            let checked = step(session.check_availability(), commands, pending).await;
            self.speech = Some(session);
            let Step::Done(available) = checked else {
                return false;
            };
            if available {
                self.voice_enabled = true;
            } else {
                info!("{}, voice features hidden", DrawerError::SessionUnavailable);
            }
        } else {
            info!(
                "🎤 {}, voice features disabled",
                DrawerError::PermissionDenied(Capability::Microphone)
            );
        }
        self.publish();

        // 3. Camera
        let Step::Done(camera_status) =
            step(self.permissions.request(Capability::Camera), commands, pending).await
        else {
            return false;
        };
        self.publish();
        if camera_status.is_granted() {
            let Step::Done(lease) = step(self.camera_slot.acquire(), commands, pending).await
            else {
                return false;
            };
            let mut camera = CameraSession::new(lease);
            let (opened, unmount) =
                shielded(camera.initialize(camera_status), commands, pending).await;
            self.camera = Some(camera);
            if let Err(e) = opened {
                self.report(e);
            }
            if unmount {
                return false;
            }
        } else {
            info!(
                "📷 {}, running without camera",
                DrawerError::PermissionDenied(Capability::Camera)
            );
        }
        self.publish();

        // 4. Voice commands
        if self.voice_enabled {
            if let Some(speech) = self.speech.as_mut() {
                self.transcripts = Some(speech.subscribe());
                if self.config.auto_listen {
                    let started =
                        step(speech.start(&self.config.recognition_locale), commands, pending)
                            .await;
                    let Step::Done(started) = started else {
                        return false;
                    };
                    if let Err(e) = started {
                        self.report(e);
                    }
                }
            }
        }

        info!("✅ Drawer controller mounted (voice: {})", self.voice_enabled);
        self.mounted = true;
        self.publish();
        true
    }

    async fn event_loop(&mut self, commands: &mut mpsc::UnboundedReceiver<UiCommand>) {
        loop {
            let now = Instant::now();
            let next_frame = self
                .drawer
                .deadline()
                .map(|end| end.min(now + self.config.frame_interval()));

            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => {
                        if !self.handle(cmd).await {
                            break;
                        }
                    }
                    None => {
                        debug!("All handles dropped");
                        break;
                    }
                },
                Some(next) = OptionFuture::from(self.transcripts.as_mut().map(|s| s.next())) => {
                    match next {
                        Some(transcript) => self.on_transcript(transcript),
                        None => {
                            debug!("Transcript stream closed");
                            self.transcripts = None;
                        }
                    }
                }
                Some(()) = OptionFuture::from(next_frame.map(tokio::time::sleep_until)) => {
                    self.drawer.tick(Instant::now());
                    self.publish();
                }
            }
        }
    }

    /// Returns false when the controller should unmount
    async fn handle(&mut self, cmd: UiCommand) -> bool {
        match cmd {
            UiCommand::ToggleDrawer => {
                let open = !self.drawer.state().is_open();
                self.set_drawer(open, "tap");
            }
            UiCommand::FlipCamera => self.flip_camera().await,
            UiCommand::ToggleListening => self.toggle_listening().await,
            UiCommand::DismissNotice => self.notice = None,
            UiCommand::Unmount => return false,
        }
        self.publish();
        true
    }

    fn on_transcript(&mut self, transcript: Transcript) {
        info!("📝 Heard: '{}'", transcript.text());
        let intent = self.interpreter.interpret(&transcript);
        self.last_transcript = Some(transcript);
        if let Some(open) = intent.drawer_target() {
            self.set_drawer(open, "voice");
        }
        self.publish();
    }

    /// The single path both taps and voice commands use
    fn set_drawer(&mut self, open: bool, source: &str) {
        if self.drawer.set_open(open, Instant::now()) {
            info!("🗄️ Drawer {:?} ({})", self.drawer.state(), source);
        } else {
            debug!("Drawer already {:?}, ignoring {}", self.drawer.state(), source);
        }
    }

    async fn flip_camera(&mut self) {
        let Some(camera) = self.camera.as_mut() else {
            debug!("No camera session, ignoring flip");
            return;
        };
        if let Err(e) = camera.toggle_facing().await {
            self.report(e);
        }
    }

    async fn toggle_listening(&mut self) {
        if !self.voice_enabled {
            debug!("Voice disabled, ignoring listen toggle");
            return;
        }
        let Some(speech) = self.speech.as_mut() else {
            return;
        };
        let result = match speech.listening_state() {
            ListeningState::Idle => speech.start(&self.config.recognition_locale).await,
            ListeningState::Listening => speech.stop().await,
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    /// Resolve a failure locally: busy races are ignored, engine failures
    /// become a notice, everything else only degrades a feature.
    fn report(&mut self, err: DrawerError) {
        match err {
            DrawerError::SessionBusy(what) => warn!("⚠️ Ignoring busy session: {}", what),
            err if err.is_user_visible() => {
                error!("❌ {}", err);
                self.notices_sent += 1;
                self.notice = Some(Notice {
                    id: self.notices_sent,
                    message: err.to_string(),
                });
            }
            err => info!("{}", err),
        }
    }

    fn teardown(&mut self) {
        info!("🧹 Unmounting drawer controller");
        self.transcripts = None;
        if let Some(speech) = self.speech.take() {
            speech.dispose();
        }
        if let Some(mut camera) = self.camera.take() {
            camera.release();
        }
        self.drawer.cancel();
        self.permissions.reset();
        self.voice_enabled = false;
        self.mounted = false;
        self.publish();
    }

    fn publish(&self) {
        let now = Instant::now();
        let next = ScreenSnapshot {
            mounted: self.mounted,
            drawer_state: self.drawer.state(),
            drawer_offset: self.drawer.offset_at(now),
            listening_state: self
                .speech
                .as_ref()
                .map(SpeechSession::listening_state)
                .unwrap_or_default(),
            camera_facing: self
                .camera
                .as_ref()
                .map(CameraSession::facing)
                .unwrap_or_default(),
            camera_active: self.camera.as_ref().is_some_and(CameraSession::is_open),
            microphone: self.permissions.status(Capability::Microphone),
            camera: self.permissions.status(Capability::Camera),
            voice_enabled: self.voice_enabled,
            last_transcript: self.last_transcript.clone(),
            notice: self.notice.clone(),
        };
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// The hosting screen's side of a mounted controller
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<UiCommand>,
    snapshot: watch::Receiver<ScreenSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl ControllerHandle {
    pub fn on_drawer_toggle_tap(&self) {
        self.send(UiCommand::ToggleDrawer);
    }

    pub fn on_camera_flip_tap(&self) {
        self.send(UiCommand::FlipCamera);
    }

    pub fn on_listen_tap(&self) {
        self.send(UiCommand::ToggleListening);
    }

    pub fn dismiss_notice(&self) {
        self.send(UiCommand::DismissNotice);
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenSnapshot> {
        self.snapshot.clone()
    }

    /// Wait until a published snapshot satisfies `pred`.
    /// Returns `None` if the controller ends first.
    pub async fn wait_for(
        &mut self,
        pred: impl FnMut(&ScreenSnapshot) -> bool,
    ) -> Option<ScreenSnapshot> {
        self.snapshot
            .wait_for(pred)
            .await
            .ok()
            .map(|snapshot| snapshot.clone())
    }

    /// Tear the controller down and wait until its devices are released
    pub async fn unmount(&mut self) {
        self.send(UiCommand::Unmount);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Controller task failed: {}", e);
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn send(&self, cmd: UiCommand) {
        if self.commands.send(cmd).is_err() {
            debug!("Controller torn down, dropping {:?}", cmd);
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.send(UiCommand::Unmount);
        }
    }
}
