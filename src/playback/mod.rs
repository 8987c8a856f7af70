//! Playback controller
//!
//! Playing a channel walks an ordered list of strategies (built-in engine,
//! native external player, forced-HLS external player). The first one that
//! starts wins. If the active strategy later fails (engine fault, player
//! exiting with an error) the walk resumes at the next strategy. When nothing
//! is left a [`PlaybackDiagnostic`] describes what was tried and why it failed.

mod diagnostic;
mod launch;
mod process;
mod strategy;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{AppConfig, ConnectionQuality};
use crate::models::ChannelRecord;

pub use diagnostic::{ManifestKind, PlaybackDiagnostic};
pub use launch::LaunchPlan;
pub use process::ProcessLauncher;
pub use strategy::{AdaptiveEngineStrategy, ForcedSourceStrategy, NativePlayerStrategy, PlaybackStrategy};

/// Players tried, in order, when none is configured
pub const DEFAULT_PLAYERS: &[&str] = &["mpv", "vlc", "ffplay"];

/// Engine network/media recoveries allowed per channel before moving on
pub const MAX_RECOVERIES: u32 = 3;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Player-related settings, snapshotted from the app config
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub external_player: String,
    pub buffer_secs: u32,
    pub connection_quality: ConnectionQuality,
    pub hw_accel: bool,
    pub user_agent: String,
    pub pass_user_agent_to_player: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl PlayerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            external_player: config.external_player.trim().to_string(),
            buffer_secs: config.effective_buffer(),
            connection_quality: config.connection_quality,
            hw_accel: config.hw_accel,
            user_agent: if config.user_agent.trim().is_empty() {
                DEFAULT_USER_AGENT.to_string()
            } else {
                config.user_agent.trim().to_string()
            },
            pass_user_agent_to_player: config.pass_user_agent_to_player,
        }
    }

    /// Stream-specific user agent wins over the configured one
    pub fn user_agent_for<'a>(&'a self, channel: &'a ChannelRecord) -> &'a str {
        channel.user_agent.as_deref().unwrap_or(&self.user_agent)
    }

    /// Players to consider: the configured one first, then the defaults
    pub fn candidate_players(&self) -> Vec<String> {
        let mut players = Vec::new();
        if !self.external_player.is_empty() {
            players.push(self.external_player.clone());
        }
        for p in DEFAULT_PLAYERS {
            if !players.iter().any(|existing| existing.eq_ignore_ascii_case(p)) {
                players.push(p.to_string());
            }
        }
        players
    }
}

/// What the built-in engine needs to open a stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub name: String,
    pub url: String,
    pub buffer_secs: u32,
    pub user_agent: String,
    pub referrer: Option<String>,
}

impl StreamRequest {
    pub fn for_channel(channel: &ChannelRecord, settings: &PlayerSettings) -> Self {
        Self {
            name: channel.name.clone(),
            url: channel.stream_url.clone(),
            buffer_secs: settings.buffer_secs,
            user_agent: settings.user_agent_for(channel).to_string(),
            referrer: channel.referrer.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Could not reach or keep reading the stream
    Network,
    /// Decoder or codec trouble
    Media,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineFault {
    pub kind: FaultKind,
    pub fatal: bool,
    pub detail: String,
}

/// What the built-in engine reports back while playing
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Frames are flowing, after a load or a recovery
    Started,
    Fault(EngineFault),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub success: bool,
    pub code: Option<i32>,
}

/// Starts and watches external player processes
pub trait Launcher {
    /// Resolve a player name or path to an executable, `None` if not installed
    fn locate(&self, player: &str) -> Option<PathBuf>;
    /// Start the plan; returns the process id
    fn spawn(&mut self, plan: &LaunchPlan) -> io::Result<u32>;
    /// Exit status of the current player once it has exited
    fn poll_exit(&mut self) -> Option<ExitReport>;
    fn stop(&mut self);
}

/// The in-process adaptive streaming engine
pub trait StreamEngine {
    fn is_available(&self) -> bool;
    /// (codec label, decoder present), empty when there is no engine
    fn codec_support(&self) -> Vec<(&'static str, bool)>;
    fn load(&mut self, request: &StreamRequest);
    /// Reload the current stream after a recoverable fault
    fn recover(&mut self);
    fn stop(&mut self);
}

/// Everything a strategy may touch while starting playback
pub struct PlaybackEnv<'a> {
    pub launcher: &'a mut dyn Launcher,
    pub engine: &'a mut dyn StreamEngine,
    pub settings: &'a PlayerSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Engine,
    External { player: String, pid: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playing {
    pub strategy: &'static str,
    pub backend: Backend,
}

impl Playing {
    pub fn describe(&self) -> String {
        match &self.backend {
            Backend::Engine => format!("{} (built-in)", self.strategy),
            Backend::External { player, pid } => format!("{} ({}, PID {})", self.strategy, player, pid),
        }
    }
}

/// A strategy declined or failed to play the channel
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{strategy}: {reason}")]
pub struct Unsupported {
    pub strategy: &'static str,
    pub reason: String,
}

impl Unsupported {
    pub fn new(strategy: &'static str, reason: impl Into<String>) -> Self {
        Self { strategy, reason: reason.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStatus {
    Playing(Playing),
    Recovering { attempt: u32, detail: String },
    Failed(Box<PlaybackDiagnostic>),
    Ended,
}

impl PlaybackStatus {
    /// One-line summary for the status bar
    pub fn status_line(&self, channel: &str) -> String {
        match self {
            PlaybackStatus::Playing(playing) => format!("Playing {} via {}", channel, playing.describe()),
            PlaybackStatus::Recovering { attempt, .. } => {
                format!("Recovering {} ({}/{})", channel, attempt, MAX_RECOVERIES)
            }
            PlaybackStatus::Failed(_) => format!("Could not play {}", channel),
            PlaybackStatus::Ended => format!("Stopped {}", channel),
        }
    }
}

struct Session {
    channel: ChannelRecord,
    next: usize,
    rejections: Vec<Unsupported>,
    active: Option<Playing>,
    recoveries: u32,
}

pub struct PlaybackController {
    strategies: Vec<Box<dyn PlaybackStrategy>>,
    session: Option<Session>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(vec![
            Box::new(AdaptiveEngineStrategy),
            Box::new(NativePlayerStrategy),
            Box::new(ForcedSourceStrategy),
        ])
    }
}

impl PlaybackController {
    pub fn new(strategies: Vec<Box<dyn PlaybackStrategy>>) -> Self {
        Self { strategies, session: None }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn channel(&self) -> Option<&ChannelRecord> {
        self.session.as_ref().map(|s| &s.channel)
    }

    pub fn active(&self) -> Option<&Playing> {
        self.session.as_ref().and_then(|s| s.active.as_ref())
    }

    /// Stop whatever is playing and start the cascade for `channel`
    pub fn play(&mut self, channel: &ChannelRecord, env: &mut PlaybackEnv<'_>) -> PlaybackStatus {
        self.stop(env);
        log::info!("[PLAY] {} | {}", channel.name, channel.stream_url);
        self.session = Some(Session {
            channel: channel.clone(),
            next: 0,
            rejections: Vec::new(),
            active: None,
            recoveries: 0,
        });
        self.advance(env)
    }

    /// Try strategies from the session's cursor until one starts
    fn advance(&mut self, env: &mut PlaybackEnv<'_>) -> PlaybackStatus {
        let Some(session) = self.session.as_mut() else {
            return PlaybackStatus::Ended;
        };

        while session.next < self.strategies.len() {
            let strategy = &self.strategies[session.next];
            session.next += 1;

            match strategy.try_play(&session.channel, env) {
                Ok(playing) => {
                    log::info!("[PLAY] Started via {}", playing.describe());
                    session.active = Some(playing.clone());
                    return PlaybackStatus::Playing(playing);
                }
                Err(rejection) => {
                    log::warn!("[PLAY] {}", rejection);
                    session.rejections.push(rejection);
                }
            }
        }

        session.active = None;
        let diagnostic = PlaybackDiagnostic::collect(&session.channel, &session.rejections, env);
        log::error!("{}", diagnostic);
        PlaybackStatus::Failed(Box::new(diagnostic))
    }

    /// Feed a fault reported by the built-in engine
    pub fn handle_engine_fault(&mut self, fault: EngineFault, env: &mut PlaybackEnv<'_>) -> Option<PlaybackStatus> {
        let session = self.session.as_mut()?;
        let strategy = match &session.active {
            Some(Playing { backend: Backend::Engine, strategy }) => *strategy,
            _ => return None,
        };

        if !fault.fatal {
            log::warn!("Engine warning ({:?}): {}", fault.kind, fault.detail);
            return None;
        }

        let recoverable = matches!(fault.kind, FaultKind::Network | FaultKind::Media);
        if recoverable && session.recoveries < MAX_RECOVERIES {
            session.recoveries += 1;
            log::warn!(
                "Engine {:?} fault, recovering ({}/{}): {}",
                fault.kind, session.recoveries, MAX_RECOVERIES, fault.detail
            );
            env.engine.recover();
            return Some(PlaybackStatus::Recovering {
                attempt: session.recoveries,
                detail: fault.detail,
            });
        }

        log::error!("Engine gave up ({:?}): {}", fault.kind, fault.detail);
        env.engine.stop();
        session.active = None;
        session.rejections.push(Unsupported::new(strategy, fault.detail));
        Some(self.advance(env))
    }

    /// The engine is producing frames again; ends a recovery
    pub fn handle_engine_started(&mut self) -> Option<PlaybackStatus> {
        let active = self.session.as_ref()?.active.as_ref()?;
        if active.backend != Backend::Engine {
            return None;
        }
        log::info!("[PLAY] Engine playing via {}", active.describe());
        Some(PlaybackStatus::Playing(active.clone()))
    }

    /// Feed the exit of the external player
    pub fn handle_process_exit(&mut self, exit: ExitReport, env: &mut PlaybackEnv<'_>) -> Option<PlaybackStatus> {
        let session = self.session.as_mut()?;
        let (strategy, player) = match &session.active {
            Some(Playing { backend: Backend::External { player, .. }, strategy }) => (*strategy, player.clone()),
            _ => return None,
        };

        session.active = None;
        if exit.success {
            log::info!("[PLAY] {} closed", player);
            return Some(PlaybackStatus::Ended);
        }

        let reason = match exit.code {
            Some(code) => format!("{} exited with code {}", player, code),
            None => format!("{} was terminated", player),
        };
        log::warn!("[PLAY] {}", reason);
        session.rejections.push(Unsupported::new(strategy, reason));
        Some(self.advance(env))
    }

    pub fn stop(&mut self, env: &mut PlaybackEnv<'_>) {
        if let Some(session) = self.session.take() {
            match session.active.map(|p| p.backend) {
                Some(Backend::Engine) => env.engine.stop(),
                Some(Backend::External { .. }) => env.launcher.stop(),
                None => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
