//! Playback strategies, tried in order by the controller

use super::launch::{LaunchPlan, PlayerKind};
use super::{Backend, PlaybackEnv, Playing, StreamRequest, Unsupported};
use crate::models::ChannelRecord;

pub trait PlaybackStrategy {
    fn name(&self) -> &'static str;
    fn try_play(&self, channel: &ChannelRecord, env: &mut PlaybackEnv<'_>) -> Result<Playing, Unsupported>;
}

/// Built-in FFmpeg engine
pub struct AdaptiveEngineStrategy;

impl PlaybackStrategy for AdaptiveEngineStrategy {
    fn name(&self) -> &'static str {
        "adaptive-engine"
    }

    fn try_play(&self, channel: &ChannelRecord, env: &mut PlaybackEnv<'_>) -> Result<Playing, Unsupported> {
        if !env.engine.is_available() {
            return Err(Unsupported::new(self.name(), "built-in engine not available"));
        }
        env.engine.load(&StreamRequest::for_channel(channel, env.settings));
        Ok(Playing {
            strategy: self.name(),
            backend: Backend::Engine,
        })
    }
}

/// Configured external player, or the first default player installed
pub struct NativePlayerStrategy;

impl PlaybackStrategy for NativePlayerStrategy {
    fn name(&self) -> &'static str {
        "native-player"
    }

    fn try_play(&self, channel: &ChannelRecord, env: &mut PlaybackEnv<'_>) -> Result<Playing, Unsupported> {
        let candidates = env.settings.candidate_players();
        let Some((player, path)) = candidates
            .iter()
            .find_map(|p| env.launcher.locate(p).map(|path| (p.clone(), path)))
        else {
            return Err(Unsupported::new(
                self.name(),
                format!("no player found (tried {})", candidates.join(", ")),
            ));
        };

        let kind = PlayerKind::detect(&player);
        let plan = LaunchPlan::native(kind, &path, channel, env.settings);
        spawn(self.name(), &player, &plan, env)
    }
}

/// External player told to use the HLS demuxer explicitly, for streams
/// whose extension or content type does not announce them as HLS
pub struct ForcedSourceStrategy;

impl PlaybackStrategy for ForcedSourceStrategy {
    fn name(&self) -> &'static str {
        "forced-source"
    }

    fn try_play(&self, channel: &ChannelRecord, env: &mut PlaybackEnv<'_>) -> Result<Playing, Unsupported> {
        let forceable: Vec<String> = env
            .settings
            .candidate_players()
            .into_iter()
            .filter(|p| PlayerKind::detect(p).can_force_hls())
            .collect();

        let Some((player, path)) = forceable
            .iter()
            .find_map(|p| env.launcher.locate(p).map(|path| (p.clone(), path)))
        else {
            return Err(Unsupported::new(self.name(), "no player able to force HLS is installed"));
        };

        let kind = PlayerKind::detect(&player);
        let Some(plan) = LaunchPlan::forced_hls(kind, &path, channel, env.settings) else {
            return Err(Unsupported::new(self.name(), format!("{} cannot force HLS", player)));
        };
        spawn(self.name(), &player, &plan, env)
    }
}

fn spawn(
    strategy: &'static str,
    player: &str,
    plan: &LaunchPlan,
    env: &mut PlaybackEnv<'_>,
) -> Result<Playing, Unsupported> {
    log::debug!("[PLAY] {} {}", plan.program.display(), plan.args.join(" "));
    match env.launcher.spawn(plan) {
        Ok(pid) => Ok(Playing {
            strategy,
            backend: Backend::External {
                player: player.to_string(),
                pid,
            },
        }),
        Err(e) => Err(Unsupported::new(strategy, format!("failed to launch {}: {}", player, e))),
    }
}
