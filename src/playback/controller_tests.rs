use super::*;

#[derive(Default)]
struct FakeLauncher {
    installed: Vec<&'static str>,
    spawn_error: bool,
    spawned: Vec<LaunchPlan>,
    pending_exit: Option<ExitReport>,
    stops: u32,
}

impl FakeLauncher {
    fn with(players: &[&'static str]) -> Self {
        Self {
            installed: players.to_vec(),
            ..Default::default()
        }
    }
}

impl Launcher for FakeLauncher {
    fn locate(&self, player: &str) -> Option<PathBuf> {
        self.installed
            .iter()
            .find(|p| **p == player)
            .map(|p| PathBuf::from(format!("/usr/bin/{}", p)))
    }

    fn spawn(&mut self, plan: &LaunchPlan) -> io::Result<u32> {
        if self.spawn_error {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        self.spawned.push(plan.clone());
        Ok(1000 + self.spawned.len() as u32)
    }

    fn poll_exit(&mut self) -> Option<ExitReport> {
        self.pending_exit.take()
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

#[derive(Default)]
struct FakeEngine {
    available: bool,
    loaded: Vec<StreamRequest>,
    recovers: u32,
    stops: u32,
}

impl StreamEngine for FakeEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn codec_support(&self) -> Vec<(&'static str, bool)> {
        if self.available {
            vec![("H.264", true), ("VP9", true), ("VP8", false)]
        } else {
            Vec::new()
        }
    }

    fn load(&mut self, request: &StreamRequest) {
        self.loaded.push(request.clone());
    }

    fn recover(&mut self) {
        self.recovers += 1;
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

fn channel() -> ChannelRecord {
    ChannelRecord {
        id: "News.fr".into(),
        name: "News".into(),
        alt_names: Vec::new(),
        country_code: "FR".into(),
        country_name: "France".into(),
        flag: "🇫🇷".into(),
        category: "news".into(),
        logo: None,
        stream_url: "https://live.example.com/news/playlist.m3u8".into(),
        website: None,
        referrer: None,
        user_agent: None,
    }
}

fn settings() -> PlayerSettings {
    PlayerSettings::from_config(&AppConfig::default())
}

fn network_fault() -> EngineFault {
    EngineFault {
        kind: FaultKind::Network,
        fatal: true,
        detail: "connection reset".into(),
    }
}

macro_rules! playback_env {
    ($launcher:expr, $engine:expr, $settings:expr) => {
        PlaybackEnv {
            launcher: &mut $launcher,
            engine: &mut $engine,
            settings: &$settings,
        }
    };
}

#[test]
fn test_default_strategy_order() {
    let controller = PlaybackController::default();
    assert_eq!(
        controller.strategy_names(),
        vec!["adaptive-engine", "native-player", "forced-source"]
    );
}

#[test]
fn test_engine_preferred_when_available() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine { available: true, ..Default::default() };
    let settings = settings();
    let mut controller = PlaybackController::default();

    let status = controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    assert_eq!(
        status,
        PlaybackStatus::Playing(Playing { strategy: "adaptive-engine", backend: Backend::Engine })
    );
    assert_eq!(engine.loaded.len(), 1);
    assert_eq!(engine.loaded[0].url, channel().stream_url);
    assert!(launcher.spawned.is_empty());
    assert_eq!(controller.channel().map(|c| c.id.as_str()), Some("News.fr"));
}

#[test]
fn test_falls_back_to_first_installed_player() {
    let mut launcher = FakeLauncher::with(&["vlc", "ffplay"]);
    let mut engine = FakeEngine::default();
    let settings = settings();
    let mut controller = PlaybackController::default();

    let status = controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    match status {
        PlaybackStatus::Playing(Playing { strategy, backend: Backend::External { player, .. } }) => {
            assert_eq!(strategy, "native-player");
            assert_eq!(player, "vlc");
        }
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(launcher.spawned[0].program, PathBuf::from("/usr/bin/vlc"));
    assert!(!launcher.spawned[0].args.contains(&"--demux=adaptive".to_string()));
}

#[test]
fn test_configured_player_comes_first() {
    let mut launcher = FakeLauncher::with(&["mpv", "ffplay"]);
    let mut engine = FakeEngine::default();
    let mut settings = settings();
    settings.external_player = "ffplay".into();
    let mut controller = PlaybackController::default();

    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    assert_eq!(launcher.spawned[0].program, PathBuf::from("/usr/bin/ffplay"));
}

#[test]
fn test_failed_player_exit_moves_to_forced_source() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine::default();
    let settings = settings();
    let mut controller = PlaybackController::default();

    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));
    let status = controller.handle_process_exit(
        ExitReport { success: false, code: Some(2) },
        &mut playback_env!(launcher, engine, settings),
    );

    match status {
        Some(PlaybackStatus::Playing(playing)) => assert_eq!(playing.strategy, "forced-source"),
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(launcher.spawned.len(), 2);
    assert!(launcher.spawned[1].args.contains(&"--demuxer-lavf-format=hls".to_string()));
}

#[test]
fn test_exhaustion_produces_diagnostic() {
    let mut launcher = FakeLauncher::default();
    let mut engine = FakeEngine::default();
    let settings = settings();
    let mut controller = PlaybackController::default();

    let status = controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    let PlaybackStatus::Failed(diag) = status else {
        panic!("expected a diagnostic");
    };
    assert!(!diag.engine_available);
    assert!(diag.codec_checks.is_empty());
    assert_eq!(diag.scheme, "https");
    assert_eq!(diag.manifest, ManifestKind::Hls);
    assert_eq!(
        diag.rejections.iter().map(|r| r.strategy).collect::<Vec<_>>(),
        vec!["adaptive-engine", "native-player", "forced-source"]
    );
    let names: Vec<&str> = diag.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["mpv", "vlc", "ffplay"]);
    assert!(!diag.any_player());
    assert!(controller.active().is_none());
}

#[test]
fn test_spawn_error_is_a_rejection() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    launcher.spawn_error = true;
    let mut engine = FakeEngine::default();
    let settings = settings();
    let mut controller = PlaybackController::default();

    let status = controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    let PlaybackStatus::Failed(diag) = status else {
        panic!("expected a diagnostic");
    };
    assert!(diag.rejections[1].reason.contains("failed to launch mpv"));
    assert!(diag.any_player());
}

#[test]
fn test_engine_recovers_then_gives_up() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine { available: true, ..Default::default() };
    let settings = settings();
    let mut controller = PlaybackController::default();
    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    for attempt in 1..=MAX_RECOVERIES {
        let status = controller.handle_engine_fault(network_fault(), &mut playback_env!(launcher, engine, settings));
        assert_eq!(
            status,
            Some(PlaybackStatus::Recovering { attempt, detail: "connection reset".into() })
        );
    }
    assert_eq!(engine.recovers, MAX_RECOVERIES);

    let status = controller.handle_engine_fault(network_fault(), &mut playback_env!(launcher, engine, settings));
    match status {
        Some(PlaybackStatus::Playing(playing)) => assert_eq!(playing.strategy, "native-player"),
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(engine.stops, 1);
}

#[test]
fn test_other_engine_fault_skips_recovery() {
    let mut launcher = FakeLauncher::with(&["vlc"]);
    let mut engine = FakeEngine { available: true, ..Default::default() };
    let settings = settings();
    let mut controller = PlaybackController::default();
    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    let fault = EngineFault { kind: FaultKind::Other, fatal: true, detail: "bad input".into() };
    let status = controller.handle_engine_fault(fault, &mut playback_env!(launcher, engine, settings));

    assert!(matches!(status, Some(PlaybackStatus::Playing(_))));
    assert_eq!(engine.recovers, 0);
}

#[test]
fn test_non_fatal_fault_is_ignored() {
    let mut launcher = FakeLauncher::default();
    let mut engine = FakeEngine { available: true, ..Default::default() };
    let settings = settings();
    let mut controller = PlaybackController::default();
    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    let fault = EngineFault { kind: FaultKind::Media, fatal: false, detail: "corrupt frame".into() };
    assert_eq!(controller.handle_engine_fault(fault, &mut playback_env!(launcher, engine, settings)), None);
    assert_eq!(engine.recovers, 0);
    assert_eq!(controller.active().map(|p| p.strategy), Some("adaptive-engine"));
}

#[test]
fn test_clean_exit_ends_session() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine::default();
    let settings = settings();
    let mut controller = PlaybackController::default();
    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    let status = controller.handle_process_exit(
        ExitReport { success: true, code: Some(0) },
        &mut playback_env!(launcher, engine, settings),
    );
    assert_eq!(status, Some(PlaybackStatus::Ended));
    assert!(controller.active().is_none());
    assert_eq!(launcher.spawned.len(), 1);
}

#[test]
fn test_events_without_matching_backend_are_ignored() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine { available: true, ..Default::default() };
    let settings = settings();
    let mut controller = PlaybackController::default();

    let exit = ExitReport { success: false, code: Some(1) };
    assert_eq!(controller.handle_process_exit(exit, &mut playback_env!(launcher, engine, settings)), None);

    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));
    assert_eq!(controller.handle_process_exit(exit, &mut playback_env!(launcher, engine, settings)), None);
}

#[test]
fn test_new_channel_stops_previous_backend() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine::default();
    let settings = settings();
    let mut controller = PlaybackController::default();

    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));
    let mut other = channel();
    other.id = "Sport.fr".into();
    controller.play(&other, &mut playback_env!(launcher, engine, settings));

    assert_eq!(launcher.stops, 1);
    assert_eq!(controller.channel().map(|c| c.id.as_str()), Some("Sport.fr"));

    controller.stop(&mut playback_env!(launcher, engine, settings));
    assert_eq!(launcher.stops, 2);
    assert!(controller.channel().is_none());
}

#[test]
fn test_engine_start_after_recovery_is_playing_again() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine { available: true, ..Default::default() };
    let settings = settings();
    let mut controller = PlaybackController::default();
    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    let status = controller.handle_engine_fault(network_fault(), &mut playback_env!(launcher, engine, settings));
    assert!(matches!(status, Some(PlaybackStatus::Recovering { attempt: 1, .. })));

    let engine_playing = Playing { strategy: "adaptive-engine", backend: Backend::Engine };
    assert_eq!(controller.handle_engine_started(), Some(PlaybackStatus::Playing(engine_playing)));
    assert_eq!(controller.active().map(|p| p.strategy), Some("adaptive-engine"));
}

#[test]
fn test_engine_start_ignored_for_external_player() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine::default();
    let settings = settings();
    let mut controller = PlaybackController::default();
    assert_eq!(controller.handle_engine_started(), None);

    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));
    assert_eq!(controller.handle_engine_started(), None);
}

#[test]
fn test_media_and_network_faults_share_recovery_budget() {
    let mut launcher = FakeLauncher::with(&["mpv"]);
    let mut engine = FakeEngine { available: true, ..Default::default() };
    let settings = settings();
    let mut controller = PlaybackController::default();
    controller.play(&channel(), &mut playback_env!(launcher, engine, settings));

    let media_fault = || EngineFault { kind: FaultKind::Media, fatal: true, detail: "decoder error".into() };
    let faults = [network_fault(), media_fault(), network_fault()];
    for (attempt, fault) in (1..=MAX_RECOVERIES).zip(faults) {
        let detail = fault.detail.clone();
        let status = controller.handle_engine_fault(fault, &mut playback_env!(launcher, engine, settings));
        assert_eq!(status, Some(PlaybackStatus::Recovering { attempt, detail }));
    }
    assert_eq!(engine.recovers, MAX_RECOVERIES);

    let status = controller.handle_engine_fault(media_fault(), &mut playback_env!(launcher, engine, settings));
    match status {
        Some(PlaybackStatus::Playing(Playing { strategy, backend: Backend::External { player, .. } })) => {
            assert_eq!(strategy, "native-player");
            assert_eq!(player, "mpv");
        }
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(engine.recovers, MAX_RECOVERIES);
    assert_eq!(engine.stops, 1);
}

#[test]
fn test_forced_source_rejected_without_hls_capable_player() {
    let mut launcher = FakeLauncher::with(&["mplayer"]);
    let mut engine = FakeEngine::default();
    let mut settings = settings();
    settings.external_player = "mplayer".into();
    let mut controller = PlaybackController::default();

    let status = controller.play(&channel(), &mut playback_env!(launcher, engine, settings));
    assert!(matches!(status, PlaybackStatus::Playing(Playing { strategy: "native-player", .. })));
    assert_eq!(launcher.spawned[0].program, PathBuf::from("/usr/bin/mplayer"));

    let status = controller.handle_process_exit(
        ExitReport { success: false, code: Some(1) },
        &mut playback_env!(launcher, engine, settings),
    );

    let Some(PlaybackStatus::Failed(diag)) = status else {
        panic!("expected a diagnostic, got {:?}", status);
    };
    let last = diag.rejections.last().unwrap();
    assert_eq!(last.strategy, "forced-source");
    assert_eq!(last.reason, "no player able to force HLS is installed");
    assert_eq!(launcher.spawned.len(), 1);

    let mplayer = diag.players.iter().find(|p| p.name == "mplayer").unwrap();
    assert_eq!(mplayer.path, Some(PathBuf::from("/usr/bin/mplayer")));
    assert!(diag.any_player());
}

#[test]
fn test_status_line_follows_status() {
    let playing = Playing { strategy: "adaptive-engine", backend: Backend::Engine };
    let line = PlaybackStatus::Playing(playing.clone()).status_line("News");
    assert_eq!(line, format!("Playing News via {}", playing.describe()));
    assert_eq!(
        PlaybackStatus::Recovering { attempt: 2, detail: "x".into() }.status_line("News"),
        "Recovering News (2/3)"
    );
    assert_eq!(PlaybackStatus::Ended.status_line("News"), "Stopped News");

    let mut launcher = FakeLauncher::default();
    let mut engine = FakeEngine::default();
    let settings = settings();
    let status = PlaybackController::default().play(&channel(), &mut playback_env!(launcher, engine, settings));
    assert_eq!(status.status_line("News"), "Could not play News");
}
