//! Command lines for the external players we know how to drive

use std::path::{Path, PathBuf};

use super::PlayerSettings;
use crate::models::ChannelRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Ffplay,
    Mpv,
    Vlc,
    MPlayer,
    Celluloid,
    PotPlayer,
    MpcHc,
    Generic,
}

impl PlayerKind {
    /// Guess the player from its name or path
    pub fn detect(player: &str) -> Self {
        let name = Path::new(player)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| player.to_lowercase());

        if name.contains("ffplay") {
            PlayerKind::Ffplay
        } else if name.contains("celluloid") || name.contains("gnome-mpv") {
            PlayerKind::Celluloid
        } else if name.contains("mpv") {
            PlayerKind::Mpv
        } else if name.contains("vlc") {
            PlayerKind::Vlc
        } else if name.contains("mplayer") {
            PlayerKind::MPlayer
        } else if name.contains("potplayer") {
            PlayerKind::PotPlayer
        } else if name.contains("mpc-hc") || name.contains("mpc-be") {
            PlayerKind::MpcHc
        } else {
            PlayerKind::Generic
        }
    }

    pub fn can_force_hls(&self) -> bool {
        matches!(self, PlayerKind::Ffplay | PlayerKind::Mpv | PlayerKind::Vlc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl LaunchPlan {
    /// Let the player probe the stream itself
    pub fn native(kind: PlayerKind, program: &Path, channel: &ChannelRecord, settings: &PlayerSettings) -> Self {
        build(kind, program, channel, settings, false)
    }

    /// Force the HLS demuxer; `None` for players without such a switch
    pub fn forced_hls(
        kind: PlayerKind,
        program: &Path,
        channel: &ChannelRecord,
        settings: &PlayerSettings,
    ) -> Option<Self> {
        kind.can_force_hls().then(|| build(kind, program, channel, settings, true))
    }
}

fn build(
    kind: PlayerKind,
    program: &Path,
    channel: &ChannelRecord,
    settings: &PlayerSettings,
    force_hls: bool,
) -> LaunchPlan {
    let url = channel.stream_url.clone();
    let title = format!("{} - {}", channel.name, channel.stream_file());
    let buffer_secs = settings.buffer_secs;
    let buffer_ms = (buffer_secs as i64) * 1000;
    let buffer_bytes = (buffer_secs as i64) * 1024 * 1024; // ~1MB per second
    let buffer_bytes_large = buffer_bytes * 4; // Larger buffer for probing
    let is_slow = settings.connection_quality.is_slow();

    // A stream that names its own user agent needs it regardless of settings
    let user_agent = if channel.user_agent.is_some() || settings.pass_user_agent_to_player {
        Some(settings.user_agent_for(channel).to_string())
    } else {
        None
    };
    let referrer = channel.referrer.as_deref();

    let mut args: Vec<String> = Vec::new();

    match kind {
        PlayerKind::Ffplay => {
            if settings.hw_accel {
                // Windows: skip hwaccel - black screen with the Vulkan renderer
                #[cfg(target_os = "macos")]
                args.extend(["-hwaccel".to_string(), "videotoolbox".to_string()]);
                #[cfg(target_os = "linux")]
                args.extend(["-hwaccel".to_string(), "auto".to_string()]);
            }
            args.extend([
                "-autoexit".to_string(),
                "-probesize".to_string(), buffer_bytes_large.to_string(),
                "-analyzeduration".to_string(), (buffer_ms * 2000).to_string(), // microseconds
                "-sync".to_string(), "audio".to_string(),
                "-framedrop".to_string(),
                "-window_title".to_string(), title,
            ]);
            if url.starts_with("http") {
                args.extend([
                    "-reconnect".to_string(), "1".to_string(),
                    "-reconnect_streamed".to_string(), "1".to_string(),
                    "-reconnect_delay_max".to_string(), if is_slow { "30" } else { "10" }.to_string(),
                ]);
            }
            if is_slow {
                args.push("-infbuf".to_string());
            }
            if let Some(ua) = user_agent {
                args.extend(["-user_agent".to_string(), ua]);
            }
            if let Some(r) = referrer {
                args.extend(["-headers".to_string(), format!("Referer: {}\r\n", r)]);
            }
            if force_hls {
                args.extend(["-f".to_string(), "hls".to_string()]);
            }
            // Input goes last so the options above apply to it
            args.push(url);
        }
        PlayerKind::Mpv => {
            let cache_secs = buffer_secs * 2;
            let cache_mb = buffer_secs * 4;
            args.extend([
                url,
                format!("--title={}", title),
                "--cache=yes".to_string(),
                format!("--cache-secs={}", cache_secs),
                format!("--demuxer-readahead-secs={}", cache_secs),
                format!("--demuxer-max-bytes={}M", cache_mb),
                format!("--demuxer-max-back-bytes={}M", cache_mb / 2),
                "--cache-pause=yes".to_string(),
                format!("--cache-pause-wait={}", buffer_secs),
                format!("--network-timeout={}", if is_slow { 120 } else { 60 }),
                "--stream-lavf-o=reconnect=1".to_string(),
                "--stream-lavf-o=reconnect_streamed=1".to_string(),
                "--stream-lavf-o=reconnect_delay_max=30".to_string(),
                format!("--demuxer-lavf-analyzeduration={}", buffer_ms / 1000),
                format!("--demuxer-lavf-probesize={}", buffer_bytes_large),
                "--demuxer-lavf-o=fflags=+genpts+discardcorrupt".to_string(),
                "--keep-open=no".to_string(),
                "--ytdl=no".to_string(),
            ]);
            args.push(if settings.hw_accel { "--hwdec=auto-safe" } else { "--hwdec=no" }.to_string());
            if let Some(ua) = user_agent {
                args.push(format!("--user-agent={}", ua));
            }
            if let Some(r) = referrer {
                args.push(format!("--referrer={}", r));
            }
            if is_slow {
                args.extend([
                    "--framedrop=vo".to_string(),
                    "--vd-lavc-skiploopfilter=all".to_string(),
                    "--audio-buffer=1".to_string(),
                ]);
            }
            if force_hls {
                args.push("--demuxer-lavf-format=hls".to_string());
            }
        }
        PlayerKind::Vlc => {
            let cache_ms = buffer_ms * 2;
            args.extend([
                url,
                format!("--meta-title={}", title),
                format!("--network-caching={}", cache_ms),
                format!("--live-caching={}", cache_ms),
                "--http-reconnect".to_string(),
                "--play-and-exit".to_string(),
            ]);
            if settings.hw_accel {
                args.push("--avcodec-hw=any".to_string());
            }
            if let Some(ua) = user_agent {
                args.push(format!("--http-user-agent={}", ua));
            }
            if let Some(r) = referrer {
                args.push(format!("--http-referrer={}", r));
            }
            if force_hls {
                args.push("--demux=adaptive".to_string());
            }
        }
        PlayerKind::MPlayer => {
            let cache_min = if is_slow { "50" } else { "20" };
            args.extend([
                url,
                "-cache".to_string(), (buffer_secs * 1024).to_string(),
                "-cache-min".to_string(), cache_min.to_string(),
                "-title".to_string(), title,
            ]);
            if let Some(ua) = user_agent {
                args.extend(["-user-agent".to_string(), ua]);
            }
            if let Some(r) = referrer {
                args.extend(["-referrer".to_string(), r.to_string()]);
            }
        }
        PlayerKind::Celluloid => {
            // Celluloid passes --mpv-* options through to mpv
            args.extend([
                url,
                format!("--mpv-title={}", title),
                format!("--mpv-cache-secs={}", buffer_secs),
            ]);
        }
        PlayerKind::PotPlayer => {
            args.extend([url, format!("/title={}", title)]);
        }
        PlayerKind::MpcHc | PlayerKind::Generic => {
            args.push(url);
        }
    }

    LaunchPlan {
        program: program.to_path_buf(),
        args,
        // Some players read the user agent from the environment
        env: vec![("USER_AGENT".to_string(), settings.user_agent_for(channel).to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionQuality;

    fn channel() -> ChannelRecord {
        ChannelRecord {
            id: "Test.us".into(),
            name: "Test TV".into(),
            alt_names: Vec::new(),
            country_code: "US".into(),
            country_name: "United States".into(),
            flag: "🇺🇸".into(),
            category: "news".into(),
            logo: None,
            stream_url: "https://cdn.example.com/live/index.m3u8?token=1".into(),
            website: None,
            referrer: None,
            user_agent: None,
        }
    }

    fn settings() -> PlayerSettings {
        PlayerSettings {
            external_player: String::new(),
            buffer_secs: 5,
            connection_quality: ConnectionQuality::Normal,
            hw_accel: false,
            user_agent: "TestAgent/1.0".into(),
            pass_user_agent_to_player: true,
        }
    }

    #[test]
    fn test_detect_from_path() {
        assert_eq!(PlayerKind::detect("/usr/bin/mpv"), PlayerKind::Mpv);
        assert_eq!(PlayerKind::detect(r"C:\Program Files\VideoLAN\VLC\vlc.exe"), PlayerKind::Vlc);
        assert_eq!(PlayerKind::detect("ffplay"), PlayerKind::Ffplay);
        assert_eq!(PlayerKind::detect("celluloid"), PlayerKind::Celluloid);
        assert_eq!(PlayerKind::detect("totem"), PlayerKind::Generic);
    }

    #[test]
    fn test_ffplay_input_is_last_and_forced_format_precedes_it() {
        let plan = LaunchPlan::forced_hls(PlayerKind::Ffplay, Path::new("ffplay"), &channel(), &settings()).unwrap();
        let n = plan.args.len();
        assert_eq!(plan.args[n - 1], channel().stream_url);
        assert_eq!(plan.args[n - 3..n - 1], ["-f".to_string(), "hls".to_string()]);
        assert!(plan.args.contains(&"Test TV - index.m3u8".to_string()));
    }

    #[test]
    fn test_mpv_native_has_no_forced_format() {
        let plan = LaunchPlan::native(PlayerKind::Mpv, Path::new("/usr/bin/mpv"), &channel(), &settings());
        assert_eq!(plan.program, PathBuf::from("/usr/bin/mpv"));
        assert_eq!(plan.args[0], channel().stream_url);
        assert!(!plan.args.iter().any(|a| a.starts_with("--demuxer-lavf-format")));
        assert!(plan.args.contains(&"--user-agent=TestAgent/1.0".to_string()));
        assert!(plan.args.contains(&"--hwdec=no".to_string()));
    }

    #[test]
    fn test_stream_headers_override_settings() {
        let mut ch = channel();
        ch.user_agent = Some("StreamAgent".into());
        ch.referrer = Some("https://origin.example.com/".into());
        let mut s = settings();
        s.pass_user_agent_to_player = false;

        let plan = LaunchPlan::native(PlayerKind::Vlc, Path::new("vlc"), &ch, &s);
        assert!(plan.args.contains(&"--http-user-agent=StreamAgent".to_string()));
        assert!(plan.args.contains(&"--http-referrer=https://origin.example.com/".to_string()));
        assert_eq!(plan.env, vec![("USER_AGENT".to_string(), "StreamAgent".to_string())]);
    }

    #[test]
    fn test_user_agent_omitted_when_disabled() {
        let mut s = settings();
        s.pass_user_agent_to_player = false;
        let plan = LaunchPlan::native(PlayerKind::Mpv, Path::new("mpv"), &channel(), &s);
        assert!(!plan.args.iter().any(|a| a.starts_with("--user-agent")));
    }

    #[test]
    fn test_slow_connection_buffers_more() {
        let mut s = settings();
        s.connection_quality = ConnectionQuality::Slow;
        let plan = LaunchPlan::native(PlayerKind::Ffplay, Path::new("ffplay"), &channel(), &s);
        assert!(plan.args.contains(&"-infbuf".to_string()));
        let idx = plan.args.iter().position(|a| a == "-reconnect_delay_max").unwrap();
        assert_eq!(plan.args[idx + 1], "30");
    }

    #[test]
    fn test_generic_players_cannot_force() {
        assert!(LaunchPlan::forced_hls(PlayerKind::Generic, Path::new("totem"), &channel(), &settings()).is_none());
        assert!(LaunchPlan::forced_hls(PlayerKind::MPlayer, Path::new("mplayer"), &channel(), &settings()).is_none());
    }
}
