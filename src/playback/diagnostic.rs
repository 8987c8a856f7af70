//! Report produced when no strategy could play a channel

use std::fmt;
use std::path::PathBuf;

use super::{PlaybackEnv, Unsupported};
use crate::models::ChannelRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Hls,
    Dash,
    MpegTs,
    Unknown,
}

impl ManifestKind {
    /// Guess from the URL path; query and fragment are ignored
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        if path.ends_with(".m3u8") || path.ends_with(".m3u") {
            ManifestKind::Hls
        } else if path.ends_with(".mpd") {
            ManifestKind::Dash
        } else if path.ends_with(".ts") {
            ManifestKind::MpegTs
        } else {
            ManifestKind::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ManifestKind::Hls => "HLS",
            ManifestKind::Dash => "DASH",
            ManifestKind::MpegTs => "MPEG-TS",
            ManifestKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProbe {
    pub name: String,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackDiagnostic {
    pub channel: String,
    pub url: String,
    pub engine_available: bool,
    pub codec_checks: Vec<(&'static str, bool)>,
    pub players: Vec<PlayerProbe>,
    pub scheme: String,
    pub manifest: ManifestKind,
    pub rejections: Vec<Unsupported>,
}

impl PlaybackDiagnostic {
    pub fn collect(channel: &ChannelRecord, rejections: &[Unsupported], env: &PlaybackEnv<'_>) -> Self {
        let players = env
            .settings
            .candidate_players()
            .into_iter()
            .map(|name| {
                let path = env.launcher.locate(&name);
                PlayerProbe { name, path }
            })
            .collect();

        let scheme = channel
            .stream_url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_lowercase())
            .unwrap_or_else(|| "none".to_string());

        Self {
            channel: channel.name.clone(),
            url: channel.stream_url.clone(),
            engine_available: env.engine.is_available(),
            codec_checks: env.engine.codec_support(),
            players,
            scheme,
            manifest: ManifestKind::from_url(&channel.stream_url),
            rejections: rejections.to_vec(),
        }
    }

    /// Any external player at all was found
    pub fn any_player(&self) -> bool {
        self.players.iter().any(|p| p.path.is_some())
    }
}

impl fmt::Display for PlaybackDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Could not play \"{}\"", self.channel)?;
        writeln!(f, "  URL: {}", self.url)?;
        writeln!(
            f,
            "  Built-in engine: {}",
            if self.engine_available { "available" } else { "not available" }
        )?;
        if self.codec_checks.is_empty() {
            writeln!(f, "  Codecs: N/A")?;
        } else {
            let codecs: Vec<String> = self
                .codec_checks
                .iter()
                .map(|(name, ok)| format!("{} {}", name, if *ok { "yes" } else { "no" }))
                .collect();
            writeln!(f, "  Codecs: {}", codecs.join(", "))?;
        }
        for probe in &self.players {
            match &probe.path {
                Some(path) => writeln!(f, "  Player {}: {}", probe.name, path.display())?,
                None => writeln!(f, "  Player {}: not found", probe.name)?,
            }
        }
        writeln!(f, "  Scheme: {}", self.scheme)?;
        write!(f, "  Manifest: {}", self.manifest.label())?;
        for rejection in &self.rejections {
            write!(f, "\n  - {}", rejection)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_url() {
        assert_eq!(ManifestKind::from_url("https://a.b/live/index.m3u8"), ManifestKind::Hls);
        assert_eq!(ManifestKind::from_url("https://a.b/live/INDEX.M3U8?token=x"), ManifestKind::Hls);
        assert_eq!(ManifestKind::from_url("https://a.b/manifest.mpd#t=1"), ManifestKind::Dash);
        assert_eq!(ManifestKind::from_url("http://a.b:8000/stream.ts"), ManifestKind::MpegTs);
        assert_eq!(ManifestKind::from_url("rtmp://a.b/live/stream"), ManifestKind::Unknown);
        assert_eq!(ManifestKind::from_url("https://a.b/play?file=x.m3u8"), ManifestKind::Unknown);
    }

    #[test]
    fn test_display_lists_everything() {
        let diag = PlaybackDiagnostic {
            channel: "Test TV".into(),
            url: "https://a.b/index.m3u8".into(),
            engine_available: false,
            codec_checks: Vec::new(),
            players: vec![
                PlayerProbe { name: "mpv".into(), path: None },
                PlayerProbe { name: "vlc".into(), path: Some(PathBuf::from("/usr/bin/vlc")) },
            ],
            scheme: "https".into(),
            manifest: ManifestKind::Hls,
            rejections: vec![Unsupported::new("native-player", "vlc exited with code 1")],
        };
        let text = diag.to_string();
        assert!(text.starts_with("Could not play \"Test TV\""));
        assert!(text.contains("Built-in engine: not available"));
        assert!(text.contains("Codecs: N/A"));
        assert!(text.contains("Player mpv: not found"));
        assert!(text.contains("Player vlc: /usr/bin/vlc"));
        assert!(text.contains("Manifest: HLS"));
        assert!(text.ends_with("- native-player: vlc exited with code 1"));
        assert!(diag.any_player());
    }

    #[test]
    fn test_codec_line() {
        let diag = PlaybackDiagnostic {
            channel: "X".into(),
            url: "x".into(),
            engine_available: true,
            codec_checks: vec![("H.264", true), ("VP9", false)],
            players: Vec::new(),
            scheme: "none".into(),
            manifest: ManifestKind::Unknown,
            rejections: Vec::new(),
        };
        assert!(diag.to_string().contains("Codecs: H.264 yes, VP9 no"));
        assert!(!diag.any_player());
    }
}
