//! External player processes

use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use super::{ExitReport, LaunchPlan, Launcher};

/// Spawns players with `std::process` and keeps the latest one around so
/// its exit can be polled from the UI loop.
pub struct ProcessLauncher {
    /// Close the previous player when a new channel starts
    single_window: bool,
    current: Option<Child>,
}

impl ProcessLauncher {
    pub fn new(single_window: bool) -> Self {
        Self {
            single_window,
            current: None,
        }
    }

    pub fn set_single_window(&mut self, single_window: bool) {
        self.single_window = single_window;
    }

    /// Kill the current player regardless of window mode; true if one was running
    pub fn terminate(&mut self) -> bool {
        let Some(mut child) = self.current.take() else {
            return false;
        };
        let _ = child.kill();
        let _ = child.wait();
        true
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    fn release(&mut self) {
        let Some(mut child) = self.current.take() else {
            return;
        };
        if self.single_window {
            let _ = child.kill();
            let _ = child.wait(); // Reap the process
            log::info!("[PLAY] Single window mode - closed previous player");
        } else {
            // Leave it running, but reap it when it exits
            thread::spawn(move || {
                let _ = child.wait();
            });
        }
    }
}

#[cfg(target_os = "windows")]
fn known_install_paths(player: &str) -> &'static [&'static str] {
    match player {
        "vlc" | "vlc.exe" => &[
            r"C:\Program Files\VideoLAN\VLC\vlc.exe",
            r"C:\Program Files (x86)\VideoLAN\VLC\vlc.exe",
        ],
        "mpv" | "mpv.exe" => &[
            r"C:\Program Files\mpv\mpv.exe",
            r"C:\Program Files (x86)\mpv\mpv.exe",
            r"C:\mpv\mpv.exe",
        ],
        "ffplay" | "ffplay.exe" => &[
            r"C:\ffmpeg\bin\ffplay.exe",
            r"C:\Program Files\ffmpeg\bin\ffplay.exe",
        ],
        _ => &[],
    }
}

#[cfg(not(target_os = "windows"))]
fn known_install_paths(_player: &str) -> &'static [&'static str] {
    &[]
}

impl Launcher for ProcessLauncher {
    fn locate(&self, player: &str) -> Option<PathBuf> {
        let player = player.trim();
        if player.is_empty() {
            return None;
        }

        let path = Path::new(player);
        if path.components().count() > 1 {
            return path.is_file().then(|| path.to_path_buf());
        }

        if let Ok(found) = which::which(player) {
            return Some(found);
        }

        known_install_paths(&player.to_lowercase())
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    fn spawn(&mut self, plan: &LaunchPlan) -> io::Result<u32> {
        self.release();

        let mut cmd = Command::new(&plan.program);
        cmd.args(&plan.args);
        for (key, value) in &plan.env {
            cmd.env(key, value);
        }

        // On Windows, hide the console window for ffplay
        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x08000000;
            let name = plan.program.to_string_lossy().to_lowercase();
            if name.contains("ffplay") || name.contains("ffmpeg") {
                cmd.creation_flags(CREATE_NO_WINDOW);
            }
        }

        cmd.stderr(Stdio::piped());
        cmd.stdout(Stdio::null());

        let mut child = cmd.spawn()?;
        let pid = child.id();
        log::info!("[PLAY] Player launched successfully (PID: {})", pid);

        if let Some(stderr) = child.stderr.take() {
            thread::spawn(move || {
                let reader = BufReader::new(stderr);
                for line in reader.lines().map_while(Result::ok) {
                    if !line.trim().is_empty() {
                        log::debug!("[PLAYER] {}", line);
                    }
                }
            });
        }

        self.current = Some(child);
        Ok(pid)
    }

    fn poll_exit(&mut self) -> Option<ExitReport> {
        let child = self.current.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                self.current = None;
                Some(ExitReport {
                    success: status.success(),
                    code: status.code(),
                })
            }
            Ok(None) => None,
            Err(e) => {
                log::error!("Failed to wait for player: {}", e);
                self.current = None;
                Some(ExitReport { success: false, code: None })
            }
        }
    }

    fn stop(&mut self) {
        self.release();
    }
}
