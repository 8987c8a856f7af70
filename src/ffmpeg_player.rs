// Built-in adaptive streaming engine using ffmpeg-next
// Requires FFmpeg libraries: libavcodec, libavformat, libavutil, libswscale
//
// To install FFmpeg development libraries:
// - Ubuntu/Debian: sudo apt install libavcodec-dev libavformat-dev libavutil-dev libswscale-dev libavdevice-dev
// - Fedora: sudo dnf install ffmpeg-devel
// - macOS: brew install ffmpeg
// - Windows: Download from https://ffmpeg.org and set FFMPEG_DIR environment variable
//
// libavformat handles the HLS/DASH manifest and segment fetching; this module
// only decodes video into RGB frames for egui and reports faults back to the
// playback controller.

use crate::playback::{EngineEvent, EngineFault, StreamEngine, StreamRequest};

/// Engine state
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerState {
    Stopped,
    Loading,
    Playing,
    Paused,
    Error(String),
}

/// Decoded video frame for rendering
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB24 data
}

/// Messages from the decode thread
pub enum PlayerMessage {
    StateChanged(PlayerState),
    Fault(EngineFault),
    Finished,
}

#[cfg(feature = "internal-player")]
mod engine_impl {
    use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    extern crate ffmpeg_next as ffmpeg;
    use ffmpeg::format::Pixel;
    use ffmpeg::media::Type;
    use ffmpeg::software::scaling::{context::Context as ScalingContext, flag::Flags};
    use ffmpeg::util::frame::video::Video as VideoFrame;

    use super::{DecodedFrame, PlayerMessage, PlayerState};
    use crate::playback::{EngineFault, FaultKind, StreamRequest};

    enum PlayerCommand {
        Stop,
        Pause,
        Resume,
    }

    fn set_state(state: &Mutex<PlayerState>, value: PlayerState) {
        if let Ok(mut s) = state.lock() {
            *s = value;
        }
    }

    fn fail(state: &Mutex<PlayerState>, tx: &Sender<PlayerMessage>, kind: FaultKind, detail: String) {
        set_state(state, PlayerState::Error(detail.clone()));
        let _ = tx.send(PlayerMessage::Fault(EngineFault { kind, fatal: true, detail }));
    }

    pub struct InternalPlayer {
        state: Arc<Mutex<PlayerState>>,
        command_sender: Option<Sender<PlayerCommand>>,
        message_receiver: Option<Receiver<PlayerMessage>>,
        current_frame: Arc<Mutex<Option<DecodedFrame>>>,
        request: Option<StreamRequest>,
    }

    impl InternalPlayer {
        pub fn new() -> Self {
            if let Err(e) = ffmpeg::init() {
                log::warn!("FFmpeg init failed: {}", e);
            }

            Self {
                state: Arc::new(Mutex::new(PlayerState::Stopped)),
                command_sender: None,
                message_receiver: None,
                current_frame: Arc::new(Mutex::new(None)),
                request: None,
            }
        }

        pub fn is_available(&self) -> bool {
            true
        }

        pub fn codec_support(&self) -> Vec<(&'static str, bool)> {
            [
                ("H.264", ffmpeg::codec::Id::H264),
                ("VP9", ffmpeg::codec::Id::VP9),
                ("VP8", ffmpeg::codec::Id::VP8),
            ]
            .into_iter()
            .map(|(label, id)| (label, ffmpeg::decoder::find(id).is_some()))
            .collect()
        }

        pub fn state(&self) -> PlayerState {
            self.state
                .lock()
                .map(|s| s.clone())
                .unwrap_or(PlayerState::Stopped)
        }

        pub fn take_frame(&self) -> Option<DecodedFrame> {
            self.current_frame.lock().ok().and_then(|mut f| f.take())
        }

        pub fn poll_messages(&mut self) -> Vec<PlayerMessage> {
            let mut messages = Vec::new();
            if let Some(ref receiver) = self.message_receiver {
                loop {
                    match receiver.try_recv() {
                        Ok(msg) => messages.push(msg),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            self.message_receiver = None;
                            break;
                        }
                    }
                }
            }
            messages
        }

        pub fn play(&mut self, request: &StreamRequest) {
            self.stop();
            self.request = Some(request.clone());
            // Fresh slots so a decode thread still winding down cannot touch this session
            self.state = Arc::new(Mutex::new(PlayerState::Loading));
            self.current_frame = Arc::new(Mutex::new(None));

            let (cmd_tx, cmd_rx) = channel();
            let (msg_tx, msg_rx) = channel();
            self.command_sender = Some(cmd_tx);
            self.message_receiver = Some(msg_rx);

            let request = request.clone();
            let state = Arc::clone(&self.state);
            let current_frame = Arc::clone(&self.current_frame);

            thread::spawn(move || {
                Self::decode_thread(request, state, current_frame, cmd_rx, msg_tx);
            });
        }

        /// Reload the last stream from scratch
        pub fn reload(&mut self) {
            if let Some(request) = self.request.clone() {
                self.play(&request);
            }
        }

        fn decode_thread(
            request: StreamRequest,
            state: Arc<Mutex<PlayerState>>,
            current_frame: Arc<Mutex<Option<DecodedFrame>>>,
            cmd_rx: Receiver<PlayerCommand>,
            msg_tx: Sender<PlayerMessage>,
        ) {
            let mut options = ffmpeg::Dictionary::new();
            options.set("user_agent", &request.user_agent);
            if let Some(ref referrer) = request.referrer {
                options.set("headers", &format!("Referer: {}\r\n", referrer));
            }
            options.set("reconnect", "1");
            options.set("reconnect_streamed", "1");
            options.set("reconnect_delay_max", "5");
            options.set("timeout", "5000000"); // 5 second timeout
            let probe_bytes = (request.buffer_secs as i64).max(1) * 1024 * 1024;
            options.set("probesize", &probe_bytes.to_string());

            let mut ictx = match ffmpeg::format::input_with_dictionary(&request.url, options) {
                Ok(ctx) => ctx,
                Err(e) => {
                    fail(&state, &msg_tx, FaultKind::Network, format!("Failed to open stream: {}", e));
                    return;
                }
            };

            let video_stream_index = match ictx.streams().best(Type::Video) {
                Some(stream) => stream.index(),
                None => {
                    fail(&state, &msg_tx, FaultKind::Other, "No video stream found".to_string());
                    return;
                }
            };

            let parameters = match ictx.stream(video_stream_index) {
                Some(stream) => stream.parameters(),
                None => {
                    fail(&state, &msg_tx, FaultKind::Other, "Video stream disappeared".to_string());
                    return;
                }
            };

            let decoder = ffmpeg::codec::context::Context::from_parameters(parameters)
                .and_then(|ctx| ctx.decoder().video());
            let mut decoder = match decoder {
                Ok(d) => d,
                Err(e) => {
                    fail(&state, &msg_tx, FaultKind::Media, format!("Failed to create decoder: {}", e));
                    return;
                }
            };

            let width = decoder.width();
            let height = decoder.height();

            // Scale to reasonable size if too large
            let (target_width, target_height) = if width > 1280 || height > 720 {
                let scale = f64::min(1280.0 / width as f64, 720.0 / height as f64);
                ((width as f64 * scale) as u32, (height as f64 * scale) as u32)
            } else {
                (width, height)
            };

            let mut scaler = match ScalingContext::get(
                decoder.format(),
                width,
                height,
                Pixel::RGB24,
                target_width,
                target_height,
                Flags::BILINEAR,
            ) {
                Ok(s) => s,
                Err(e) => {
                    fail(&state, &msg_tx, FaultKind::Media, format!("Failed to create scaler: {}", e));
                    return;
                }
            };

            set_state(&state, PlayerState::Playing);
            let _ = msg_tx.send(PlayerMessage::StateChanged(PlayerState::Playing));

            let mut paused = false;
            let mut stopped = false;
            let mut decode_errors = 0u32;
            let frame_duration = Duration::from_secs_f64(1.0 / 30.0); // Target 30fps display
            let mut last_frame_time = Instant::now();

            for (stream, packet) in ictx.packets() {
                match cmd_rx.try_recv() {
                    Ok(PlayerCommand::Stop) => {
                        stopped = true;
                        break;
                    }
                    Ok(PlayerCommand::Pause) => {
                        paused = true;
                        set_state(&state, PlayerState::Paused);
                        let _ = msg_tx.send(PlayerMessage::StateChanged(PlayerState::Paused));
                    }
                    Ok(PlayerCommand::Resume) => {
                        paused = false;
                        set_state(&state, PlayerState::Playing);
                        let _ = msg_tx.send(PlayerMessage::StateChanged(PlayerState::Playing));
                    }
                    Err(_) => {}
                }

                if paused {
                    thread::sleep(Duration::from_millis(50));
                    continue;
                }

                if stream.index() != video_stream_index {
                    continue;
                }

                if let Err(e) = decoder.send_packet(&packet) {
                    decode_errors += 1;
                    // Occasional corrupt packets are normal on live IPTV
                    let fatal = decode_errors > 50;
                    let _ = msg_tx.send(PlayerMessage::Fault(EngineFault {
                        kind: FaultKind::Media,
                        fatal,
                        detail: format!("Decode error: {}", e),
                    }));
                    if fatal {
                        set_state(&state, PlayerState::Error("Too many decode errors".to_string()));
                        return;
                    }
                    continue;
                }

                let mut decoded = VideoFrame::empty();
                while decoder.receive_frame(&mut decoded).is_ok() {
                    let mut rgb_frame = VideoFrame::empty();
                    if scaler.run(&decoded, &mut rgb_frame).is_ok() {
                        let data = rgb_frame.data(0);
                        let stride = rgb_frame.stride(0);

                        // Copy frame data (handling stride)
                        let mut frame_data = Vec::with_capacity((target_width * target_height * 3) as usize);
                        for y in 0..target_height as usize {
                            let row_start = y * stride;
                            let row_end = row_start + (target_width as usize * 3);
                            frame_data.extend_from_slice(&data[row_start..row_end]);
                        }

                        if let Ok(mut slot) = current_frame.lock() {
                            *slot = Some(DecodedFrame {
                                width: target_width,
                                height: target_height,
                                data: frame_data,
                            });
                        }

                        let elapsed = last_frame_time.elapsed();
                        if elapsed < frame_duration {
                            thread::sleep(frame_duration - elapsed);
                        }
                        last_frame_time = Instant::now();
                    }
                }
            }

            if stopped {
                set_state(&state, PlayerState::Stopped);
                let _ = msg_tx.send(PlayerMessage::Finished);
            } else {
                // A live stream has no end, running out of packets means the connection dropped
                fail(&state, &msg_tx, FaultKind::Network, "Stream ended unexpectedly".to_string());
            }
        }

        pub fn stop(&mut self) {
            if let Some(ref sender) = self.command_sender {
                let _ = sender.send(PlayerCommand::Stop);
            }
            self.command_sender = None;
            self.message_receiver = None;
            set_state(&self.state, PlayerState::Stopped);
            if let Ok(mut slot) = self.current_frame.lock() {
                *slot = None;
            }
        }

        pub fn toggle_pause(&mut self) {
            if let Some(ref sender) = self.command_sender {
                match self.state() {
                    PlayerState::Playing => {
                        let _ = sender.send(PlayerCommand::Pause);
                    }
                    PlayerState::Paused => {
                        let _ = sender.send(PlayerCommand::Resume);
                    }
                    _ => {}
                }
            }
        }
    }

    impl Drop for InternalPlayer {
        fn drop(&mut self) {
            self.stop();
        }
    }
}

// Stub implementation when internal-player feature is disabled
#[cfg(not(feature = "internal-player"))]
mod engine_impl {
    use super::{DecodedFrame, PlayerMessage, PlayerState};
    use crate::playback::StreamRequest;

    pub struct InternalPlayer {
        state: PlayerState,
    }

    impl InternalPlayer {
        pub fn new() -> Self {
            Self { state: PlayerState::Stopped }
        }

        pub fn is_available(&self) -> bool {
            false
        }

        pub fn codec_support(&self) -> Vec<(&'static str, bool)> {
            Vec::new()
        }

        pub fn state(&self) -> PlayerState {
            self.state.clone()
        }

        pub fn take_frame(&self) -> Option<DecodedFrame> {
            None
        }

        pub fn poll_messages(&mut self) -> Vec<PlayerMessage> {
            Vec::new()
        }

        pub fn play(&mut self, _request: &StreamRequest) {
            self.state = PlayerState::Error("Built-in engine not enabled. Build with --features internal-player".to_string());
        }

        pub fn reload(&mut self) {}

        pub fn stop(&mut self) {
            self.state = PlayerState::Stopped;
        }

        pub fn toggle_pause(&mut self) {}
    }
}

pub use engine_impl::InternalPlayer;

/// Built-in player surface embedded in the player window
pub struct PlayerWindow {
    pub player: InternalPlayer,
    pub texture: Option<egui::TextureHandle>,
    enabled: bool,
    last_warning: Option<String>,
}

impl PlayerWindow {
    pub fn new(enabled: bool) -> Self {
        Self {
            player: InternalPlayer::new(),
            texture: None,
            enabled,
            last_warning: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drain decode-thread messages into events for the playback controller
    pub fn poll(&mut self) -> Vec<EngineEvent> {
        let messages = self.player.poll_messages();
        messages.into_iter().filter_map(|msg| self.translate(msg)).collect()
    }

    fn translate(&mut self, msg: PlayerMessage) -> Option<EngineEvent> {
        match msg {
            PlayerMessage::Fault(fault) => {
                if !fault.fatal {
                    self.last_warning = Some(fault.detail.clone());
                }
                Some(EngineEvent::Fault(fault))
            }
            PlayerMessage::StateChanged(PlayerState::Playing) => Some(EngineEvent::Started),
            PlayerMessage::StateChanged(state) => {
                log::debug!("Engine state: {:?}", state);
                None
            }
            PlayerMessage::Finished => {
                log::debug!("Engine finished");
                None
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.player.state(), PlayerState::Playing | PlayerState::Loading | PlayerState::Paused)
    }

    /// Render the video surface and transport controls
    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        if let Some(frame) = self.player.take_frame() {
            let image = egui::ColorImage::from_rgb(
                [frame.width as usize, frame.height as usize],
                &frame.data,
            );
            self.texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
        }

        ui.vertical_centered(|ui| {
            if let Some(ref texture) = self.texture {
                let available = ui.available_size();
                let tex_size = texture.size_vec2();
                let aspect = tex_size.x / tex_size.y;

                let (width, height) = if available.x / available.y > aspect {
                    (available.y * aspect * 0.9, available.y * 0.9)
                } else {
                    (available.x * 0.9, available.x / aspect * 0.9)
                };

                ui.image((texture.id(), egui::vec2(width, height)));
            } else if matches!(self.player.state(), PlayerState::Loading) {
                ui.add_space(30.0);
                ui.spinner();
                ui.label("Connecting to stream...");
            }

            if matches!(self.player.state(), PlayerState::Playing) {
                if let Some(ref warning) = self.last_warning {
                    ui.colored_label(egui::Color32::YELLOW, format!("⚠ {}", warning));
                }
            }
        });

        if self.is_active() {
            ui.horizontal(|ui| {
                let pause_text = if matches!(self.player.state(), PlayerState::Paused) {
                    "▶ Play"
                } else {
                    "⏸ Pause"
                };
                if ui.button(pause_text).clicked() {
                    self.player.toggle_pause();
                }
            });
        }

        if matches!(self.player.state(), PlayerState::Playing | PlayerState::Loading) {
            ctx.request_repaint();
        }
    }
}

impl StreamEngine for PlayerWindow {
    fn is_available(&self) -> bool {
        self.enabled && self.player.is_available()
    }

    fn codec_support(&self) -> Vec<(&'static str, bool)> {
        self.player.codec_support()
    }

    fn load(&mut self, request: &StreamRequest) {
        self.last_warning = None;
        self.texture = None;
        self.player.play(request);
    }

    fn recover(&mut self) {
        self.texture = None;
        self.player.reload();
    }

    fn stop(&mut self) {
        self.player.stop();
        self.texture = None;
        self.last_warning = None;
    }
}
