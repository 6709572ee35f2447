//! Application state

use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use wavedrop_core::animation::{Mode, Pointer, Scene, Viewport};
use wavedrop_core::{LogBuffer, LogEntry, LogLevel};

use crate::ui;

const LOG_CAPACITY: usize = 200;
const EVENT_CAPACITY: usize = 256;

pub enum AppEvent {
    Log(LogEntry),
}

pub type EventChannel = (mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>);

/// 事件通道，需在日志系统初始化之前创建
pub fn event_channel() -> EventChannel {
    mpsc::channel(EVENT_CAPACITY)
}

/// 每秒帧数统计
#[derive(Debug)]
pub struct FrameCounter {
    window_start: Instant,
    frames: u32,
    fps: f64,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    pub fn record(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.fps = f64::from(self.frames) / elapsed.as_secs_f64();
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

pub struct App {
    pub scene: Scene,
    pub pointer: Pointer,
    pub logs: LogBuffer,
    pub show_help: bool,
    pub frames: FrameCounter,
    /// 终端区域
    pub area: Rect,
    pub event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    pub fn new(mode: Option<Mode>, area: Rect) -> Self {
        Self::with_events(mode, area, event_channel())
    }

    /// 使用已有的事件通道创建，场景初始化期间的日志也会进入缓冲区
    pub fn with_events(
        mode: Option<Mode>,
        area: Rect,
        (event_tx, event_rx): EventChannel,
    ) -> Self {
        let viewport = viewport_for(area);
        let mut rng = rand::thread_rng();
        let scene = match mode {
            Some(mode) => Scene::with_mode(mode, viewport, &mut rng),
            None => Scene::random(viewport, &mut rng),
        };

        Self {
            scene,
            pointer: Pointer::Absent,
            logs: LogBuffer::new(LOG_CAPACITY),
            show_help: false,
            frames: FrameCounter::new(),
            area,
            event_tx,
            event_rx,
        }
    }

    /// 终端尺寸变化时更新画布和相机
    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        let viewport = viewport_for(self.area);
        self.scene.resize(viewport.width, viewport.height);
        tracing::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
    }

    /// 鼠标位置（终端单元格坐标）换算为指针
    pub fn move_pointer(&mut self, column: u16, row: u16) {
        let canvas = ui::canvas_inner(self.area);
        if !canvas.contains((column, row).into()) {
            return;
        }
        self.pointer = Pointer::from_screen(
            f32::from(column - canvas.x) + 0.5,
            f32::from(row - canvas.y) + 0.5,
            f32::from(canvas.width),
            f32::from(canvas.height),
        );
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// 在 Info 和 Debug 之间切换显示级别
    pub fn toggle_log_level(&mut self) {
        let next = if self.logs.min_level() >= LogLevel::Debug {
            LogLevel::Info
        } else {
            LogLevel::Debug
        };
        self.logs.set_min_level(next);
        self.add_log(LogLevel::Info, format!("日志级别: {}", next));
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    pub fn add_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogEntry::new(level, message));
    }

    /// 推进一帧
    pub fn tick(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::Log(entry) => {
                    self.logs.push(entry);
                }
            }
        }

        self.scene.step(self.pointer);
        self.frames.record();
    }
}

/// 画布内部尺寸，以盲文点为单位（每个单元格 2x4 点）
fn viewport_for(area: Rect) -> Viewport {
    let canvas = ui::canvas_inner(area);
    Viewport::new(u32::from(canvas.width) * 2, u32::from(canvas.height) * 4)
}
