//! Wavedrop TUI - 终端背景动画查看器
//!
//! 启动时随机选择 wave 或 network 动画，每帧推进一次，鼠标位置作为指针。
//!
//! # 日志
//!
//! 最新的日志显示在状态栏中。
//! 如需输出到文件进行调试，设置 RUST_LOG 环境变量：
//!
//! ```bash
//! RUST_LOG=debug cargo run -p wavedrop-tui 2>> /tmp/wavedrop.log
//! ```

mod app;
mod tui_log;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io;
use std::time::{Duration, Instant};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wavedrop_core::animation::Mode;

use app::App;
use tui_log::TuiLogLayer;

#[derive(Parser, Debug)]
#[command(name = "wavedrop-tui", version, about = "Wavedrop 背景动画")]
struct Args {
    /// 动画模式 (wave, network)，不指定则随机选择
    #[arg(short, long)]
    mode: Option<Mode>,
    /// 目标帧率
    #[arg(long, default_value = "60")]
    fps: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 先初始化日志系统，场景创建时的日志也能发送到 TUI 状态栏
    let events = app::event_channel();
    init_logging(events.0.clone());

    let size = terminal.size()?;
    let area = Rect::new(0, 0, size.width, size.height);
    let app = App::with_events(args.mode, area, events);

    // Run app
    let frame_time = Duration::from_secs(1) / args.fps.max(1);
    let res = run_app(&mut terminal, app, frame_time);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// 初始化日志系统
///
/// - 总是将日志发送到 TUI 状态栏
/// - 如果设置了 RUST_LOG，同时输出到 stderr（用于调试）
fn init_logging(log_tx: tokio::sync::mpsc::Sender<app::AppEvent>) {
    // 桥接 log crate（wavedrop-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let tui_layer = TuiLogLayer::new(log_tx);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wavedrop_core=debug"));

    if std::env::var("RUST_LOG").is_ok() {
        use tracing_subscriber::fmt;

        let stderr_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .with(stderr_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .try_init();
    }
}

/// 渲染循环：每帧绘制一次，帧间处理终端事件
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    frame_time: Duration,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        let timeout = frame_time.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('h') => app.toggle_help(),
                    KeyCode::Char('d') => app.toggle_log_level(),
                    KeyCode::Char('c') => app.clear_logs(),
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                        app.move_pointer(mouse.column, mouse.row);
                    }
                }
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if last_frame.elapsed() >= frame_time {
            last_frame = Instant::now();
            app.tick();
        }
    }
}
