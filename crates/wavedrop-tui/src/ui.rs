//! UI rendering module

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Block, Borders, Clear, Paragraph, Wrap,
        canvas::{Canvas, Context, Line as CanvasLine, Points},
    },
};
use wavedrop_core::animation::network::ParticleNetwork;
use wavedrop_core::animation::wave::WavePlane;
use wavedrop_core::animation::{Mode, PerspectiveCamera, Variant};
use wavedrop_core::glam::Vec3;

use crate::app::App;

const STATUS_HEIGHT: u16 = 3;

fn split(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),                // Canvas
            Constraint::Length(STATUS_HEIGHT), // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1]]
}

/// 画布边框内的区域
pub fn canvas_inner(area: Rect) -> Rect {
    let [canvas, _] = split(area);
    Block::default().borders(Borders::ALL).inner(canvas)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let [canvas, status] = split(frame.area());

    draw_scene(frame, app, canvas);
    draw_status_bar(frame, app, status);

    if app.show_help {
        draw_help(frame, frame.area());
    }
}

fn draw_scene(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.scene.mode() {
        Mode::Wave => " 🌊 wave ",
        Mode::Network => " 🕸️ network ",
    };

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| match app.scene.variant() {
            Variant::Wave(plane) => paint_wave(ctx, plane),
            Variant::Network(network) => paint_network(ctx, network),
        });

    frame.render_widget(canvas, area);
}

/// 世界坐标投影到画布坐标，落在视锥外时返回 `None`
fn to_canvas(camera: &PerspectiveCamera, world: Vec3) -> Option<(f64, f64)> {
    let ndc = camera.project(world);
    let visible = ndc.z.abs() <= 1.0 && ndc.x.abs() <= 1.2 && ndc.y.abs() <= 1.2;
    visible.then(|| (f64::from(ndc.x), f64::from(ndc.y)))
}

fn draw_segment(
    ctx: &mut Context<'_>,
    a: Option<(f64, f64)>,
    b: Option<(f64, f64)>,
    color: Color,
) {
    if let (Some((x1, y1)), Some((x2, y2))) = (a, b) {
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

/// 线框网格
fn paint_wave(ctx: &mut Context<'_>, plane: &WavePlane) {
    let camera = plane.camera();
    let columns = plane.columns();
    let projected: Vec<Option<(f64, f64)>> = plane
        .world_vertices()
        .map(|v| to_canvas(camera, v))
        .collect();

    for (i, &point) in projected.iter().enumerate() {
        let color = if plane.heights()[i] > 0.0 {
            Color::Gray
        } else {
            Color::DarkGray
        };
        if (i + 1) % columns != 0 {
            draw_segment(ctx, point, projected[i + 1], color);
        }
        if let Some(&below) = projected.get(i + columns) {
            draw_segment(ctx, point, below, color);
        }
    }
}

fn paint_network(ctx: &mut Context<'_>, network: &ParticleNetwork) {
    let camera = network.camera();

    for segment in network.connections() {
        draw_segment(
            ctx,
            to_canvas(camera, network.to_world(segment.start)),
            to_canvas(camera, network.to_world(segment.end)),
            Color::DarkGray,
        );
    }

    ctx.layer();

    let coords: Vec<(f64, f64)> = network
        .particles()
        .iter()
        .filter_map(|p| to_canvas(camera, network.to_world(p.position)))
        .collect();
    ctx.draw(&Points {
        coords: &coords,
        color: Color::Gray,
    });
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let latest = app
        .logs
        .latest()
        .map(ToString::to_string)
        .unwrap_or_default();

    let status = Paragraph::new(format!(
        " {} │ t={:.2} │ {:.0} fps │ [h]帮助 [q]退出 │ {}",
        app.scene.mode(),
        app.scene.time(),
        app.frames.fps(),
        latest
    ))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let popup = centered(area, 40, 9);
    let help_text = "移动鼠标与动画交互\n\n\
        h    显示/隐藏帮助\n\
        d    切换日志级别\n\
        c    清空日志\n\
        q    退出";

    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" 帮助 "))
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup);
    frame.render_widget(help, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_canvas_inner_leaves_status_bar() {
        let inner = canvas_inner(Rect::new(0, 0, 80, 24));
        assert_eq!(inner, Rect::new(1, 1, 78, 24 - STATUS_HEIGHT - 2));
    }

    #[test]
    fn test_draw_both_modes() {
        for mode in [Mode::Wave, Mode::Network] {
            let mut app = App::new(Some(mode), Rect::new(0, 0, 80, 24));
            app.tick();
            app.show_help = true;

            let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
            terminal.draw(|f| draw(f, &app)).unwrap();

            let buffer = terminal.backend().buffer();
            let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
            assert!(text.contains(mode.name()), "{}", mode);
        }
    }
}
