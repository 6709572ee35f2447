//! TUI 日志层
//!
//! 自定义 tracing Layer，将日志转换为 [`LogEntry`] 发送到查看器状态栏。

use crate::app::AppEvent;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use wavedrop_core::{LogEntry, LogLevel};

pub struct TuiLogLayer {
    tx: mpsc::Sender<AppEvent>,
}

impl TuiLogLayer {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = level_of(event.metadata().level());

        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        if message.is_empty() {
            message = event.metadata().target().to_string();
        }

        // 通道满时丢弃，不阻塞渲染循环
        let _ = self
            .tx
            .try_send(AppEvent::Log(LogEntry::new(level, message)));
    }
}

fn level_of(level: &tracing::Level) -> LogLevel {
    level.as_str().parse().unwrap_or(LogLevel::Info)
}

/// 提取事件中的 message 字段，没有时使用第一个字段
struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        } else if self.0.is_empty() {
            *self.0 = format!("{}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.0 = value.to_string();
        } else if self.0.is_empty() {
            *self.0 = format!("{}={}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_of(&tracing::Level::WARN), LogLevel::Warn);
        assert_eq!(level_of(&tracing::Level::TRACE), LogLevel::Trace);
    }
}
