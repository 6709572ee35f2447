//! 背景动画引擎
//!
//! 启动时以均等概率选择两种可视化之一，之后不再切换：
//!
//! - **wave**: 网格平面，顶点高度由固定三角函数场和指针涟漪决定
//! - **network**: 粒子沿流场运动并在包围盒内环绕，相近粒子之间连线
//!
//! 引擎本身不做渲染，调用方每次显示刷新调用一次 [`Scene::step`]，
//! 然后读取顶点、粒子和相机状态自行绘制。

pub mod camera;
pub mod network;
pub mod wave;


pub use camera::{PerspectiveCamera, Ray};
pub use network::{LineSegment, Particle, ParticleNetwork};
pub use wave::WavePlane;

use glam::Vec2;
use rand::Rng;
use std::fmt;

/// 指针位置
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pointer {
    /// 尚未收到任何指针事件
    #[default]
    Absent,
    /// NDC 坐标，范围 [-1, 1]，+Y 向上
    At(Vec2),
}

impl Pointer {
    /// 从屏幕坐标（左上角为原点，+Y 向下）换算
    pub fn from_screen(x: f32, y: f32, width: f32, height: f32) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Pointer::Absent;
        }
        Pointer::At(Vec2::new(
            (x / width) * 2.0 - 1.0,
            -(y / height) * 2.0 + 1.0,
        ))
    }

    pub fn ndc(&self) -> Option<Vec2> {
        match self {
            Pointer::Absent => None,
            Pointer::At(ndc) => Some(*ndc),
        }
    }
}

/// 渲染目标尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// 动画模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Wave,
    Network,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Wave => "wave",
            Mode::Network => "network",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wave" => Ok(Mode::Wave),
            "network" => Ok(Mode::Network),
            other => Err(format!("unknown animation mode: {}", other)),
        }
    }
}

pub enum Variant {
    Wave(WavePlane),
    Network(ParticleNetwork),
}

/// 一次动画会话
pub struct Scene {
    viewport: Viewport,
    frames: u64,
    variant: Variant,
}

impl Scene {
    /// 以均等概率选择模式
    pub fn random<R: Rng>(viewport: Viewport, rng: &mut R) -> Self {
        let mode = if rng.gen_bool(0.5) {
            Mode::Wave
        } else {
            Mode::Network
        };
        Self::with_mode(mode, viewport, rng)
    }

    pub fn with_mode<R: Rng>(mode: Mode, viewport: Viewport, rng: &mut R) -> Self {
        let aspect = viewport.aspect();
        let variant = match mode {
            Mode::Wave => Variant::Wave(WavePlane::new(aspect)),
            Mode::Network => Variant::Network(ParticleNetwork::new(aspect, rng)),
        };
        log::info!("Animation scene: {} ({}x{})", mode, viewport.width, viewport.height);

        Self {
            viewport,
            frames: 0,
            variant,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.variant {
            Variant::Wave(_) => Mode::Wave,
            Variant::Network(_) => Mode::Network,
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// 已推进的帧数
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn time(&self) -> f32 {
        match &self.variant {
            Variant::Wave(plane) => plane.time(),
            Variant::Network(network) => network.time(),
        }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        match &self.variant {
            Variant::Wave(plane) => plane.camera(),
            Variant::Network(network) => network.camera(),
        }
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        match &mut self.variant {
            Variant::Wave(plane) => plane.camera_mut(),
            Variant::Network(network) => network.camera_mut(),
        }
    }

    /// 推进一帧
    pub fn step(&mut self, pointer: Pointer) {
        match &mut self.variant {
            Variant::Wave(plane) => plane.step(pointer),
            Variant::Network(network) => network.step(pointer),
        }
        self.frames += 1;
    }

    /// 更新渲染目标尺寸和相机投影
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        let aspect = self.viewport.aspect();
        self.camera_mut().set_aspect(aspect);
    }
}
