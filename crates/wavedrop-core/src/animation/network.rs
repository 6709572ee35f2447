//! 粒子网络
//!
//! 粒子沿三角函数流场运动，在包围盒边界环绕，被指针排斥。
//! 每帧对所有粒子对做一次 O(n²) 扫描，距离小于连接距离的粒子之间连线。

use super::Pointer;
use super::camera::PerspectiveCamera;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::Rng;
use std::f32::consts::PI;

pub const PARTICLE_COUNT: usize = 450;
/// 包围盒半边长
pub const BOUNDS: Vec3 = Vec3::new(100.0, 60.0, 150.0);
pub const TIME_STEP: f32 = 0.01;
pub const FLOW_FREQUENCY: f32 = 0.02;
pub const FLOW_SPEED: f32 = 0.15;
pub const REPEL_RADIUS: f32 = 20.0;
pub const REPEL_STRENGTH: f32 = 0.05;
pub const CONNECT_DISTANCE: f32 = 25.0;
/// 整个系统每帧绕 Y 轴旋转的角度
pub const SYSTEM_SPIN: f32 = 0.001;
/// 相机视差的最大偏移
pub const PARALLAX_RANGE: f32 = 10.0;
pub const PARALLAX_EASING: f32 = 0.05;

const CAMERA_FOV: f32 = 75.0;
const CAMERA_NEAR: f32 = 1.0;
const CAMERA_FAR: f32 = 1000.0;
const CAMERA_DISTANCE: f32 = 100.0;

/// 流场速度
pub fn flow_velocity(p: Vec3, time: f32) -> Vec3 {
    Vec3::new(
        (p.y * FLOW_FREQUENCY + time).sin(),
        (p.z * FLOW_FREQUENCY + time).cos(),
        (p.x * FLOW_FREQUENCY + time).sin(),
    ) * FLOW_SPEED
}

/// 超出一侧边界的坐标从另一侧出现
pub fn wrap_toroidal(p: Vec3) -> Vec3 {
    fn wrap(v: f32, limit: f32) -> f32 {
        if v > limit {
            -limit
        } else if v < -limit {
            limit
        } else {
            v
        }
    }
    Vec3::new(
        wrap(p.x, BOUNDS.x),
        wrap(p.y, BOUNDS.y),
        wrap(p.z, BOUNDS.z),
    )
}

/// 在 XY 平面内把粒子推离指针位置
pub fn repel(p: Vec3, pointer: Vec3) -> Vec3 {
    let delta = (p - pointer).truncate();
    let distance = delta.length();
    if distance >= REPEL_RADIUS {
        return p;
    }
    let force = (REPEL_RADIUS - distance) / REPEL_RADIUS;
    let push = delta * REPEL_STRENGTH * force;
    p + push.extend(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// 欧拉角（XYZ 顺序）
    pub rotation: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
}

/// 距离小于 `max_distance` 的所有粒子对（i < j）
pub fn connect(positions: &[Vec3], max_distance: f32) -> Vec<LineSegment> {
    let max_sq = max_distance * max_distance;
    let mut segments = Vec::new();
    for (i, &a) in positions.iter().enumerate() {
        for &b in &positions[i + 1..] {
            if a.distance_squared(b) < max_sq {
                segments.push(LineSegment { start: a, end: b });
            }
        }
    }
    segments
}

pub struct ParticleNetwork {
    camera: PerspectiveCamera,
    particles: Vec<Particle>,
    connections: Vec<LineSegment>,
    time: f32,
    system_rotation: f32,
}

impl ParticleNetwork {
    /// 在包围盒内随机生成 `PARTICLE_COUNT` 个粒子
    pub fn new<R: Rng>(aspect: f32, rng: &mut R) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|_| Particle {
                position: Vec3::new(
                    rng.gen_range(-BOUNDS.x..BOUNDS.x),
                    rng.gen_range(-BOUNDS.y..BOUNDS.y),
                    rng.gen_range(-BOUNDS.z..BOUNDS.z),
                ),
                rotation: Vec3::new(
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                ),
            })
            .collect();
        Self::with_particles(aspect, particles)
    }

    pub fn from_positions(aspect: f32, positions: impl IntoIterator<Item = Vec3>) -> Self {
        let particles = positions
            .into_iter()
            .map(|position| Particle {
                position,
                rotation: Vec3::ZERO,
            })
            .collect();
        Self::with_particles(aspect, particles)
    }

    fn with_particles(aspect: f32, particles: Vec<Particle>) -> Self {
        let mut camera = PerspectiveCamera::new(CAMERA_FOV, aspect, CAMERA_NEAR, CAMERA_FAR);
        camera.position = Vec3::new(0.0, 0.0, CAMERA_DISTANCE);

        Self {
            camera,
            particles,
            connections: Vec::new(),
            time: 0.0,
            system_rotation: 0.0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// 上一帧计算出的连线（粒子局部坐标）
    pub fn connections(&self) -> &[LineSegment] {
        &self.connections
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn system_rotation(&self) -> f32 {
        self.system_rotation
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    /// 指针在 z = 0 平面上的世界坐标
    pub fn pointer_world(&self, pointer: Pointer) -> Option<Vec3> {
        let ndc = pointer.ndc()?;
        self.camera.ray(ndc).intersect_plane(Vec3::ZERO, Vec3::Z)
    }

    /// 第 `i` 个粒子实例的变换矩阵（含系统整体旋转）
    pub fn instance_transform(&self, i: usize) -> Mat4 {
        let particle = &self.particles[i];
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            particle.rotation.x,
            particle.rotation.y,
            particle.rotation.z,
        );
        Mat4::from_rotation_y(self.system_rotation)
            * Mat4::from_rotation_translation(rotation, particle.position)
    }

    /// 局部坐标转换到世界坐标
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        Quat::from_rotation_y(self.system_rotation) * local
    }

    /// 推进一帧
    pub fn step(&mut self, pointer: Pointer) {
        self.time += TIME_STEP;
        let time = self.time;
        let target = self.pointer_world(pointer);

        for (i, particle) in self.particles.iter_mut().enumerate() {
            let moved = particle.position + flow_velocity(particle.position, time);
            let mut position = wrap_toroidal(moved);
            if let Some(target) = target {
                position = repel(position, target);
            }
            particle.position = position;

            let phase = i as f32 * 0.1;
            particle.rotation.x = time * 0.1 + phase;
            particle.rotation.y = time * 0.05 + phase;
        }

        let positions: Vec<Vec3> = self.particles.iter().map(|p| p.position).collect();
        self.connections = connect(&positions, CONNECT_DISTANCE);

        self.system_rotation += SYSTEM_SPIN;
        self.update_parallax(pointer);
    }

    /// 相机向指针偏移位置做指数平滑，然后看向原点
    ///
    /// 没有指针时以屏幕中心为目标。
    fn update_parallax(&mut self, pointer: Pointer) {
        let ndc = pointer.ndc().unwrap_or(Vec2::ZERO);
        let target = Vec2::new(ndc.x * PARALLAX_RANGE, -ndc.y * PARALLAX_RANGE);

        let position = &mut self.camera.position;
        position.x += (target.x - position.x) * PARALLAX_EASING;
        position.y += (target.y - position.y) * PARALLAX_EASING;
        self.camera.look_at(Vec3::ZERO);
    }
}
