//! 波浪平面
//!
//! 150 x 150 的网格平面，每帧顶点高度由三项固定的正弦/余弦波叠加，
//! 指针附近再叠加一个随距离线性衰减的涟漪。

use super::Pointer;
use super::camera::PerspectiveCamera;
use glam::{Quat, Vec2, Vec3};

pub const PLANE_SIZE: f32 = 150.0;
pub const SEGMENTS: usize = 64;
/// 指针影响半径
pub const INTERACTION_RADIUS: f32 = 15.0;
pub const TIME_STEP: f32 = 0.01;
/// 平面绕 Z 轴旋转的速度（弧度 / 时间单位）
pub const SPIN_RATE: f32 = 0.05;

const CAMERA_FOV: f32 = 75.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;
const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 20.0, 50.0);
const CAMERA_PITCH: f32 = -0.5;

/// 不含指针影响的顶点高度
pub fn wave_height(x: f32, y: f32, time: f32) -> f32 {
    (x * 0.1 + time).sin() * 5.0
        + (y * 0.1 + time).cos() * 5.0
        + ((x + y) * 0.05 + time * 0.5).sin() * 3.0
}

/// 与指针交点距离为 `distance` 的顶点附加高度
pub fn interaction_bump(distance: f32, time: f32) -> f32 {
    if distance >= INTERACTION_RADIUS {
        return 0.0;
    }
    let force = (INTERACTION_RADIUS - distance) / INTERACTION_RADIUS;
    (distance * 0.8 - time * 5.0).sin() * 2.0 * force
}

pub struct WavePlane {
    camera: PerspectiveCamera,
    /// 原始 (x, y)，不随时间变化
    base: Vec<Vec2>,
    heights: Vec<f32>,
    time: f32,
    rotation_z: f32,
}

impl WavePlane {
    pub fn new(aspect: f32) -> Self {
        let mut camera = PerspectiveCamera::new(CAMERA_FOV, aspect, CAMERA_NEAR, CAMERA_FAR);
        camera.position = CAMERA_POSITION;
        camera.orientation = Quat::from_rotation_x(CAMERA_PITCH);

        let base = grid_vertices(PLANE_SIZE, SEGMENTS);
        let heights = vec![0.0; base.len()];

        Self {
            camera,
            base,
            heights,
            time: 0.0,
            rotation_z: 0.0,
        }
    }

    /// 每行顶点数
    pub fn columns(&self) -> usize {
        SEGMENTS + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    pub fn base_positions(&self) -> &[Vec2] {
        &self.base
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn rotation(&self) -> f32 {
        self.rotation_z
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    /// 第 `i` 个顶点的世界坐标
    pub fn world_vertex(&self, i: usize) -> Vec3 {
        let local = self.base[i].extend(self.heights[i]);
        Quat::from_rotation_z(self.rotation_z) * local
    }

    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        (0..self.base.len()).map(|i| self.world_vertex(i))
    }

    /// 指针射线与平面（平面局部坐标 z = 0）的交点，局部坐标
    ///
    /// 交点落在平面范围外时返回 `None`。
    pub fn pointer_hit(&self, pointer: Pointer) -> Option<Vec2> {
        let ndc = pointer.ndc()?;
        let ray = self.camera.ray(ndc);

        let rotation = Quat::from_rotation_z(self.rotation_z);
        let normal = rotation * Vec3::Z;
        let world = ray.intersect_plane(Vec3::ZERO, normal)?;
        let local = (rotation.inverse() * world).truncate();

        let half = PLANE_SIZE / 2.0;
        (local.x.abs() <= half && local.y.abs() <= half).then_some(local)
    }

    /// 按时间 `time` 和局部交点 `hit` 重新计算所有顶点高度
    pub fn displace(&mut self, time: f32, hit: Option<Vec2>) {
        for (height, base) in self.heights.iter_mut().zip(&self.base) {
            let mut z = wave_height(base.x, base.y, time);
            if let Some(hit) = hit {
                z += interaction_bump(base.distance(hit), time);
            }
            *height = z;
        }
    }

    /// 推进一帧
    pub fn step(&mut self, pointer: Pointer) {
        self.time += TIME_STEP;
        // 射线检测使用上一帧的平面旋转
        let hit = self.pointer_hit(pointer);
        self.displace(self.time, hit);
        self.rotation_z = self.time * SPIN_RATE;
    }
}

/// 生成 XY 平面上的网格顶点，行优先，从左上角开始
fn grid_vertices(size: f32, segments: usize) -> Vec<Vec2> {
    let half = size / 2.0;
    let step = size / segments as f32;
    let mut vertices = Vec::with_capacity((segments + 1) * (segments + 1));
    for iy in 0..=segments {
        let y = half - iy as f32 * step;
        for ix in 0..=segments {
            let x = ix as f32 * step - half;
            vertices.push(Vec2::new(x, y));
        }
    }
    vertices
}
