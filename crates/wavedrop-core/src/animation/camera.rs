//! 透视相机与拾取射线
//!
//! 使用右手坐标系，相机沿自身 -Z 方向观察，NDC 深度范围为 [-1, 1]。

use glam::{Mat4, Quat, Vec2, Vec3};

const PARALLEL_EPSILON: f32 = 1e-6;

/// 射线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// 单位方向向量
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// 与平面（过 `point`、法向 `normal`）求交，射线背向平面或平行时返回 `None`
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<Vec3> {
        let denom = normal.dot(self.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then(|| self.at(t))
    }
}

/// 透视相机
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// 垂直视角（度）
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub orientation: Quat,
}

impl PerspectiveCamera {
    pub fn new(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_deg,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// 相机到世界的变换
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    pub fn view(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// 世界坐标投影到 NDC
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }

    /// NDC 反投影到世界坐标
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection().inverse().project_point3(ndc)
    }

    /// 从相机位置穿过 NDC 点 `ndc` 的射线
    pub fn ray(&self, ndc: Vec2) -> Ray {
        let through = self.unproject(ndc.extend(0.5));
        Ray {
            origin: self.position,
            direction: (through - self.position).normalize_or_zero(),
        }
    }

    /// 调整朝向使 -Z 指向 `target`，上方向为 +Y
    pub fn look_at(&mut self, target: Vec3) {
        if self.position.distance_squared(target) < PARALLEL_EPSILON {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        self.orientation = Quat::from_mat4(&view.inverse()).normalize();
    }

    /// 相机朝向（世界空间）
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}
