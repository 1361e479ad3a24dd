use nalgebra::{Isometry3, Matrix4, Orthographic3, Point3, Rotation3, Scale3, Unit, Vector3};

/// Squeezes OpenGL's [-1, 1] clip depth into the [0, 1] range wgpu expects.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Model, view and projection for a label. Layout already works in normalized
/// coordinates, so the projection is a plain [-1, 1] orthographic box.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelTransform {
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    model: Matrix4<f32>,
}

impl LabelTransform {
    pub fn new() -> Self {
        let eye = Point3::new(0.0, 0.0, 1.0);
        Self {
            projection: Orthographic3::new(-1.0, 1.0, -1.0, 1.0, 0.1, 100.0).into_inner(),
            view: Isometry3::look_at_rh(&eye, &Point3::origin(), &Vector3::y()).to_homogeneous(),
            model: Matrix4::identity(),
        }
    }

    /// Spins the model about `axis`, on top of whatever rotation it already has.
    pub fn rotate(&mut self, degrees: f32, axis: Vector3<f32>) {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), degrees.to_radians());
        self.model *= rotation.to_homogeneous();
    }

    /// Replaces the model with a plain scale.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.model = Scale3::new(x, y, z).to_homogeneous();
    }

    pub fn model(&self) -> &Matrix4<f32> {
        &self.model
    }

    pub fn model_view_projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection * self.view * self.model
    }
}

impl Default for LabelTransform {
    fn default() -> Self {
        Self::new()
    }
}
