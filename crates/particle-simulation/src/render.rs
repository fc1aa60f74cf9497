//! Render extract: what the host needs to draw a frame

use bytemuck::{Pod, Zeroable};
use particle_physics::{Particle, Vector2D};

/// One circle to draw, in canvas coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub position: Vector2D,
    pub radius: f64,
}

impl From<&Particle> for Circle {
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position,
            radius: particle.radius(),
        }
    }
}

/// GPU-compatible circle instance
/// Padded to 16 bytes so an instance buffer lines up with a WGSL `vec4<f32>`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub _padding: f32,
}

impl From<Circle> for CircleInstance {
    fn from(circle: Circle) -> Self {
        Self {
            center: [circle.position.x as f32, circle.position.y as f32],
            radius: circle.radius as f32,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<CircleInstance>(), 16);

        let instances = [
            CircleInstance::from(Circle {
                position: Vector2D::new(1.5, 2.0),
                radius: 10.0,
            }),
            CircleInstance::zeroed(),
        ];
        let floats: &[f32] = bytemuck::cast_slice(&instances);
        assert_eq!(floats, &[1.5, 2.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_circle_from_particle() {
        let p = Particle::with_state(Vector2D::new(3.0, 4.0), Vector2D::new(1.0, 0.0), 6.0, 2.0);
        assert_eq!(
            Circle::from(&p),
            Circle {
                position: Vector2D::new(3.0, 4.0),
                radius: 6.0
            }
        );
    }
}
