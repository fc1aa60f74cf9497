//! Circle-vs-circle collision detection and elastic resolution
//!
//! Detection is a discrete overlap test on the current centers. Resolution
//! first pushes the pair apart along the contact normal by the minimum
//! translation distance (split by mass, the heavier body moving less), then
//! exchanges an equal-and-opposite impulse if the pair is still approaching.

use crate::constants::{FALLBACK_NORMAL, RESTITUTION};
use crate::particle::Particle;
use crate::vector;

/// What happened to an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Already moving apart: positions were corrected, velocities untouched
    Separating,
    /// Impulse applied along the contact normal
    Bounced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub resolution: Resolution,
    /// Centers coincided and the fallback normal was used
    pub degenerate: bool,
}

impl Particle {
    /// Discrete overlap test. Touching circles do not collide.
    pub fn test_collision(&self, other: &Particle) -> bool {
        let delta = other.position - self.position;
        delta.length() < self.radius() + other.radius()
    }

    /// Separate an overlapping pair and exchange impulse.
    ///
    /// Must only be called on overlapping particles; see [`Self::collide_with`].
    pub fn resolve_collision(&mut self, other: &mut Particle) -> Contact {
        let delta = self.position - other.position;
        let length = delta.length();

        let (normal, degenerate) = match vector::normalize(delta) {
            Ok(normal) => (normal, false),
            Err(err) => {
                log::trace!("{err}, separating along {FALLBACK_NORMAL}");
                (FALLBACK_NORMAL, true)
            }
        };

        // Minimum translation distance, pointing from `other` towards `self`
        let mtd = normal * (self.radius() + other.radius() - length);

        let total_mass = self.mass() + other.mass();
        self.position += mtd * (other.mass() / total_mass);
        other.position -= mtd * (self.mass() / total_mass);

        let relative = self.velocity - other.velocity;
        let vn = relative.dot(normal);
        if vn > 0.0 {
            return Contact {
                resolution: Resolution::Separating,
                degenerate,
            };
        }

        let im1 = 1.0 / self.mass();
        let im2 = 1.0 / other.mass();
        let j = -(1.0 + RESTITUTION) * vn / (im1 + im2);
        let impulse = normal * j;
        self.velocity += impulse * im1;
        other.velocity -= impulse * im2;

        Contact {
            resolution: Resolution::Bounced,
            degenerate,
        }
    }

    /// Test the pair and resolve it if it overlaps
    pub fn collide_with(&mut self, other: &mut Particle) -> Option<Contact> {
        if self.test_collision(other) {
            Some(self.resolve_collision(other))
        } else {
            None
        }
    }
}
