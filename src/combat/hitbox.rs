//! Hitbox and hurtbox geometry
//!
//! Boxes are authored in fighter-local space for a fighter facing right:
//! `x_offset` from the fighter's centre line, `y_offset` up from the feet.
//! Facing left mirrors the box around the centre line.

use serde::{Deserialize, Serialize};

use crate::core::types::{Facing, Vec2};
use crate::fighter::{ActionKind, ActionPhase};

/// Body region a strike landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitZone {
    Head,
    Body,
    Legs,
}

impl HitZone {
    /// Lower value wins when a strike overlaps several zones
    fn priority(self) -> u8 {
        match self {
            HitZone::Head => 0,
            HitZone::Body => 1,
            HitZone::Legs => 2,
        }
    }
}

/// Box in fighter-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub x_offset: f32,
    pub y_offset: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxShape {
    pub const fn new(x_offset: f32, y_offset: f32, width: f32, height: f32) -> Self {
        Self {
            x_offset,
            y_offset,
            width,
            height,
        }
    }

    /// Place the box in world space for a fighter at `origin` looking `facing`
    pub fn place(&self, origin: Vec2, facing: Facing) -> Aabb {
        let x_off = match facing {
            Facing::Right => self.x_offset,
            Facing::Left => -self.x_offset - self.width,
        };
        let min_x = origin.x + x_off;
        let min_y = origin.y + self.y_offset;
        Aabb {
            min_x,
            min_y,
            max_x: min_x + self.width,
            max_y: min_y + self.height,
        }
    }

    /// Furthest horizontal extent from the centre line, on either side
    pub fn reach(&self) -> f32 {
        (self.x_offset + self.width).abs().max(self.x_offset.abs())
    }
}

/// World-space axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}

/// One vulnerable region of a fighter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hurtbox {
    pub shape: BoxShape,
    pub zone: HitZone,
}

const fn hurt(x: f32, y: f32, w: f32, h: f32, zone: HitZone) -> Hurtbox {
    Hurtbox {
        shape: BoxShape::new(x, y, w, h),
        zone,
    }
}

/// Body posture, selects which hurtbox set is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    Standing,
    Guarding,
    Crouching,
    Extended,
}

const STANDING: [Hurtbox; 3] = [
    hurt(-15.0, 120.0, 30.0, 30.0, HitZone::Head),
    hurt(-20.0, 70.0, 40.0, 50.0, HitZone::Body),
    hurt(-18.0, 0.0, 36.0, 70.0, HitZone::Legs),
];

const GUARDING: [Hurtbox; 3] = [
    hurt(-12.0, 115.0, 24.0, 25.0, HitZone::Head),
    hurt(-25.0, 60.0, 50.0, 55.0, HitZone::Body),
    hurt(-18.0, 0.0, 36.0, 60.0, HitZone::Legs),
];

const CROUCHING: [Hurtbox; 3] = [
    hurt(-15.0, 70.0, 30.0, 25.0, HitZone::Head),
    hurt(-22.0, 30.0, 44.0, 40.0, HitZone::Body),
    hurt(-20.0, 0.0, 40.0, 30.0, HitZone::Legs),
];

const EXTENDED: [Hurtbox; 3] = [
    hurt(-15.0, 120.0, 30.0, 30.0, HitZone::Head),
    hurt(-15.0, 70.0, 50.0, 50.0, HitZone::Body),
    hurt(-18.0, 0.0, 36.0, 70.0, HitZone::Legs),
];

impl Stance {
    pub const ALL: [Stance; 4] = [Stance::Standing, Stance::Guarding, Stance::Crouching, Stance::Extended];

    pub fn hurtboxes(self) -> &'static [Hurtbox] {
        match self {
            Stance::Standing => &STANDING,
            Stance::Guarding => &GUARDING,
            Stance::Crouching => &CROUCHING,
            Stance::Extended => &EXTENDED,
        }
    }

    /// Upright posture a fighter presents while performing `kind`.
    ///
    /// A dodging fighter is only crouched during the Active window; the
    /// collision resolver checks the crouched set separately.
    pub fn upright_for(kind: ActionKind, phase: Option<ActionPhase>) -> Stance {
        match (kind, phase) {
            (ActionKind::Block, Some(_)) => Stance::Guarding,
            (k, Some(_)) if k.is_attack() => Stance::Extended,
            _ => Stance::Standing,
        }
    }
}

/// Widest hurtbox extent across every stance
pub fn widest_hurtbox_reach() -> f32 {
    Stance::ALL
        .iter()
        .flat_map(|stance| stance.hurtboxes())
        .map(|h| h.shape.reach())
        .fold(0.0, f32::max)
}

/// Largest centre-to-centre separation at which `strike` can touch any
/// hurtbox of any stance. Beyond it no overlap is possible.
pub fn contact_range(strike: &BoxShape) -> f32 {
    strike.reach() + widest_hurtbox_reach()
}

/// Highest-priority zone of `set` hit by `strike`, if any
pub fn first_zone_hit(
    strike: &Aabb,
    set: &[Hurtbox],
    defender_pos: Vec2,
    defender_facing: Facing,
) -> Option<HitZone> {
    set.iter()
        .filter(|h| strike.overlaps(&h.shape.place(defender_pos, defender_facing)))
        .map(|h| h.zone)
        .min_by_key(|zone| zone.priority())
}
