use serde::*;
use std::fmt;

/// A single arena cell, packed into 16 bits so it can key maps cheaply.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Location {
    packed: u16,
}

impl Location {
    pub fn from_coords(x: u32, y: u32) -> Self {
        Location {
            packed: ((x << 8) | y) as u16,
        }
    }

    pub const fn from_xy(x: u8, y: u8) -> Self {
        Location {
            packed: ((x as u16) << 8) | y as u16,
        }
    }

    /// Build a location from signed coordinates, rejecting anything that
    /// does not fit the packed representation.
    pub fn checked(x: i32, y: i32) -> Option<Self> {
        if (0..=u8::MAX as i32).contains(&x) && (0..=u8::MAX as i32).contains(&y) {
            Some(Location::from_xy(x as u8, y as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn x(self) -> u8 {
        ((self.packed >> 8) & 0xFF) as u8
    }

    #[inline]
    pub fn y(self) -> u8 {
        (self.packed & 0xFF) as u8
    }

    #[inline]
    pub fn packed_repr(self) -> u16 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u16) -> Self {
        Location { packed }
    }

    /// Squared Euclidean distance. Exact, so it is used for all radius
    /// checks and distance ordering.
    pub fn distance_squared_to(self, other: Self) -> u32 {
        let dx = self.x() as i32 - other.x() as i32;
        let dy = self.y() as i32 - other.y() as i32;
        (dx * dx + dy * dy) as u32
    }

    pub fn distance_to(self, other: Self) -> f32 {
        (self.distance_squared_to(other) as f32).sqrt()
    }

    pub fn within_radius(self, other: Self, radius: f32) -> bool {
        (self.distance_squared_to(other) as f32) <= radius * radius
    }

    /// Offset by a signed delta, returning `None` when the result leaves the
    /// representable range.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Location::checked(self.x() as i32 + dx, self.y() as i32 + dy)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x(), self.y())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x(), self.y())
    }
}

impl From<(u8, u8)> for Location {
    fn from((x, y): (u8, u8)) -> Self {
        Location::from_xy(x, y)
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u16::deserialize(deserializer).map(Location::from_packed)
    }
}

/// Builds a `Vec<Location>` from a static coordinate table.
pub fn locations(coords: &[(u8, u8)]) -> Vec<Location> {
    coords.iter().map(|&c| Location::from(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks_coordinates() {
        let loc = Location::from_xy(27, 13);
        assert_eq!(loc.x(), 27);
        assert_eq!(loc.y(), 13);
        assert_eq!(Location::from_packed(loc.packed_repr()), loc);
        assert_eq!(Location::from_coords(27, 13), loc);
    }

    #[test]
    fn radius_check_is_inclusive() {
        let origin = Location::from_xy(10, 10);
        assert!(origin.within_radius(Location::from_xy(12, 10), 2.0));
        assert!(!origin.within_radius(Location::from_xy(12, 11), 2.0));
        assert!(origin.within_radius(Location::from_xy(12, 12), 3.0));
        assert_eq!(origin.distance_squared_to(Location::from_xy(13, 14)), 25);
        assert!((origin.distance_to(Location::from_xy(13, 14)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        assert_eq!(Location::from_xy(0, 3).offset(-1, 0), None);
        assert_eq!(
            Location::from_xy(1, 3).offset(-1, 1),
            Some(Location::from_xy(0, 4))
        );
    }
}
