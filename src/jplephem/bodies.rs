//! Bodies and header layout slots
//!
//! A DE file stores one coefficient block per *slot*; a lookup names a *body*.
//! Most bodies map straight onto a slot. The solar-system barycenter is the
//! origin and has no slot, and the Earth is derived from the Earth-Moon
//! barycenter and Moon slots.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::constants::LAYOUT_SLOTS;

/// Coefficient block positions in the header layout table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    Mercury,
    Venus,
    EarthMoonBarycenter,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    /// Moon relative to the Earth-Moon barycenter
    Moon,
    Sun,
    Nutations,
    Librations,
}

impl Slot {
    /// All slots in file order
    pub const ALL: [Slot; LAYOUT_SLOTS] = [
        Slot::Mercury,
        Slot::Venus,
        Slot::EarthMoonBarycenter,
        Slot::Mars,
        Slot::Jupiter,
        Slot::Saturn,
        Slot::Uranus,
        Slot::Neptune,
        Slot::Pluto,
        Slot::Moon,
        Slot::Sun,
        Slot::Nutations,
        Slot::Librations,
    ];

    /// Column of this slot in the header layout table
    pub fn index(self) -> usize {
        match self {
            Slot::Mercury => 0,
            Slot::Venus => 1,
            Slot::EarthMoonBarycenter => 2,
            Slot::Mars => 3,
            Slot::Jupiter => 4,
            Slot::Saturn => 5,
            Slot::Uranus => 6,
            Slot::Neptune => 7,
            Slot::Pluto => 8,
            Slot::Moon => 9,
            Slot::Sun => 10,
            Slot::Nutations => 11,
            Slot::Librations => 12,
        }
    }
}

/// A body that can be used as lookup target or center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Moon,
    Sun,
    SolarSystemBarycenter,
    EarthMoonBarycenter,
}

impl Body {
    /// Every body, in JPL index order
    pub const ALL: [Body; 13] = [
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::Moon,
        Body::Sun,
        Body::SolarSystemBarycenter,
        Body::EarthMoonBarycenter,
    ];

    /// Canonical display name
    pub fn name(&self) -> &'static str {
        match self {
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::Moon => "Moon",
            Body::Sun => "Sun",
            Body::SolarSystemBarycenter => "Solar System Barycenter",
            Body::EarthMoonBarycenter => "Earth-Moon Barycenter",
        }
    }

    /// Conventional JPL `PLEPH` body number (0-based)
    pub fn jpl_index(&self) -> usize {
        match self {
            Body::Mercury => 0,
            Body::Venus => 1,
            Body::Earth => 2,
            Body::Mars => 3,
            Body::Jupiter => 4,
            Body::Saturn => 5,
            Body::Uranus => 6,
            Body::Neptune => 7,
            Body::Pluto => 8,
            Body::Moon => 9,
            Body::Sun => 10,
            Body::SolarSystemBarycenter => 11,
            Body::EarthMoonBarycenter => 12,
        }
    }

    /// Body with the given JPL `PLEPH` number
    pub fn from_jpl_index(index: usize) -> Option<Body> {
        Body::ALL.get(index).copied()
    }

    /// The slot holding this body's own series, if it has one
    ///
    /// The barycenter is the origin and the Earth is derived, so both return `None`.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Body::Mercury => Some(Slot::Mercury),
            Body::Venus => Some(Slot::Venus),
            Body::Mars => Some(Slot::Mars),
            Body::Jupiter => Some(Slot::Jupiter),
            Body::Saturn => Some(Slot::Saturn),
            Body::Uranus => Some(Slot::Uranus),
            Body::Neptune => Some(Slot::Neptune),
            Body::Pluto => Some(Slot::Pluto),
            Body::Moon => Some(Slot::Moon),
            Body::Sun => Some(Slot::Sun),
            Body::EarthMoonBarycenter => Some(Slot::EarthMoonBarycenter),
            Body::Earth | Body::SolarSystemBarycenter => None,
        }
    }

    /// Slots whose series are needed to build this body's barycentric state
    pub fn required_slots(&self) -> &'static [Slot] {
        match self {
            Body::SolarSystemBarycenter => &[],
            Body::Moon | Body::Earth => &[Slot::Moon, Slot::EarthMoonBarycenter],
            Body::Mercury => &[Slot::Mercury],
            Body::Venus => &[Slot::Venus],
            Body::Mars => &[Slot::Mars],
            Body::Jupiter => &[Slot::Jupiter],
            Body::Saturn => &[Slot::Saturn],
            Body::Uranus => &[Slot::Uranus],
            Body::Neptune => &[Slot::Neptune],
            Body::Pluto => &[Slot::Pluto],
            Body::Sun => &[Slot::Sun],
            Body::EarthMoonBarycenter => &[Slot::EarthMoonBarycenter],
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

lazy_static! {
    /// Map from lowercase names and aliases to bodies
    static ref BODY_NAMES: HashMap<&'static str, Body> = {
        let mut m = HashMap::new();
        for &(name, body) in BODY_NAME_PAIRS.iter() {
            m.insert(name, body);
        }
        m
    };
}

/// Pairs of (lowercase name, body), aliases included
const BODY_NAME_PAIRS: &[(&str, Body)] = &[
    ("mercury", Body::Mercury),
    ("venus", Body::Venus),
    ("earth", Body::Earth),
    ("mars", Body::Mars),
    ("jupiter", Body::Jupiter),
    ("saturn", Body::Saturn),
    ("uranus", Body::Uranus),
    ("neptune", Body::Neptune),
    ("pluto", Body::Pluto),
    ("moon", Body::Moon),
    ("sun", Body::Sun),
    ("ssb", Body::SolarSystemBarycenter),
    ("solar system barycenter", Body::SolarSystemBarycenter),
    ("solar_system_barycenter", Body::SolarSystemBarycenter),
    ("barycenter", Body::SolarSystemBarycenter),
    ("emb", Body::EarthMoonBarycenter),
    ("earth-moon barycenter", Body::EarthMoonBarycenter),
    ("earth moon barycenter", Body::EarthMoonBarycenter),
    ("earth_barycenter", Body::EarthMoonBarycenter),
];

/// Look a body up by name or alias, case-insensitively
pub fn body_from_name(name: &str) -> Option<Body> {
    BODY_NAMES.get(name.trim().to_lowercase().as_str()).copied()
}

impl FromStr for Body {
    type Err = String;

    /// Accepts a name, an alias or a JPL body number
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(body) = body_from_name(s) {
            return Ok(body);
        }
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(Body::from_jpl_index)
            .ok_or_else(|| format!("unknown body: {}", s))
    }
}
