use crate::prelude::{AntennaError, AntennaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Point3 = [f64; 3];

/// Marker name used for fed segments.
pub const EXCITATION: &str = "Excitation";

/// Load names indexed by the type field of a NEC `LD` card.
pub const NEC_LOAD_TYPES: [&str; 6] = [
    "Series RLC, absolute",
    "Parallel RLC, absolute",
    "Series RLC, per m",
    "Parallel RLC, per m",
    "Impedance",
    "Wire conductivity",
];

/// Wire structure of the simulated antenna.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Polylines through the segment end points.
    pub wires: Vec<Vec<Point3>>,
    /// Segment midpoints in global segment order.
    pub segments: Vec<Point3>,
    /// Segment midpoints grouped by wire tag.
    pub segments_by_tag: BTreeMap<i64, Vec<Point3>>,
    /// MININEC pulse locations by pulse number.
    pub pulses: BTreeMap<i64, Point3>,
    /// Loaded or excited locations grouped by load type.
    pub loads: BTreeMap<String, Vec<Point3>>,
    pub has_ground: bool,
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        self.wires.iter().all(Vec::is_empty)
    }

    pub fn add_load(&mut self, name: &str, at: Point3) {
        self.loads.entry(name.to_string()).or_default().push(at);
    }

    /// All wire points, used for bounding boxes.
    pub fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.wires.iter().flatten().copied()
    }

    /// Segment midpoints of one tag; tag 0 addresses all segments.
    pub fn segments_of(&self, tag: i64) -> AntennaResult<&[Point3]> {
        if tag == 0 {
            return Ok(&self.segments);
        }
        self.segments_by_tag
            .get(&tag)
            .map(Vec::as_slice)
            .ok_or_else(|| AntennaError::Geometry(format!("unknown wire tag {tag}")))
    }

    /// One-based segment lookup as used on NEC cards.
    pub fn segment(&self, tag: i64, number: i64) -> AntennaResult<Point3> {
        let segments = self.segments_of(tag)?;
        if number < 1 {
            return Err(AntennaError::Geometry(format!(
                "segment number {number} must be at least 1"
            )));
        }
        segments
            .get(number as usize - 1)
            .copied()
            .ok_or_else(|| {
                AntennaError::Geometry(format!("tag {tag} has no segment {number}"))
            })
    }

    pub fn pulse(&self, number: i64) -> AntennaResult<Point3> {
        self.pulses
            .get(&number)
            .copied()
            .ok_or_else(|| AntennaError::Geometry(format!("unknown pulse {number}")))
    }
}
