use std::collections::BTreeMap;

use serde::Serialize;

use crate::image_utils::{neighborhood_code, NEIGHBOR_COUNT_LUT};
use crate::mask::{Coord, Skeleton};

/// Topological role of a skeleton pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointClass {
    /// Exactly two skeleton neighbors
    Regular,
    /// At most one skeleton neighbor (crack terminus or isolated pixel)
    Endpoint,
    /// Three or more skeleton neighbors (junction)
    Branch,
}

impl PointClass {
    /// Class for a given number of 8-connected skeleton neighbors
    #[inline]
    pub fn from_neighbor_count(count: u8) -> Self {
        match count {
            0 | 1 => PointClass::Endpoint,
            2 => PointClass::Regular,
            _ => PointClass::Branch,
        }
    }
}

/// Classification of every skeleton pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub classes: BTreeMap<Coord, PointClass>,
    pub endpoint_count: usize,
    pub branch_point_count: usize,
    pub regular_count: usize,
}

impl Topology {
    pub fn class_of(&self, coord: Coord) -> Option<PointClass> {
        self.classes.get(&coord).copied()
    }

    /// Endpoints in row-major order
    pub fn endpoints(&self) -> impl Iterator<Item = Coord> + '_ {
        self.of_class(PointClass::Endpoint)
    }

    /// Branch points in row-major order
    pub fn branch_points(&self) -> impl Iterator<Item = Coord> + '_ {
        self.of_class(PointClass::Branch)
    }

    fn of_class(&self, class: PointClass) -> impl Iterator<Item = Coord> + '_ {
        self.classes
            .iter()
            .filter(move |(_, &c)| c == class)
            .map(|(&coord, _)| coord)
    }

    pub fn total(&self) -> usize {
        self.classes.len()
    }
}

/// Classify every skeleton pixel by its 8-connected skeleton neighbor count
pub fn classify_points(skeleton: &Skeleton) -> Topology {
    let mut topology = Topology {
        classes: BTreeMap::new(),
        endpoint_count: 0,
        branch_point_count: 0,
        regular_count: 0,
    };

    for coord in skeleton.pixels() {
        let code = neighborhood_code(skeleton, coord.x, coord.y);
        let class = PointClass::from_neighbor_count(NEIGHBOR_COUNT_LUT[code as usize]);
        match class {
            PointClass::Endpoint => topology.endpoint_count += 1,
            PointClass::Branch => topology.branch_point_count += 1,
            PointClass::Regular => topology.regular_count += 1,
        }
        topology.classes.insert(coord, class);
    }

    topology
}
