//! Fixed city markers and the arcs that connect them

use std::borrow::Cow;
use tracing::warn;

/// A named point on the globe surface
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub name: Cow<'static, str>,
    pub lat: f32,
    pub lon: f32,
    /// Relative dot size, used by the dotted-map globe
    pub size: f32,
}

impl Marker {
    pub const fn fixed(name: &'static str, lat: f32, lon: f32, size: f32) -> Self {
        Self { name: Cow::Borrowed(name), lat, lon, size }
    }
}

/// Index pair into a marker list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArcPair {
    pub from: usize,
    pub to: usize,
}

impl ArcPair {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

pub static MARKERS: [Marker; 10] = [
    Marker::fixed("India", 20.5937, 78.9629, 0.08),
    Marker::fixed("USA", 37.0902, -95.7129, 0.06),
    Marker::fixed("London", 51.5074, -0.1278, 0.06),
    Marker::fixed("Tokyo", 35.6762, 139.6503, 0.06),
    Marker::fixed("Sydney", -33.8688, 151.2093, 0.05),
    Marker::fixed("Paris", 48.8566, 2.3522, 0.05),
    Marker::fixed("Moscow", 55.7558, 37.6173, 0.05),
    Marker::fixed("Sao Paulo", -23.5505, -46.6333, 0.05),
    Marker::fixed("Singapore", 1.3521, 103.8198, 0.05),
    Marker::fixed("Vancouver", 49.2827, -123.1207, 0.05),
];

pub const ARC_PAIRS: [ArcPair; 8] = [
    ArcPair::new(0, 1),
    ArcPair::new(0, 3),
    ArcPair::new(1, 4),
    ArcPair::new(2, 5),
    ArcPair::new(3, 8),
    ArcPair::new(6, 0),
    ArcPair::new(7, 1),
    ArcPair::new(9, 3),
];

/// Drop pairs that point outside `markers`.
pub fn valid_arcs(markers: &[Marker], arcs: &[ArcPair]) -> Vec<ArcPair> {
    arcs.iter()
        .copied()
        .filter(|pair| {
            let ok = pair.from < markers.len() && pair.to < markers.len();
            if !ok {
                warn!(from = pair.from, to = pair.to, markers = markers.len(), "skipping arc with unknown marker");
            }
            ok
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_arcs_are_valid() {
        assert_eq!(valid_arcs(&MARKERS, &ARC_PAIRS).len(), ARC_PAIRS.len());
    }

    #[test]
    fn out_of_range_arcs_are_dropped() {
        let arcs = [ArcPair::new(0, 1), ArcPair::new(2, 40)];
        assert_eq!(valid_arcs(&MARKERS[..3], &arcs), vec![ArcPair::new(0, 1)]);
    }
}
