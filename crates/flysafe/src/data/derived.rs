//! Lookups computed once at load time.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};

use super::aggregate::HeatmapGrid;
use super::{AccidentRecord, CleanedRecord, ImpactRecord};

/// Color of the least deadly accident node.
pub const ACCIDENT_START_COLOR: Rgb = Rgb(89, 14, 158);

/// Color of the deadliest accident node.
pub const ACCIDENT_END_COLOR: Rgb = Rgb(131, 85, 238);

/// Color of every regulation node.
pub const REGULATION_COLOR: &str = "#FF983D";

/// An opaque color, rendered as `rgb(r,g,b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Interpolate between the accident endpoint colors.
///
/// The denominator is floored at 1, so a constant fatality column maps
/// every node to the start color. Values outside `[min, max]` are clamped.
#[must_use]
pub fn scale_color(value: u32, min: u32, max: u32) -> Rgb {
    let span = f64::from(max.saturating_sub(min).max(1));
    let t = (f64::from(value.saturating_sub(min)) / span).clamp(0.0, 1.0);
    Rgb(
        lerp(ACCIDENT_START_COLOR.0, ACCIDENT_END_COLOR.0, t),
        lerp(ACCIDENT_START_COLOR.1, ACCIDENT_END_COLOR.1, t),
        lerp(ACCIDENT_START_COLOR.2, ACCIDENT_END_COLOR.2, t),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(start: u8, end: u8, t: f64) -> u8 {
    let value = f64::from(start) + t * (f64::from(end) - f64::from(start));
    value.trunc().clamp(0.0, 255.0) as u8
}

/// Sankey vertices: one per accident, then one per regulation tag.
///
/// Labels are unique. An accident whose label is already taken gets a
/// ` #2`, ` #3`, ... suffix so flows from distinct accidents never merge.
#[derive(Debug, Clone, Default)]
pub struct SankeyNodes {
    labels: Vec<String>,
    colors: Vec<String>,
    accidents: Vec<usize>,
    tags: BTreeMap<String, usize>,
    index: HashMap<String, usize>,
}

impl SankeyNodes {
    /// Build the node table for `impacts`.
    #[must_use]
    pub fn build(impacts: &[ImpactRecord]) -> Self {
        let mut nodes = Self::default();

        let min = impacts.iter().map(|r| r.total_fatality).min().unwrap_or(0);
        let max = impacts.iter().map(|r| r.total_fatality).max().unwrap_or(0);

        for record in impacts {
            let color = scale_color(record.total_fatality, min, max).to_string();
            let node = nodes.claim(record.accident_key(), color);
            nodes.accidents.push(node);
        }

        let tags: BTreeSet<&str> = impacts
            .iter()
            .flat_map(|r| r.impacts.iter().map(String::as_str))
            .collect();
        for tag in tags {
            let node = nodes.claim(tag.to_string(), REGULATION_COLOR.to_string());
            nodes.tags.insert(tag.to_string(), node);
        }

        nodes
    }

    fn claim(&mut self, base: String, color: String) -> usize {
        let mut label = base.clone();
        let mut n = 1;
        while self.index.contains_key(&label) {
            n += 1;
            label = format!("{base} #{n}");
        }
        let node = self.labels.len();
        self.index.insert(label.clone(), node);
        self.labels.push(label);
        self.colors.push(color);
        node
    }

    /// Node labels by index.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Node colors by index.
    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Node of the impact record at `position`.
    #[must_use]
    pub fn accident_node(&self, position: usize) -> Option<usize> {
        self.accidents.get(position).copied()
    }

    /// Node of a regulation tag.
    #[must_use]
    pub fn tag_node(&self, tag: &str) -> Option<usize> {
        self.tags.get(tag).copied()
    }

    /// Regulation tags in label order with their nodes.
    pub fn tags(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tags.iter().map(|(tag, &node)| (tag.as_str(), node))
    }

    /// Node of a (possibly suffixed) label.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}

/// Everything derived from the raw tables at startup.
#[derive(Debug, Clone)]
pub struct DerivedTables {
    /// Sankey node table.
    pub nodes: SankeyNodes,
    /// Distinct aircraft types in first-seen order.
    pub aircraft_types: Vec<String>,
    /// Accident count per type and year.
    pub heatmap: HeatmapGrid,
    /// Highest fatality count among accidents.
    pub max_fatalities: u32,
}

impl DerivedTables {
    /// Compute all lookups.
    #[must_use]
    pub fn build(
        accidents: &[AccidentRecord],
        impacts: &[ImpactRecord],
        cleaned: &[CleanedRecord],
    ) -> Self {
        Self {
            nodes: SankeyNodes::build(impacts),
            aircraft_types: aircraft_types(accidents),
            heatmap: HeatmapGrid::build(cleaned),
            max_fatalities: accidents.iter().map(|a| a.fatalities).max().unwrap_or(0),
        }
    }
}

/// Distinct non-empty aircraft types in first-seen order.
#[must_use]
pub fn aircraft_types(accidents: &[AccidentRecord]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    accidents
        .iter()
        .map(|a| a.aircraft_type.as_str())
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn test_scale_color_endpoints() {
        assert_eq!(scale_color(50, 50, 583), ACCIDENT_START_COLOR);
        assert_eq!(scale_color(583, 50, 583), ACCIDENT_END_COLOR);
    }

    #[test]
    fn test_scale_color_truncates() {
        // Halfway: 89 + 0.5 * 42 = 110, 14 + 0.5 * 71 = 49.5, 158 + 0.5 * 80 = 198
        assert_eq!(scale_color(50, 0, 100), Rgb(110, 49, 198));
    }

    #[test]
    fn test_scale_color_constant_column() {
        let color = scale_color(120, 120, 120);
        assert_eq!(color, ACCIDENT_START_COLOR);
        assert_eq!(scale_color(120, 120, 120), color);
        assert_eq!(color.to_string(), "rgb(89,14,158)");
    }

    #[test]
    fn test_scale_color_clamps_out_of_range() {
        assert_eq!(scale_color(0, 50, 100), ACCIDENT_START_COLOR);
        assert_eq!(scale_color(900, 50, 100), ACCIDENT_END_COLOR);
    }

    #[test]
    fn test_rgb_serializes_as_css() {
        let json = serde_json::to_string(&Rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"rgb(1,2,3)\"");
    }

    #[test]
    fn test_nodes_are_a_bijection() {
        let dataset = fixtures::dataset();
        let nodes = &dataset.derived().nodes;

        let distinct: BTreeSet<&String> = nodes.labels().iter().collect();
        assert_eq!(distinct.len(), nodes.len());
        for (i, label) in nodes.labels().iter().enumerate() {
            assert_eq!(nodes.index_of(label), Some(i));
        }
        assert_eq!(nodes.colors().len(), nodes.len());
    }

    #[test]
    fn test_nodes_layout() {
        let dataset = fixtures::dataset();
        let nodes = &dataset.derived().nodes;

        // 8 accidents followed by 9 sorted tags
        assert_eq!(nodes.len(), 17);
        assert_eq!(nodes.accident_node(0), Some(0));
        assert_eq!(nodes.tag_node("Crew resource management"), Some(8));
        assert_eq!(nodes.colors()[8], REGULATION_COLOR);
        let tags: Vec<&str> = nodes.tags().map(|(t, _)| t).collect();
        let mut sorted = tags.clone();
        sorted.sort_unstable();
        assert_eq!(tags, sorted);
    }

    #[test]
    fn test_colliding_labels_are_suffixed() {
        let dataset = fixtures::dataset();
        let nodes = &dataset.derived().nodes;

        let first = nodes.index_of("Colgan Air DHC-8 (2009-02-12)").unwrap();
        let second = nodes.index_of("Colgan Air DHC-8 (2009-02-12) #2").unwrap();
        assert_ne!(first, second);
        assert_eq!(nodes.accident_node(3), Some(first));
        assert_eq!(nodes.accident_node(6), Some(second));
    }

    #[test]
    fn test_empty_impacts() {
        let nodes = SankeyNodes::build(&[]);
        assert!(nodes.is_empty());
        assert_eq!(nodes.accident_node(0), None);
    }

    #[test]
    fn test_aircraft_types_first_seen_order() {
        let dataset = fixtures::dataset();
        let types = &dataset.derived().aircraft_types;
        assert_eq!(types[0], "A330");
        assert_eq!(types[1], "A300");
        assert_eq!(types.iter().filter(|t| *t == "B737").count(), 1);
        assert!(!types.iter().any(String::is_empty));
    }

    #[test]
    fn test_max_fatalities() {
        let dataset = fixtures::dataset();
        assert_eq!(dataset.derived().max_fatalities, 583);
        assert_eq!(fixtures::empty_dataset().derived().max_fatalities, 0);
    }
}
