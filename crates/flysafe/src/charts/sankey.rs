//! Accident to regulation flow diagram.

use super::figure::{
    Figure, Font, Layout, Line, Margin, Sankey, SankeyLinkSpec, SankeyNodeSpec, Title, BODY_FONT,
    TITLE_FONT,
};
use crate::data::{ImpactRecord, SankeyNodes};
use crate::filter::YearRange;

/// Title of the flow diagram.
pub const TITLE: &str = "Sankey Diagram: Airplane Accidents & Causes<br>Top 60 Deadliest Incidents";

const HOVER: &str = "Onboard Fatalities: %{customdata[0]}<br>\
Ground Fatalities: %{customdata[1]}<br>\
Total Fatalities: %{customdata[2]}<br>\
<extra></extra>";

/// Link every in-range accident to each of its regulation tags.
///
/// All nodes are always present. Accident nodes outside `range` carry no
/// hover data; tag nodes carry the fatality sums of the visible accidents.
#[must_use]
pub fn sankey(impacts: &[ImpactRecord], nodes: &SankeyNodes, range: YearRange) -> Figure {
    let mut customdata: Vec<Option<[u64; 3]>> = vec![None; nodes.len()];
    let mut tag_totals = vec![[0_u64; 3]; nodes.len()];
    let mut link = SankeyLinkSpec {
        hovertemplate: HOVER.to_string(),
        ..SankeyLinkSpec::default()
    };

    for (position, record) in impacts.iter().enumerate() {
        if !range.contains(record.year) {
            continue;
        }
        let Some(source) = nodes.accident_node(position) else {
            continue;
        };
        let breakdown = record.fatality_breakdown();
        customdata[source] = Some(breakdown);

        for target in record.impacts.iter().filter_map(|tag| nodes.tag_node(tag)) {
            link.source.push(source);
            link.target.push(target);
            link.value.push(breakdown[2]);
            link.customdata.push(breakdown);
            for (sum, part) in tag_totals[target].iter_mut().zip(breakdown) {
                *sum += part;
            }
        }
    }

    for (_, node) in nodes.tags() {
        customdata[node] = Some(tag_totals[node]);
    }

    let trace = Sankey {
        node: SankeyNodeSpec {
            pad: 15,
            thickness: 20,
            line: Line {
                color: Some("white".to_string()),
                width: Some(0.0),
            },
            label: nodes.labels().to_vec(),
            color: nodes.colors().to_vec(),
            customdata,
            hovertemplate: HOVER.to_string(),
        },
        link,
    };

    let layout = Layout {
        title: Some(Title {
            font: Some(Font {
                family: Some(TITLE_FONT.to_string()),
                size: Some(22),
                color: None,
            }),
            ..Title::text(TITLE)
        }),
        font: Some(Font {
            family: Some(BODY_FONT.to_string()),
            size: Some(10),
            color: None,
        }),
        margin: Some(Margin::new(50, 50, 110, 50)),
        ..Layout::default()
    };

    Figure::single(trace, layout)
}
