//! Reactive binding between filter controls and charts.
//!
//! Each chart is a [`ViewSubscriber`] that declares which filter controls it
//! reads. The [`Binder`] applies a batch of [`FilterChange`]s, works out
//! which controls actually changed and re-renders every affected chart
//! exactly once.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::charts::{self, ChartId, ChartOutput};
use crate::data::Dataset;
use crate::error::Result;
use crate::filter::{FilterChange, FilterField, FilterState};

/// Whether the binder is between updates or rendering one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinderState {
    /// Waiting for changes.
    #[default]
    Idle,
    /// Re-rendering affected charts.
    Recomputing,
}

/// A view that re-renders when one of its inputs changes.
pub trait ViewSubscriber: Send + Sync {
    /// The chart this subscriber produces.
    fn chart(&self) -> ChartId;

    /// Filter controls the view depends on. Views with no inputs render
    /// only once per session.
    fn inputs(&self) -> &[FilterField] {
        self.chart().inputs()
    }

    /// Render the view for `filters`.
    fn render(&self, dataset: &Dataset, filters: &FilterState) -> ChartOutput;
}

/// Subscriber backed by the chart builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSubscriber(pub ChartId);

impl ViewSubscriber for ChartSubscriber {
    fn chart(&self) -> ChartId {
        self.0
    }

    fn render(&self, dataset: &Dataset, filters: &FilterState) -> ChartOutput {
        charts::render(self.0, dataset, filters)
    }
}

/// One subscriber per dashboard chart.
#[must_use]
pub fn default_subscribers() -> Vec<Box<dyn ViewSubscriber>> {
    ChartId::ALL
        .into_iter()
        .map(|chart| Box::new(ChartSubscriber(chart)) as Box<dyn ViewSubscriber>)
        .collect()
}

/// A freshly rendered chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartUpdate {
    /// Which chart.
    pub chart: ChartId,
    /// Its new content.
    pub output: ChartOutput,
}

/// Dispatches filter changes to subscribers.
pub struct Binder {
    subscribers: Vec<Box<dyn ViewSubscriber>>,
    state: BinderState,
    recomputes: u64,
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let charts: Vec<ChartId> = self.subscribers.iter().map(|s| s.chart()).collect();
        f.debug_struct("Binder")
            .field("subscribers", &charts)
            .field("state", &self.state)
            .field("recomputes", &self.recomputes)
            .finish()
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::with_subscribers(default_subscribers())
    }
}

impl Binder {
    /// Create a binder for every dashboard chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a binder over custom subscribers.
    #[must_use]
    pub fn with_subscribers(subscribers: Vec<Box<dyn ViewSubscriber>>) -> Self {
        Self {
            subscribers,
            state: BinderState::Idle,
            recomputes: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BinderState {
        self.state
    }

    /// Number of chart renders performed by [`Binder::dispatch`].
    #[must_use]
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    /// Render every subscriber, as on page load.
    #[must_use]
    pub fn render_all(&self, dataset: &Dataset, filters: &FilterState) -> Vec<ChartUpdate> {
        self.subscribers
            .iter()
            .map(|subscriber| ChartUpdate {
                chart: subscriber.chart(),
                output: subscriber.render(dataset, filters),
            })
            .collect()
    }

    /// Apply `changes` to `filters` and re-render the affected charts.
    ///
    /// Changes are applied in order to a staged copy. The batch is committed
    /// only if the result lies inside the dataset window; otherwise `filters`
    /// is left untouched. Each chart whose inputs changed is rendered once,
    /// and a batch that leaves every control at its current value renders
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidFilter`] if the batch is rejected.
    pub fn dispatch(
        &mut self,
        dataset: &Dataset,
        filters: &mut FilterState,
        changes: Vec<FilterChange>,
    ) -> Result<Vec<ChartUpdate>> {
        let mut staged = filters.clone();
        for change in changes {
            staged.apply(change);
        }
        staged.check_within(dataset.window())?;

        let changed = filters.diff(&staged);
        if changed.is_empty() {
            debug!("Filter batch changed nothing");
            return Ok(Vec::new());
        }
        *filters = staged;

        self.state = BinderState::Recomputing;
        let updates: Vec<ChartUpdate> = self
            .subscribers
            .iter()
            .filter(|subscriber| depends_on(subscriber.inputs(), &changed))
            .map(|subscriber| ChartUpdate {
                chart: subscriber.chart(),
                output: subscriber.render(dataset, filters),
            })
            .collect();
        self.recomputes += updates.len() as u64;
        self.state = BinderState::Idle;

        debug!(
            "Recomputed {} chart(s) for {:?}",
            updates.len(),
            changed
        );
        Ok(updates)
    }
}

fn depends_on(inputs: &[FilterField], changed: &BTreeSet<FilterField>) -> bool {
    inputs.iter().any(|field| changed.contains(field))
}

/// One client's filter state and binder.
#[derive(Debug)]
pub struct Session {
    filters: FilterState,
    binder: Binder,
}

impl Session {
    /// Start a session at the dataset's default filters.
    #[must_use]
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            filters: dataset.default_filters(),
            binder: Binder::new(),
        }
    }

    /// Current filters.
    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Render every chart for the current filters.
    #[must_use]
    pub fn render_all(&self, dataset: &Dataset) -> Vec<ChartUpdate> {
        self.binder.render_all(dataset, &self.filters)
    }

    /// Apply a batch of changes. See [`Binder::dispatch`].
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is rejected.
    pub fn apply(
        &mut self,
        dataset: &Dataset,
        changes: Vec<FilterChange>,
    ) -> Result<Vec<ChartUpdate>> {
        self.binder.dispatch(dataset, &mut self.filters, changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::charts::Figure;
    use crate::data::fixtures;
    use crate::filter::{FatalityRange, ViewMode, YearRange};

    struct Counting {
        chart: ChartId,
        renders: Arc<AtomicUsize>,
    }

    impl ViewSubscriber for Counting {
        fn chart(&self) -> ChartId {
            self.chart
        }

        fn render(&self, _dataset: &Dataset, _filters: &FilterState) -> ChartOutput {
            self.renders.fetch_add(1, Ordering::SeqCst);
            ChartOutput::Figure(Figure::single(
                charts::figure::Scatter::default(),
                charts::figure::Layout::default(),
            ))
        }
    }

    fn counting_binder() -> (Binder, Vec<(ChartId, Arc<AtomicUsize>)>) {
        let counters: Vec<(ChartId, Arc<AtomicUsize>)> = ChartId::ALL
            .into_iter()
            .map(|chart| (chart, Arc::new(AtomicUsize::new(0))))
            .collect();
        let subscribers = counters
            .iter()
            .map(|(chart, renders)| {
                Box::new(Counting {
                    chart: *chart,
                    renders: Arc::clone(renders),
                }) as Box<dyn ViewSubscriber>
            })
            .collect();
        (Binder::with_subscribers(subscribers), counters)
    }

    fn renders(counters: &[(ChartId, Arc<AtomicUsize>)], chart: ChartId) -> usize {
        counters
            .iter()
            .find(|(c, _)| *c == chart)
            .map_or(0, |(_, n)| n.load(Ordering::SeqCst))
    }

    #[test]
    fn test_two_field_batch_renders_each_chart_once() {
        let dataset = fixtures::dataset();
        let mut filters = dataset.default_filters();
        let (mut binder, counters) = counting_binder();

        let updates = binder
            .dispatch(
                &dataset,
                &mut filters,
                vec![
                    FilterChange::YearRange(YearRange::new(2000, 2010).unwrap()),
                    FilterChange::FatalityRange(FatalityRange::new(0, 50).unwrap()),
                ],
            )
            .unwrap();

        let charts: Vec<ChartId> = updates.iter().map(|u| u.chart).collect();
        assert_eq!(charts.len(), 6);
        assert_eq!(renders(&counters, ChartId::Map), 1);
        assert_eq!(renders(&counters, ChartId::Sankey), 1);
        assert_eq!(renders(&counters, ChartId::Capacity), 1);
        assert_eq!(renders(&counters, ChartId::RecentAccidents), 1);
        assert_eq!(renders(&counters, ChartId::AircraftCards), 0);
        assert_eq!(renders(&counters, ChartId::Heatmap), 0);
        assert_eq!(binder.recomputes(), 6);
        assert_eq!(binder.state(), BinderState::Idle);
        assert_eq!(filters.year_range, YearRange::new(2000, 2010).unwrap());
    }

    #[test]
    fn test_noop_change_renders_nothing() {
        let dataset = fixtures::dataset();
        let mut filters = dataset.default_filters();
        let (mut binder, counters) = counting_binder();

        let updates = binder
            .dispatch(
                &dataset,
                &mut filters,
                vec![FilterChange::ViewMode(ViewMode::Scatter)],
            )
            .unwrap();
        assert!(updates.is_empty());
        assert!(counters.iter().all(|(_, n)| n.load(Ordering::SeqCst) == 0));
    }

    #[test]
    fn test_change_and_revert_in_one_batch_is_noop() {
        let dataset = fixtures::dataset();
        let mut filters = dataset.default_filters();
        let original = filters.year_range;
        let (mut binder, _) = counting_binder();

        let updates = binder
            .dispatch(
                &dataset,
                &mut filters,
                vec![
                    FilterChange::YearRange(YearRange::new(1990, 1995).unwrap()),
                    FilterChange::YearRange(original),
                ],
            )
            .unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn test_invalid_batch_leaves_state_unchanged() {
        let dataset = fixtures::dataset();
        let mut filters = dataset.default_filters();
        let before = filters.clone();
        let (mut binder, counters) = counting_binder();

        let result = binder.dispatch(
            &dataset,
            &mut filters,
            vec![
                FilterChange::ViewMode(ViewMode::Heatmap),
                FilterChange::CardYearRange(YearRange::new(1900, 1950).unwrap()),
            ],
        );
        assert!(result.unwrap_err().is_client_error());
        assert_eq!(filters, before);
        assert!(counters.iter().all(|(_, n)| n.load(Ordering::SeqCst) == 0));
        assert_eq!(binder.state(), BinderState::Idle);
    }

    #[test]
    fn test_view_mode_only_touches_map() {
        let dataset = fixtures::dataset();
        let mut session = Session::new(&dataset);

        let updates = session
            .apply(&dataset, vec![FilterChange::ViewMode(ViewMode::Animation)])
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].chart, ChartId::Map);
        let figure = updates[0].output.as_figure().unwrap();
        assert_eq!(figure.frames.len(), 66);
        assert_eq!(session.filters().view_mode, ViewMode::Animation);
    }

    #[test]
    fn test_session_initial_render() {
        let dataset = fixtures::dataset();
        let session = Session::new(&dataset);
        let updates = session.render_all(&dataset);
        assert_eq!(updates.len(), ChartId::ALL.len());
        assert!(updates.iter().any(|u| u.chart == ChartId::Heatmap));
    }

    #[test]
    fn test_binder_debug_lists_charts() {
        let binder = Binder::new();
        let debug = format!("{binder:?}");
        assert!(debug.contains("Sankey"));
        assert!(debug.contains("Idle"));
    }
}
