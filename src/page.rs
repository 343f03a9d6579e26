//! Chart page
//!
//! Hosts a chart engine, listens for its drill-down requests and descends
//! into the requested child period. The page keeps the path from the opened
//! year down to the displayed node so it can step back up.

use finchart_core::{
    ChartConfig, ChartEngine, CoreError, CoreResult, DrillDownEvent, FeedState, PeriodNode,
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub struct ChartPage {
    engine: ChartEngine,
    requests: UnboundedReceiver<DrillDownEvent>,
    path: Vec<Arc<PeriodNode>>,
    history: Vec<DrillDownEvent>,
}

impl ChartPage {
    pub fn new(mut engine: ChartEngine) -> Self {
        let (sender, requests) = mpsc::unbounded_channel();
        engine.add_sink(sender);
        Self {
            engine,
            requests,
            path: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Display a freshly fetched year
    pub fn open(&mut self, year: Arc<PeriodNode>) -> CoreResult<Option<&ChartConfig>> {
        self.path = vec![year.clone()];
        self.engine.show_at(year.granularity(), year)
    }

    /// Display the latest feed snapshot.
    ///
    /// A failed snapshot clears the chart; the error stays on the snapshot.
    /// Idle and pending snapshots keep whatever is displayed.
    pub fn show_snapshot(&mut self, state: &FeedState) -> CoreResult<Option<&ChartConfig>> {
        match state {
            FeedState::Ready { node, .. } => self.open(node.clone()),
            FeedState::Failed { error, .. } => {
                self.path.clear();
                self.engine.clear(error);
                Ok(None)
            }
            FeedState::Idle | FeedState::Pending { .. } => Ok(self.engine.current()),
        }
    }

    /// Forward a click to the engine and follow any drill-down it requests
    pub fn handle_click(&mut self, x: f64) -> CoreResult<Option<DrillDownEvent>> {
        self.engine.click(x);

        let mut last = None;
        while let Ok(event) = self.requests.try_recv() {
            self.drill_down(&event)?;
            self.history.push(event.clone());
            last = Some(event);
        }
        Ok(last)
    }

    /// Return to the parent of the displayed node
    pub fn back(&mut self) -> CoreResult<Option<&ChartConfig>> {
        if self.path.len() > 1 {
            self.path.pop();
        }
        match self.path.last().cloned() {
            Some(node) => self.engine.show_at(node.granularity(), node),
            None => Ok(None),
        }
    }

    pub fn current(&self) -> Option<&ChartConfig> {
        self.engine.current()
    }

    /// Drill-downs followed so far
    pub fn history(&self) -> &[DrillDownEvent] {
        &self.history
    }

    /// Depth below the opened year
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    fn drill_down(&mut self, event: &DrillDownEvent) -> CoreResult<()> {
        let parent = self
            .path
            .last()
            .ok_or_else(|| CoreError::malformed("", "no period opened"))?;
        if parent.granularity().finer() != Some(event.granularity) {
            return Err(CoreError::GranularityMismatch {
                expected: parent.granularity().finer().unwrap_or(parent.granularity()),
                actual: event.granularity,
            });
        }
        let child = parent.child(event.ordinal).cloned().ok_or_else(|| {
            CoreError::malformed(
                format!("{}.{}", event.granularity, event.ordinal),
                "drill-down target missing",
            )
        })?;

        self.path.push(child.clone());
        self.engine.show_at(event.granularity, child)?;
        Ok(())
    }
}
