//! Latest-only statistics feed
//!
//! The feed keeps one fetch in flight for the current selection and publishes
//! its outcome on a `watch` channel. Each selection bumps a generation
//! counter; a fetch only publishes while its generation is still the current
//! one, so a slow answer for an old selection can never replace a newer one.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::calendar::Calendar;
use crate::error::{CoreError, CoreResult};
use crate::source::{StatisticsQuery, StatisticsSource};
use crate::statistics::PeriodNode;

/// Published state of the feed
#[derive(Debug, Clone)]
pub enum FeedState {
    /// Nothing selected yet
    Idle,
    /// Fetch in flight
    Pending {
        generation: u64,
        query: StatisticsQuery,
    },
    /// Snapshot decoded into a period tree
    Ready {
        generation: u64,
        query: StatisticsQuery,
        node: Arc<PeriodNode>,
    },
    /// Fetch or decoding failed
    Failed {
        generation: u64,
        query: StatisticsQuery,
        error: Arc<CoreError>,
    },
}

impl FeedState {
    pub fn generation(&self) -> u64 {
        match self {
            FeedState::Idle => 0,
            FeedState::Pending { generation, .. }
            | FeedState::Ready { generation, .. }
            | FeedState::Failed { generation, .. } => *generation,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, FeedState::Ready { .. } | FeedState::Failed { .. })
    }

    pub fn node(&self) -> Option<&Arc<PeriodNode>> {
        match self {
            FeedState::Ready { node, .. } => Some(node),
            _ => None,
        }
    }
}

pub struct StatisticsFeed {
    source: Arc<dyn StatisticsSource>,
    calendar: Calendar,
    state: Arc<watch::Sender<FeedState>>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for StatisticsFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsFeed")
            .field("calendar", &self.calendar)
            .field("generation", &self.generation)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl StatisticsFeed {
    /// `calendar` must match the one the chart labels use
    pub fn new(source: Arc<dyn StatisticsSource>, calendar: Calendar) -> Self {
        let (state, _) = watch::channel(FeedState::Idle);
        Self {
            source,
            calendar,
            state: Arc::new(state),
            generation: 0,
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Select new statistics, dropping interest in the previous selection.
    ///
    /// Must be called from within a tokio runtime. Returns the generation
    /// tagged on the states published for this selection.
    pub fn select(&mut self, query: StatisticsQuery) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        let generation = self.generation;

        log::debug!(target: "finchart::feed", "Selecting {} (generation {})", query, generation);
        self.state.send_replace(FeedState::Pending {
            generation,
            query: query.clone(),
        });

        let source = self.source.clone();
        let state = self.state.clone();
        let calendar = self.calendar;
        self.task = Some(tokio::spawn(async move {
            let result = match source.fetch(&query).await {
                Ok(document) => PeriodNode::from_year_document(query.year(), &document, &calendar),
                Err(e) => Err(e),
            };

            let next = match result {
                Ok(node) => FeedState::Ready {
                    generation,
                    query,
                    node,
                },
                Err(error) => {
                    log::warn!(target: "finchart::feed", "Fetching {} failed: {}", query, error);
                    FeedState::Failed {
                        generation,
                        query,
                        error: Arc::new(error),
                    }
                }
            };

            let published = state.send_if_modified(|current| {
                if current.generation() == generation {
                    *current = next;
                    true
                } else {
                    false
                }
            });
            if !published {
                log::debug!(target: "finchart::feed", "Discarding stale generation {}", generation);
            }
        }));

        generation
    }

    /// Wait until the selection tagged `generation` (or a newer one) settles
    pub async fn settled(&self, generation: u64) -> FeedState {
        let mut receiver = self.subscribe();
        loop {
            {
                let state = receiver.borrow_and_update();
                if state.generation() > generation
                    || (state.generation() == generation && state.is_settled())
                {
                    return state.clone();
                }
            }
            if receiver.changed().await.is_err() {
                return self.current();
            }
        }
    }

    /// Years offered for selection
    pub async fn available_years(&self) -> CoreResult<Vec<i32>> {
        self.source.available_years().await
    }
}

impl Drop for StatisticsFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
