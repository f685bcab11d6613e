//! Crawl frontier: claimed URLs plus the pending work queue
//!
//! This module handles:
//! - Deduplication through an atomic claim on the visited set
//! - The unbounded work queue, popped breadth-first or depth-first
//! - Depth bounding of pathological link chains
//! - Drain detection via the outstanding-task counter
//!
//! All state lives behind one mutex, so a claim, its enqueue and the
//! outstanding-counter increment are observed together by every worker.

use crate::config::TraversalOrder;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use url::Url;

/// A claimed URL waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The normalized URL to fetch
    pub url: Url,

    /// Link distance from the base URL
    pub depth: u32,
}

#[derive(Debug, Default)]
struct FrontierState {
    visited: HashSet<String>,
    queue: VecDeque<QueuedUrl>,
    outstanding: usize,
}

/// Concurrency-safe frontier shared by all crawl workers
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
    order: TraversalOrder,
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `order` - Which end of the queue workers pop from
    /// * `max_depth` - URLs deeper than this are never claimed
    pub fn new(order: TraversalOrder, max_depth: u32) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
            order,
            max_depth,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // Every critical section leaves the state consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Atomically claims a URL
    ///
    /// If the URL is within the depth bound and not yet visited, it is added
    /// to the visited set and counted as outstanding; the caller now owns
    /// the task and must eventually call [`Frontier::complete`].
    ///
    /// # Returns
    ///
    /// * `true` - The URL was claimed by this call
    /// * `false` - Already visited or too deep; nothing changed
    pub fn try_claim(&self, url: &Url, depth: u32) -> bool {
        let mut state = self.lock();
        self.claim_locked(&mut state, url, depth)
    }

    fn claim_locked(&self, state: &mut FrontierState, url: &Url, depth: u32) -> bool {
        if depth > self.max_depth {
            tracing::debug!("Not claiming {} at depth {} (max {})", url, depth, self.max_depth);
            return false;
        }

        if !state.visited.insert(url.as_str().to_string()) {
            return false;
        }

        state.outstanding += 1;
        true
    }

    /// Pushes a claimed URL onto the work queue and wakes idle workers
    pub fn enqueue(&self, task: QueuedUrl) {
        self.lock().queue.push_back(task);
        self.notify.notify_waiters();
    }

    /// Claims and enqueues a URL as one atomic step
    ///
    /// # Returns
    ///
    /// `true` if the URL was new and is now queued
    pub fn offer(&self, url: Url, depth: u32) -> bool {
        let claimed = {
            let mut state = self.lock();
            let claimed = self.claim_locked(&mut state, &url, depth);
            if claimed {
                state.queue.push_back(QueuedUrl { url, depth });
            }
            claimed
        };

        if claimed {
            self.notify.notify_waiters();
        }
        claimed
    }

    /// Waits for the next URL to process
    ///
    /// # Returns
    ///
    /// * `Some(QueuedUrl)` - Work to do
    /// * `None` - The queue is empty and no task is outstanding, so no more
    ///   work can ever appear
    pub async fn next(&self) -> Option<QueuedUrl> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a wake-up between the check
            // and the await is not lost
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                let task = match self.order {
                    TraversalOrder::BreadthFirst => state.queue.pop_front(),
                    TraversalOrder::DepthFirst => state.queue.pop_back(),
                };
                if task.is_some() {
                    return task;
                }
                if state.outstanding == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks one claimed task as finished
    ///
    /// When the last outstanding task completes every waiting worker is woken
    /// so it can observe the drained frontier.
    pub fn complete(&self) {
        let drained = {
            let mut state = self.lock();
            state.outstanding = state.outstanding.saturating_sub(1);
            state.outstanding == 0 && state.queue.is_empty()
        };

        if drained {
            tracing::debug!("Frontier drained");
            self.notify.notify_waiters();
        }
    }

    /// Number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Number of claimed tasks not yet completed
    #[cfg(test)]
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Number of URLs waiting in the queue
    #[cfg(test)]
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Returns true if the URL has been claimed
    #[cfg(test)]
    pub fn is_visited(&self, url: &Url) -> bool {
        self.lock().visited.contains(url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn url(path: &str) -> Url {
        Url::parse(&format!("http://ex.com{}", path)).unwrap()
    }

    #[test]
    fn test_claim_once() {
        let frontier = Frontier::new(TraversalOrder::BreadthFirst, 10);

        assert!(frontier.try_claim(&url("/a"), 0));
        assert!(!frontier.try_claim(&url("/a"), 0));
        assert!(!frontier.offer(url("/a"), 1));

        assert_eq!(frontier.visited_count(), 1);
        assert_eq!(frontier.outstanding(), 1);
        assert_eq!(frontier.queued(), 0);
    }

    #[test]
    fn test_depth_bound() {
        let frontier = Frontier::new(TraversalOrder::BreadthFirst, 2);

        assert!(frontier.offer(url("/two"), 2));
        assert!(!frontier.offer(url("/three"), 3));

        assert!(!frontier.is_visited(&url("/three")));
        assert_eq!(frontier.outstanding(), 1);
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let frontier = Frontier::new(TraversalOrder::BreadthFirst, 10);
        frontier.offer(url("/1"), 0);
        frontier.offer(url("/2"), 0);
        frontier.offer(url("/3"), 0);

        assert_eq!(frontier.next().await.unwrap().url, url("/1"));
        assert_eq!(frontier.next().await.unwrap().url, url("/2"));
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        let frontier = Frontier::new(TraversalOrder::DepthFirst, 10);
        frontier.offer(url("/1"), 0);
        frontier.offer(url("/2"), 0);
        frontier.offer(url("/3"), 0);

        assert_eq!(frontier.next().await.unwrap().url, url("/3"));
        assert_eq!(frontier.next().await.unwrap().url, url("/2"));
    }

    #[tokio::test]
    async fn test_drained_when_nothing_outstanding() {
        let frontier = Frontier::new(TraversalOrder::BreadthFirst, 10);
        assert!(frontier.next().await.is_none());

        frontier.offer(url("/a"), 0);
        let task = frontier.next().await.unwrap();
        assert_eq!(task.url, url("/a"));
        frontier.complete();

        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_claim_then_enqueue() {
        let frontier = Frontier::new(TraversalOrder::BreadthFirst, 10);
        let seed = url("/");

        assert!(frontier.try_claim(&seed, 0));
        frontier.enqueue(QueuedUrl {
            url: seed.clone(),
            depth: 0,
        });

        assert_eq!(frontier.next().await.unwrap().url, seed);
    }

    #[tokio::test]
    async fn test_waiter_woken_by_new_work() {
        let frontier = Arc::new(Frontier::new(TraversalOrder::BreadthFirst, 10));
        frontier.offer(url("/a"), 0);
        let first = frontier.next().await.unwrap();

        let waiter = {
            let frontier = frontier.clone();
            tokio::spawn(async move { frontier.next().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        frontier.offer(url("/b"), first.depth + 1);
        frontier.complete();

        let woken = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter not woken")
            .unwrap();
        assert_eq!(woken.unwrap().url, url("/b"));
    }

    #[tokio::test]
    async fn test_waiter_woken_by_drain() {
        let frontier = Arc::new(Frontier::new(TraversalOrder::BreadthFirst, 10));
        frontier.offer(url("/a"), 0);
        frontier.next().await.unwrap();

        let waiter = {
            let frontier = frontier.clone();
            tokio::spawn(async move { frontier.next().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        frontier.complete();

        let woken = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter not woken")
            .unwrap();
        assert!(woken.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_are_exclusive() {
        let frontier = Arc::new(Frontier::new(TraversalOrder::BreadthFirst, 10));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let frontier = frontier.clone();
            handles.push(tokio::spawn(async move {
                let mut won = 0;
                for i in 0..100 {
                    if frontier.offer(url(&format!("/page/{}", i)), 1) {
                        won += 1;
                    }
                }
                won
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }

        assert_eq!(total, 100);
        assert_eq!(frontier.visited_count(), 100);
        assert_eq!(frontier.queued(), 100);
    }
}
