//! # Render Scheduler
//!
//! Debounces render requests from interactive callers. While the user is
//! typing, every keystroke calls [`RenderScheduler::request`]; the scheduler
//! keeps only the newest input in a single pending slot and hands it out via
//! [`RenderScheduler::due`] once the debounce window has passed without a
//! newer request. Results come back through [`RenderScheduler::publish`]
//! with the generation they were requested under, and a stale generation is
//! discarded so a slow render can never overwrite a newer one.
//!
//! The scheduler owns no clock and spawns no threads. Callers pass `Instant`
//! values in, which keeps the debounce logic synchronous and testable; the
//! driving loop (UI tick, async task, test) decides what "now" means.

use std::time::{Duration, Instant};

/// Single-slot debouncer with last-writer-wins publication.
///
/// `T` is the render input (typically a document/template pair), `A` the
/// finished artifact.
pub struct RenderScheduler<T, A> {
    debounce: Duration,
    pending: Option<Pending<T>>,
    /// Generation of the most recent request.
    generation: u64,
    /// Generation of the most recent render handed out by [`due`](Self::due).
    started: u64,
    /// Generation of the currently published artifact.
    published: u64,
    latest: Option<A>,
}

struct Pending<T> {
    input: T,
    due: Instant,
    generation: u64,
}

impl<T, A> Default for RenderScheduler<T, A> {
    /// One-second window, the interactive-editing sweet spot.
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl<T, A> RenderScheduler<T, A> {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
            generation: 0,
            started: 0,
            published: 0,
            latest: None,
        }
    }

    /// Record a render request. A request arriving while another is pending
    /// replaces it and restarts the debounce window. Returns the generation
    /// assigned to this request, which [`publish`](Self::publish) expects
    /// back.
    pub fn request(&mut self, input: T, now: Instant) -> u64 {
        self.generation += 1;
        if self.pending.is_some() {
            tracing::debug!(generation = self.generation, "coalescing pending render request");
        }
        self.pending = Some(Pending {
            input,
            due: now + self.debounce,
            generation: self.generation,
        });
        self.generation
    }

    /// Take the pending input if its debounce window has elapsed.
    pub fn due(&mut self, now: Instant) -> Option<(u64, T)> {
        if self.pending.as_ref()?.due > now {
            return None;
        }
        self.pending.take().map(|p| {
            self.started = p.generation;
            (p.generation, p.input)
        })
    }

    /// When the next pending input becomes due, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Publish a finished artifact. Returns false (and drops the artifact)
    /// when the generation has been superseded: a newer render has already
    /// started or published. The previous artifact stays in place either way.
    pub fn publish(&mut self, generation: u64, artifact: A) -> bool {
        if generation < self.started || generation <= self.published {
            tracing::debug!(
                generation,
                started = self.started,
                published = self.published,
                "discarding stale render result"
            );
            return false;
        }
        self.published = generation;
        self.latest = Some(artifact);
        true
    }

    /// The most recently published artifact.
    pub fn latest(&self) -> Option<&A> {
        self.latest.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> RenderScheduler<&'static str, String> {
        RenderScheduler::new(Duration::from_millis(300))
    }

    #[test]
    fn test_not_due_before_window() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.request("a", t0);
        assert!(s.due(t0).is_none());
        assert!(s.due(t0 + Duration::from_millis(299)).is_none());
        assert!(s.due(t0 + Duration::from_millis(300)).is_some());
    }

    #[test]
    fn test_burst_coalesces_to_last_input() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.request("a", t0);
        s.request("ab", t0 + Duration::from_millis(100));
        s.request("abc", t0 + Duration::from_millis(200));

        // The window restarts with each keystroke.
        assert!(s.due(t0 + Duration::from_millis(400)).is_none());
        let (generation, input) = s.due(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(input, "abc");
        assert_eq!(generation, 3);
        // The slot is drained.
        assert!(s.due(t0 + Duration::from_millis(600)).is_none());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut s = scheduler();
        let t0 = Instant::now();
        let g1 = s.request("slow", t0);
        s.due(t0 + Duration::from_secs(1)).unwrap();
        let g2 = s.request("fast", t0 + Duration::from_secs(2));
        s.due(t0 + Duration::from_secs(3)).unwrap();

        // The newer render finishes first; the older must not clobber it.
        assert!(s.publish(g2, "fast result".to_string()));
        assert!(!s.publish(g1, "slow result".to_string()));
        assert_eq!(s.latest().map(String::as_str), Some("fast result"));
    }

    #[test]
    fn test_superseded_render_cannot_publish_first() {
        let mut s = scheduler();
        let t0 = Instant::now();
        let g1 = s.request("slow", t0);
        s.due(t0 + Duration::from_secs(1)).unwrap();
        let g2 = s.request("fast", t0 + Duration::from_secs(2));
        s.due(t0 + Duration::from_secs(3)).unwrap();

        // The older render finishes while the newer one is still in flight.
        // It is already superseded, so it must not reach the display even
        // briefly; the previous good artifact stays published.
        assert!(!s.publish(g1, "slow result".to_string()));
        assert!(s.latest().is_none());

        assert!(s.publish(g2, "fast result".to_string()));
        assert_eq!(s.latest().map(String::as_str), Some("fast result"));
    }

    #[test]
    fn test_latest_tracks_newest_publication() {
        let mut s = scheduler();
        let t0 = Instant::now();
        let g1 = s.request("a", t0);
        assert!(s.latest().is_none());
        assert!(s.publish(g1, "one".to_string()));
        assert_eq!(s.latest().map(String::as_str), Some("one"));

        let g2 = s.request("b", t0);
        assert!(s.publish(g2, "two".to_string()));
        assert_eq!(s.latest().map(String::as_str), Some("two"));
    }

    #[test]
    fn test_next_due_reflects_pending() {
        let mut s = scheduler();
        let t0 = Instant::now();
        assert!(s.next_due().is_none());
        s.request("a", t0);
        assert_eq!(s.next_due(), Some(t0 + Duration::from_millis(300)));
    }
}
