use core::time::Duration;
use web_time::Instant;

use crate::*;

/// Cadence of the stage countdown.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScheduledEvent {
    Tick { generation: u64 },
    ClearSelection(ClearTicket),
}

impl ScheduledEvent {
    pub const fn generation(&self) -> u64 {
        match self {
            Self::Tick { generation } => *generation,
            Self::ClearSelection(ticket) => ticket.generation,
        }
    }
}

#[derive(Clone, Debug)]
struct Pending {
    due: Duration,
    seq: u64,
    event: ScheduledEvent,
}

/// Virtual-time queue for the delayed callbacks of a session.
///
/// Time only moves through [`Scheduler::advance`], due events are then taken one at a time in the order they were
/// due, so handling an event may schedule further events that still fall inside the same advance.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now: Duration,
    target: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time of the last fired event, or of the last finished advance
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, after: Duration, event: ScheduledEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: self.now + after,
            seq,
            event,
        });
    }

    pub fn schedule_tick(&mut self, generation: u64) {
        self.schedule(TICK_INTERVAL, ScheduledEvent::Tick { generation });
    }

    pub fn cancel_ticks(&mut self, generation: u64) {
        self.pending.retain(|pending| {
            !matches!(pending.event, ScheduledEvent::Tick { generation: g } if g == generation)
        });
    }

    /// Drops every event not belonging to `generation`
    pub fn retain_generation(&mut self, generation: u64) {
        self.pending
            .retain(|pending| pending.event.generation() == generation);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.target = self.now.max(self.target) + elapsed;
    }

    /// Takes the next event that is due before the advance target
    pub fn pop_due(&mut self) -> Option<ScheduledEvent> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= self.target)
            .min_by_key(|(_, pending)| (pending.due, pending.seq))
            .map(|(position, _)| position);

        match position {
            Some(position) => {
                let pending = self.pending.swap_remove(position);
                self.now = self.now.max(pending.due);
                Some(pending.event)
            }
            None => {
                self.now = self.now.max(self.target);
                None
            }
        }
    }
}

/// Turns wall time into scheduler advances.
#[derive(Copy, Clone, Debug)]
pub struct Clock {
    last: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    pub fn start_at(now: Instant) -> Self {
        Self { last: now }
    }

    /// Time since the previous lap
    pub fn lap(&mut self) -> Duration {
        self.lap_at(Instant::now())
    }

    pub fn lap_at(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = self.last.max(now);
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(generation: u64) -> ClearTicket {
        ClearTicket {
            generation,
            stage: 0,
            delay: Duration::from_millis(500),
        }
    }

    #[test]
    fn events_fire_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_tick(1);
        scheduler.schedule(
            Duration::from_millis(500),
            ScheduledEvent::ClearSelection(ticket(1)),
        );

        scheduler.advance(Duration::from_millis(400));
        assert_eq!(scheduler.pop_due(), None);

        scheduler.advance(Duration::from_millis(700));
        assert_eq!(
            scheduler.pop_due(),
            Some(ScheduledEvent::ClearSelection(ticket(1)))
        );
        assert_eq!(scheduler.now(), Duration::from_millis(500));
        assert_eq!(scheduler.pop_due(), Some(ScheduledEvent::Tick { generation: 1 }));
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.now(), Duration::from_millis(1100));
    }

    #[test]
    fn rescheduling_inside_an_advance_catches_up() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_tick(1);
        scheduler.advance(Duration::from_millis(3500));

        let mut ticks = 0;
        while let Some(event) = scheduler.pop_due() {
            assert_eq!(event, ScheduledEvent::Tick { generation: 1 });
            ticks += 1;
            scheduler.schedule_tick(1);
        }

        assert_eq!(ticks, 3);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn cancelling_keeps_other_events() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_tick(1);
        scheduler.schedule_tick(2);
        scheduler.schedule(Duration::ZERO, ScheduledEvent::ClearSelection(ticket(2)));

        scheduler.retain_generation(2);
        assert_eq!(scheduler.len(), 2);
        scheduler.cancel_ticks(2);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn clock_laps_never_go_backwards() {
        let start = Instant::now();
        let mut clock = Clock::start_at(start);

        assert_eq!(
            clock.lap_at(start + Duration::from_secs(2)),
            Duration::from_secs(2)
        );
        assert_eq!(clock.lap_at(start), Duration::ZERO);
        assert_eq!(
            clock.lap_at(start + Duration::from_secs(3)),
            Duration::from_secs(1)
        );
    }
}
