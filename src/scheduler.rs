// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Work the scheduler can fire. Implementations know nothing about timing.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fire immediately, then once per period.
    Every(Duration),
    /// Fire once a day at the given local wall-clock time.
    DailyAt(NaiveTime),
}

impl Trigger {
    /// Time to wait from `now` until the next firing.
    pub fn next_delay(&self, now: NaiveDateTime) -> Duration {
        match self {
            Trigger::Every(period) => *period,
            Trigger::DailyAt(time) => {
                let today = now.date().and_time(*time);
                let next = if today > now {
                    today
                } else {
                    today + chrono::Duration::days(1)
                };
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }
}

#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<(Trigger, Arc<dyn ScheduledJob>)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, trigger: Trigger, job: Arc<dyn ScheduledJob>) -> &mut Self {
        self.jobs.push((trigger, job));
        self
    }

    /// Spawn one task per job. A job's next firing waits for its current run
    /// to finish; different jobs run independently of each other.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        self.jobs
            .into_iter()
            .map(|(trigger, job)| tokio::spawn(run_job(trigger, job)))
            .collect()
    }
}

async fn run_job(trigger: Trigger, job: Arc<dyn ScheduledJob>) {
    match trigger {
        Trigger::Every(period) => {
            info!("Scheduling {} every {:?}", job.name(), period);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                execute(&job).await;
            }
        }
        Trigger::DailyAt(time) => loop {
            let delay = trigger.next_delay(Local::now().naive_local());
            info!(
                "Next {} run at {} (in {}s)",
                job.name(),
                time,
                delay.as_secs()
            );
            tokio::time::sleep(delay).await;
            execute(&job).await;
        },
    }
}

/// Run one cycle in its own task so a panic ends that cycle only.
async fn execute(job: &Arc<dyn ScheduledJob>) {
    let started = Instant::now();
    info!("Running {}", job.name());
    let cycle = {
        let job = job.clone();
        tokio::spawn(async move { job.run().await })
    };
    match cycle.await {
        Ok(Ok(())) => info!("{} finished in {:?}", job.name(), started.elapsed()),
        // The failed cycle is dropped; the next firing proceeds as usual
        Ok(Err(e)) => error!("{} failed: {:#}", job.name(), e),
        Err(e) if e.is_panic() => error!("{} panicked: {}", job.name(), e),
        Err(e) => error!("{} was cancelled: {}", job.name(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_trigger_later_today() {
        let trigger = Trigger::DailyAt(NaiveTime::from_hms_opt(5, 0, 0).unwrap());
        assert_eq!(trigger.next_delay(at(4, 30)), Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_daily_trigger_rolls_over_to_tomorrow() {
        let trigger = Trigger::DailyAt(NaiveTime::from_hms_opt(5, 0, 0).unwrap());
        assert_eq!(
            trigger.next_delay(at(5, 0)),
            Duration::from_secs(24 * 60 * 60)
        );
        assert_eq!(
            trigger.next_delay(at(23, 0)),
            Duration::from_secs(6 * 60 * 60)
        );
    }

    #[test]
    fn test_every_trigger() {
        let trigger = Trigger::Every(Duration::from_secs(3600));
        assert_eq!(trigger.next_delay(at(12, 0)), Duration::from_secs(3600));
    }

    struct CountingJob {
        runs: AtomicUsize,
        running: AtomicUsize,
        max_running: AtomicUsize,
        work: Duration,
        fail: bool,
    }

    impl CountingJob {
        fn new(work: Duration, fail: bool) -> Self {
            Self {
                runs: AtomicUsize::new(0),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
                work,
                fail,
            }
        }
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        fn name(&self) -> &str {
            "counting"
        }

        async fn run(&self) -> anyhow::Result<()> {
            let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(running, Ordering::SeqCst);
            tokio::time::sleep(self.work).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("scrape failed");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failing_job_keeps_being_scheduled() {
        let job = Arc::new(CountingJob::new(Duration::ZERO, true));
        let mut scheduler = Scheduler::new();
        scheduler.add(Trigger::Every(Duration::from_millis(10)), job.clone());

        let handles = scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        for handle in handles {
            handle.abort();
        }

        assert!(job.runs.load(Ordering::SeqCst) >= 2);
    }

    struct PanicOnceJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl ScheduledJob for PanicOnceJob {
        fn name(&self) -> &str {
            "panic-once"
        }

        async fn run(&self) -> anyhow::Result<()> {
            if self.runs.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first cycle blew up");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_panicking_cycle_does_not_stop_later_runs() {
        let job = Arc::new(PanicOnceJob {
            runs: AtomicUsize::new(0),
        });
        let mut scheduler = Scheduler::new();
        scheduler.add(Trigger::Every(Duration::from_millis(10)), job.clone());

        let handles = scheduler.start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        for handle in &handles {
            assert!(!handle.is_finished());
        }
        for handle in handles {
            handle.abort();
        }

        assert!(job.runs.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_runs_of_the_same_job_never_overlap() {
        let job = Arc::new(CountingJob::new(Duration::from_millis(30), false));
        let mut scheduler = Scheduler::new();
        scheduler.add(Trigger::Every(Duration::from_millis(5)), job.clone());

        let handles = scheduler.start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        for handle in handles {
            handle.abort();
        }

        assert!(job.runs.load(Ordering::SeqCst) >= 2);
        assert_eq!(job.max_running.load(Ordering::SeqCst), 1);
    }
}
