use std::time::Duration;

use pheno_core::RuntimeAction;
use pheno_core::StoryId;
use pheno_core::STORY_PROGRESS_COMPLETE;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Drives story auto-advance. At most one ticking task exists at a time.
pub struct StoryTimer {
    tick: Duration,
    tx: UnboundedSender<RuntimeAction>,
    task: Option<(StoryId, JoinHandle<()>)>,
}

impl StoryTimer {
    pub fn new(tick: Duration, tx: UnboundedSender<RuntimeAction>) -> Self {
        Self {
            tick,
            tx,
            task: None,
        }
    }

    /// Replaces any running timer with one ticking for `story_id`. Every tick
    /// carries `generation` so the session can tell it from an older timer's.
    ///
    /// The task stops on its own after a full story's worth of ticks or once
    /// the receiver goes away.
    pub fn start(&mut self, story_id: StoryId, generation: u64) {
        self.stop();
        let tx = self.tx.clone();
        let period = self.tick;
        let id = story_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            for _ in 0..STORY_PROGRESS_COMPLETE {
                ticker.tick().await;
                if tx
                    .send(RuntimeAction::StoryTick {
                        story_id: id.clone(),
                        generation,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });
        debug!(story = %story_id.0, generation, "story timer started");
        self.task = Some((story_id, handle));
    }

    pub fn stop(&mut self) {
        if let Some((story_id, handle)) = self.task.take() {
            handle.abort();
            debug!(story = %story_id.0, "story timer stopped");
        }
    }

    pub fn running_for(&self) -> Option<&StoryId> {
        self.task
            .as_ref()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(story_id, _)| story_id)
    }
}

impl Drop for StoryTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
