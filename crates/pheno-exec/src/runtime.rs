use std::sync::Arc;
use std::time::Duration;

use pheno_core::config::PlaybackConfig;
use pheno_core::RuntimeAction;
use pheno_core::SessionEffect;
use pheno_core::DIRECT_REPLY_TEXT;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;

use crate::genai::GenerativeText;
use crate::playback::StoryTimer;

/// Turns reducer effects into timers and service calls. Every result comes
/// back to the session as a `RuntimeAction` on `tx`.
pub struct EffectRunner {
    tx: UnboundedSender<RuntimeAction>,
    genai: Arc<dyn GenerativeText>,
    playback: PlaybackConfig,
    stories: StoryTimer,
}

impl EffectRunner {
    pub fn new(
        tx: UnboundedSender<RuntimeAction>,
        genai: Arc<dyn GenerativeText>,
        playback: PlaybackConfig,
    ) -> Self {
        let stories = StoryTimer::new(playback.tick(), tx.clone());
        Self {
            tx,
            genai,
            playback,
            stories,
        }
    }

    /// Runs every effect; returns whether any of them asked for a redraw.
    pub fn dispatch_all(&mut self, effects: Vec<SessionEffect>) -> bool {
        let mut frame = false;
        for effect in effects {
            frame |= self.dispatch(effect);
        }
        frame
    }

    pub fn dispatch(&mut self, effect: SessionEffect) -> bool {
        match effect {
            SessionEffect::RequestFrame => return true,
            SessionEffect::StartStoryTimer {
                story_id,
                generation,
            } => self.stories.start(story_id, generation),
            SessionEffect::StopStoryTimer => self.stories.stop(),
            SessionEffect::ScheduleDirectReply { peer } => {
                self.after(self.playback.direct_reply_delay_ms, move || {
                    RuntimeAction::DirectReplyArrived {
                        peer,
                        text: DIRECT_REPLY_TEXT.to_string(),
                    }
                });
            }
            SessionEffect::AskAssistant {
                request_id,
                history,
                message,
            } => {
                let genai = Arc::clone(&self.genai);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let reply = genai.ask_assistant(&history, &message).await;
                    debug!(request_id, citations = reply.citations.len(), "assistant replied");
                    let _ = tx.send(RuntimeAction::AssistantReplied {
                        request_id,
                        text: reply.text,
                        citations: reply.citations,
                    });
                });
            }
            SessionEffect::GenerateCaption {
                request_id,
                data_url,
            } => {
                let genai = Arc::clone(&self.genai);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let caption = genai.caption_for_image(&data_url).await;
                    let _ = tx.send(RuntimeAction::CaptionGenerated {
                        request_id,
                        caption,
                    });
                });
            }
            SessionEffect::ProcessSubscription { cycle } => {
                info!(cycle = cycle.label(), cents = cycle.price_cents(), "processing subscription");
                self.after(self.playback.checkout_delay_ms, || {
                    RuntimeAction::SubscriptionSettled
                });
            }
            SessionEffect::ProcessCashOut => {
                self.after(self.playback.cash_out_delay_ms, || RuntimeAction::CashOutSettled);
            }
            SessionEffect::ScheduleCashOutReset => {
                self.after(self.playback.cash_out_reset_ms, || RuntimeAction::CashOutReset);
            }
            SessionEffect::ConnectMetaverse { attempt } => {
                debug!(attempt, "opening phenoverse link");
                self.after(self.playback.metaverse_link_ms, move || {
                    RuntimeAction::MetaverseConnected { attempt }
                });
            }
        }
        false
    }

    fn after<F>(&self, delay_ms: u64, action: F)
    where
        F: FnOnce() -> RuntimeAction + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;
            let _ = tx.send(action());
        });
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pheno_core::BillingCycle;
    use pheno_core::ChatMessage;
    use pheno_core::Citation;
    use pheno_core::IdentityId;
    use pheno_core::StoryId;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::contracts::AssistantReply;

    struct CannedText;

    #[async_trait]
    impl GenerativeText for CannedText {
        async fn ask_assistant(&self, history: &[ChatMessage], message: &str) -> AssistantReply {
            AssistantReply {
                text: format!("{message} after {} turns", history.len()),
                citations: vec![Citation {
                    title: "Leafly".to_string(),
                    uri: "https://leafly.test".to_string(),
                }],
            }
        }

        async fn caption_for_image(&self, _data_url: &str) -> String {
            "Frosty. ❄️".to_string()
        }

        async fn describe_strain(&self, strain: &str) -> String {
            format!("{strain} is great")
        }
    }

    fn runner() -> (EffectRunner, UnboundedReceiver<RuntimeAction>) {
        let (tx, rx) = unbounded_channel();
        (
            EffectRunner::new(tx, Arc::new(CannedText), PlaybackConfig::default()),
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn frame_requests_are_reported() {
        let (mut runner, _rx) = runner();
        assert!(runner.dispatch_all(vec![
            SessionEffect::StopStoryTimer,
            SessionEffect::RequestFrame,
        ]));
        assert!(!runner.dispatch_all(vec![SessionEffect::StopStoryTimer]));
    }

    #[tokio::test(start_paused = true)]
    async fn direct_reply_arrives_after_delay() {
        let (mut runner, mut rx) = runner();
        runner.dispatch(SessionEffect::ScheduleDirectReply {
            peer: IdentityId::from("2"),
        });

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        match rx.try_recv() {
            Ok(RuntimeAction::DirectReplyArrived { peer, text }) => {
                assert_eq!(peer, IdentityId::from("2"));
                assert_eq!(text, DIRECT_REPLY_TEXT);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn assistant_result_carries_request_id() {
        let (mut runner, mut rx) = runner();
        runner.dispatch(SessionEffect::AskAssistant {
            request_id: 7,
            history: Vec::new(),
            message: "Gelato".to_string(),
        });

        match rx.recv().await {
            Some(RuntimeAction::AssistantReplied {
                request_id,
                text,
                citations,
            }) => {
                assert_eq!(request_id, 7);
                assert_eq!(text, "Gelato after 0 turns");
                assert_eq!(citations.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn caption_result_carries_request_id() {
        let (mut runner, mut rx) = runner();
        runner.dispatch(SessionEffect::GenerateCaption {
            request_id: 3,
            data_url: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        });

        match rx.recv().await {
            Some(RuntimeAction::CaptionGenerated { request_id, caption }) => {
                assert_eq!(request_id, 3);
                assert_eq!(caption, "Frosty. ❄️");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_and_cash_out_settle_in_order() {
        let (mut runner, mut rx) = runner();
        runner.dispatch(SessionEffect::ProcessSubscription {
            cycle: BillingCycle::Monthly,
        });
        runner.dispatch(SessionEffect::ProcessCashOut);

        assert!(matches!(rx.recv().await, Some(RuntimeAction::CashOutSettled)));
        assert!(matches!(rx.recv().await, Some(RuntimeAction::SubscriptionSettled)));

        runner.dispatch(SessionEffect::ScheduleCashOutReset);
        assert!(matches!(rx.recv().await, Some(RuntimeAction::CashOutReset)));
    }

    #[tokio::test(start_paused = true)]
    async fn metaverse_link_completes_after_handshake_delay() {
        let (mut runner, mut rx) = runner();
        runner.dispatch(SessionEffect::ConnectMetaverse { attempt: 2 });

        tokio::time::sleep(Duration::from_millis(2_400)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(matches!(
            rx.try_recv(),
            Ok(RuntimeAction::MetaverseConnected { attempt: 2 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn story_timer_follows_effects() {
        let (mut runner, mut rx) = runner();
        runner.dispatch(SessionEffect::StartStoryTimer {
            story_id: StoryId("story-0".to_string()),
            generation: 4,
        });
        assert!(matches!(
            rx.recv().await,
            Some(RuntimeAction::StoryTick { story_id, generation: 4 }) if story_id.0 == "story-0"
        ));

        runner.dispatch(SessionEffect::StopStoryTimer);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
