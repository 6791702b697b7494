use chrono::Duration as ChronoDuration;
use chrono::Utc;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::actions::RuntimeAction;
use super::actions::SessionAction;
use super::actions::UserAction;
use super::auth::resolve_identity;
use super::catalog::MediaKind;
use super::catalog::Post;
use super::state::ActivityKind;
use super::state::BillingCycle;
use super::state::CashOutStatus;
use super::state::ChatMessage;
use super::state::ChatRole;
use super::state::DirectMessage;
use super::state::Identity;
use super::state::IdentityId;
use super::state::LinkStatus;
use super::state::PostDraft;
use super::state::PostId;
use super::state::SessionState;
use super::state::StoryCursor;
use super::state::StoryDirection;
use super::state::StoryId;
use super::state::ViewSelector;
use super::state::STORY_PROGRESS_COMPLETE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    RequestFrame,
    /// Stop any running story timer and start a fresh one for this story.
    StartStoryTimer {
        story_id: StoryId,
        generation: u64,
    },
    StopStoryTimer,
    ScheduleDirectReply {
        peer: IdentityId,
    },
    AskAssistant {
        request_id: u64,
        history: Vec<ChatMessage>,
        message: String,
    },
    GenerateCaption {
        request_id: u64,
        data_url: String,
    },
    ProcessSubscription {
        cycle: BillingCycle,
    },
    ProcessCashOut,
    ScheduleCashOutReset,
    ConnectMetaverse {
        attempt: u64,
    },
}

pub const DIRECT_REPLY_TEXT: &str = "Bet. Pull up later? 💨";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumReceipt {
    pub identity: IdentityId,
    pub already_premium: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpgradeError {
    #[error("no signed-in account to upgrade")]
    NotSignedIn,
}

pub fn reduce(state: &mut SessionState, action: SessionAction) -> Vec<SessionEffect> {
    match action {
        SessionAction::User(user) => reduce_user(state, user),
        SessionAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut SessionState, action: UserAction) -> Vec<SessionEffect> {
    match action {
        UserAction::SetAuthMode(mode) => {
            state.auth.mode = mode;
            state.auth.error = None;
            vec![SessionEffect::RequestFrame]
        }
        UserAction::SubmitAuth(form) => {
            if state.is_signed_in() {
                return Vec::new();
            }
            let now_ms = Utc::now().timestamp_millis();
            match resolve_identity(&form, &state.catalog, now_ms) {
                Ok(identity) => login(state, identity),
                Err(err) => {
                    state.auth.error = Some(err.to_string().into());
                    vec![SessionEffect::RequestFrame]
                }
            }
        }
        UserAction::Login(identity) => login(state, identity),
        UserAction::SelectProfile(identity) => {
            state.memory = Some(state.view);
            state.activity.append(
                ActivityKind::Navigation,
                format!("profile @{} from {}", identity.handle, state.view.label()),
            );
            state.subject = Some(identity);
            set_view(state, ViewSelector::Profile);
            vec![SessionEffect::RequestFrame]
        }
        UserAction::OpenConversation(identity) => {
            let own = state
                .identity
                .as_ref()
                .is_some_and(|me| me.same_account(&identity));
            if own {
                state.inbox.active = None;
            } else {
                state.inbox.threads.entry(identity.id.clone()).or_default();
                state.inbox.active = Some(identity.id.clone());
            }
            state.activity.append(
                ActivityKind::Messages,
                format!("conversation with @{}", identity.handle),
            );
            state.subject = Some(identity);
            set_view(state, ViewSelector::Messages);
            vec![SessionEffect::RequestFrame]
        }
        UserAction::Navigate(target) => {
            navigate(state, target);
            vec![SessionEffect::RequestFrame]
        }
        UserAction::CloseModal(closing) => {
            close_modal(state, closing);
            vec![SessionEffect::RequestFrame]
        }
        UserAction::UpgradeToPremium => {
            if let Err(err) = upgrade_to_premium(state) {
                warn!("upgrade ignored: {err}");
                return Vec::new();
            }
            vec![SessionEffect::RequestFrame]
        }
        UserAction::OpenStory { story_id } => {
            let Some(index) = state.catalog.story_position(&story_id) else {
                warn!(story = %story_id.0, "open for unknown story ignored");
                return Vec::new();
            };
            show_story(state, index)
        }
        UserAction::CloseStory => {
            if state.story.take().is_none() {
                return Vec::new();
            }
            state.activity.append(ActivityKind::Story, "story overlay closed");
            vec![SessionEffect::StopStoryTimer, SessionEffect::RequestFrame]
        }
        UserAction::AdvanceStory(direction) => advance_story(state, direction),
        UserAction::SetFeedTab(tab) => {
            state.feed.tab = tab;
            vec![SessionEffect::RequestFrame]
        }
        UserAction::ToggleLike { post_id } => {
            let Some(post) = state.feed.find_mut(&post_id) else {
                return Vec::new();
            };
            post.liked = !post.liked;
            post.likes = if post.liked {
                post.likes.saturating_add(1)
            } else {
                post.likes.saturating_sub(1)
            };
            vec![SessionEffect::RequestFrame]
        }
        UserAction::SendGift { post_id } => {
            if state.feed.find_mut(&post_id).is_none() {
                return Vec::new();
            }
            if !state.feed.gifted.insert(post_id.clone()) {
                return Vec::new();
            }
            state
                .activity
                .append(ActivityKind::Account, format!("gift sent on {}", post_id.0));
            vec![SessionEffect::RequestFrame]
        }
        UserAction::OpenThread { peer } => {
            state.inbox.threads.entry(peer.clone()).or_default();
            state.inbox.active = Some(peer);
            vec![SessionEffect::RequestFrame]
        }
        UserAction::CloseThread => {
            if state.inbox.active.take().is_none() {
                close_modal(state, ViewSelector::Messages);
            }
            vec![SessionEffect::RequestFrame]
        }
        UserAction::SendDirectMessage { text } => {
            let text = text.trim();
            if text.is_empty() {
                return Vec::new();
            }
            let (Some(me), Some(peer)) = (
                state.identity.as_ref().map(|me| me.id.clone()),
                state.inbox.active.clone(),
            ) else {
                return Vec::new();
            };
            push_direct_message(state, &peer, me, text.to_string());
            vec![
                SessionEffect::ScheduleDirectReply { peer },
                SessionEffect::RequestFrame,
            ]
        }
        UserAction::SendAssistantMessage { text } => {
            let text = text.trim();
            if text.is_empty() {
                return Vec::new();
            }
            let request_id = state.assistant.next_request_id;
            state.assistant.next_request_id += 1;
            let history = state.assistant.transcript.clone();
            state.assistant.transcript.push(ChatMessage {
                id: format!("chat-{request_id}"),
                role: ChatRole::User,
                text: text.to_string(),
                sent_at: Utc::now(),
                citations: Vec::new(),
            });
            state.assistant.pending += 1;
            state.activity.append(
                ActivityKind::Assistant,
                format!("assistant request {request_id} sent"),
            );
            vec![
                SessionEffect::AskAssistant {
                    request_id,
                    history,
                    message: text.to_string(),
                },
                SessionEffect::RequestFrame,
            ]
        }
        UserAction::AttachImage { data_url } => {
            state.draft.image = Some(data_url);
            vec![SessionEffect::RequestFrame]
        }
        UserAction::SetCaption(caption) => {
            state.draft.caption = caption;
            vec![SessionEffect::RequestFrame]
        }
        UserAction::PickSong { song_id } => {
            state.draft.song_id = song_id.filter(|id| state.catalog.song(id).is_some());
            vec![SessionEffect::RequestFrame]
        }
        UserAction::GenerateCaption => {
            let Some(data_url) = state.draft.image.clone() else {
                return Vec::new();
            };
            state.draft.next_request_id += 1;
            let request_id = state.draft.next_request_id;
            state.draft.generating = true;
            state.draft.caption_request = Some(request_id);
            vec![
                SessionEffect::GenerateCaption {
                    request_id,
                    data_url,
                },
                SessionEffect::RequestFrame,
            ]
        }
        UserAction::PublishPost => publish_post(state),
        UserAction::ClearDraft => {
            clear_draft(state);
            vec![SessionEffect::RequestFrame]
        }
        UserAction::SetBillingCycle(cycle) => {
            state.paywall.cycle = cycle;
            vec![SessionEffect::RequestFrame]
        }
        UserAction::Subscribe => {
            if state.paywall.processing || !state.is_signed_in() {
                return Vec::new();
            }
            state.paywall.processing = true;
            vec![
                SessionEffect::ProcessSubscription {
                    cycle: state.paywall.cycle,
                },
                SessionEffect::RequestFrame,
            ]
        }
        UserAction::SetTimeframe(timeframe) => {
            state.earnings.timeframe = timeframe;
            vec![SessionEffect::RequestFrame]
        }
        UserAction::CashOut => {
            if state.earnings.cash_out != CashOutStatus::Idle {
                return Vec::new();
            }
            state.earnings.cash_out = CashOutStatus::Processing;
            vec![SessionEffect::ProcessCashOut, SessionEffect::RequestFrame]
        }
        UserAction::ClearActivity => {
            state.activity.clear();
            vec![SessionEffect::RequestFrame]
        }
        UserAction::ConnectMetaverse => {
            if state.metaverse.connection != LinkStatus::Idle {
                return Vec::new();
            }
            state.metaverse.attempt += 1;
            state.metaverse.connection = LinkStatus::Connecting;
            vec![
                SessionEffect::ConnectMetaverse {
                    attempt: state.metaverse.attempt,
                },
                SessionEffect::RequestFrame,
            ]
        }
        UserAction::JoinRoom { room_id } => join_room(state, &room_id),
        UserAction::LeaveRoom => {
            let Some(room) = state.metaverse.active_room.take() else {
                return Vec::new();
            };
            state
                .activity
                .append(ActivityKind::Metaverse, format!("left {room}"));
            vec![SessionEffect::RequestFrame]
        }
        UserAction::ToggleMic => {
            if state.metaverse.active_room.is_none() {
                return Vec::new();
            }
            state.metaverse.mic_on = !state.metaverse.mic_on;
            vec![SessionEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut SessionState, action: RuntimeAction) -> Vec<SessionEffect> {
    match action {
        RuntimeAction::StoryTick {
            story_id,
            generation,
        } => {
            let Some(cursor) = state.story.as_mut() else {
                return Vec::new();
            };
            if cursor.story_id != story_id || cursor.generation != generation {
                debug!(
                    tick = %story_id.0,
                    generation,
                    open = %cursor.story_id.0,
                    current = cursor.generation,
                    "stale story tick"
                );
                return Vec::new();
            }
            cursor.progress = cursor.progress.saturating_add(1).min(STORY_PROGRESS_COMPLETE);
            if cursor.progress >= STORY_PROGRESS_COMPLETE {
                return advance_story(state, StoryDirection::Forward);
            }
            vec![SessionEffect::RequestFrame]
        }
        RuntimeAction::DirectReplyArrived { peer, text } => {
            push_direct_message(state, &peer, peer.clone(), text);
            vec![SessionEffect::RequestFrame]
        }
        RuntimeAction::AssistantReplied {
            request_id,
            text,
            citations,
        } => {
            state.assistant.pending = state.assistant.pending.saturating_sub(1);
            state.assistant.transcript.push(ChatMessage {
                id: format!("chat-{request_id}-reply"),
                role: ChatRole::Model,
                text,
                sent_at: Utc::now(),
                citations,
            });
            state.activity.append(
                ActivityKind::Assistant,
                format!("assistant request {request_id} answered"),
            );
            vec![SessionEffect::RequestFrame]
        }
        RuntimeAction::CaptionGenerated {
            request_id,
            caption,
        } => {
            if state.draft.caption_request != Some(request_id) {
                debug!(request_id, "caption for superseded draft dropped");
                return Vec::new();
            }
            state.draft.caption = caption;
            state.draft.generating = false;
            state.draft.caption_request = None;
            vec![SessionEffect::RequestFrame]
        }
        RuntimeAction::SubscriptionSettled => {
            if !state.paywall.processing {
                return Vec::new();
            }
            state.paywall.processing = false;
            if let Err(err) = upgrade_to_premium(state) {
                warn!("subscription settled without account: {err}");
            }
            close_modal(state, ViewSelector::Subscription);
            vec![SessionEffect::RequestFrame]
        }
        RuntimeAction::CashOutSettled => {
            if state.earnings.cash_out != CashOutStatus::Processing {
                return Vec::new();
            }
            state.earnings.cash_out = CashOutStatus::Succeeded;
            state
                .activity
                .append(ActivityKind::Account, "cash out completed");
            vec![SessionEffect::ScheduleCashOutReset, SessionEffect::RequestFrame]
        }
        RuntimeAction::CashOutReset => {
            if state.earnings.cash_out != CashOutStatus::Succeeded {
                return Vec::new();
            }
            state.earnings.cash_out = CashOutStatus::Idle;
            vec![SessionEffect::RequestFrame]
        }
        RuntimeAction::MetaverseConnected { attempt } => {
            if state.metaverse.connection != LinkStatus::Connecting
                || state.metaverse.attempt != attempt
            {
                debug!(attempt, "stale metaverse link dropped");
                return Vec::new();
            }
            state.metaverse.connection = LinkStatus::Connected;
            state
                .activity
                .append(ActivityKind::Metaverse, "phenoverse link established");
            vec![SessionEffect::RequestFrame]
        }
    }
}

/// Optimistically marks the signed-in account verified and premium.
///
/// The profile subject is patched too when it is the same account, so the
/// change shows up without re-selecting the profile.
pub fn upgrade_to_premium(state: &mut SessionState) -> Result<PremiumReceipt, UpgradeError> {
    let Some(me) = state.identity.as_mut() else {
        return Err(UpgradeError::NotSignedIn);
    };
    let already_premium = me.premium && me.verified;
    me.premium = true;
    me.verified = true;
    let upgraded = me.clone();

    if let Some(subject) = state.subject.as_mut() {
        if subject.same_account(&upgraded) {
            subject.premium = true;
            subject.verified = true;
        }
    }

    info!(account = %upgraded.id.as_str(), already_premium, "premium upgrade applied");
    state.activity.append(
        ActivityKind::Account,
        format!("@{} upgraded to premium", upgraded.handle),
    );
    Ok(PremiumReceipt {
        identity: upgraded.id,
        already_premium,
    })
}

fn login(state: &mut SessionState, identity: Identity) -> Vec<SessionEffect> {
    if let Some(current) = state.identity.as_ref() {
        warn!(current = %current.id.as_str(), "login while signed in ignored");
        return Vec::new();
    }
    info!(account = %identity.id.as_str(), handle = %identity.handle, "signed in");
    state.auth.error = None;
    seed_inbox(state, &identity);
    state
        .activity
        .append(ActivityKind::Account, format!("signed in as @{}", identity.handle));
    state.subject = Some(identity.clone());
    state.identity = Some(identity);
    vec![SessionEffect::RequestFrame]
}

fn navigate(state: &mut SessionState, target: ViewSelector) {
    if matches!(target, ViewSelector::Profile | ViewSelector::Feed) {
        state.subject = state.identity.clone();
    }
    if target == ViewSelector::Messages {
        state.inbox.active = if state.viewing_own_profile() {
            None
        } else {
            state.profile_subject().map(|subject| subject.id.clone())
        };
    }
    set_view(state, target);
}

fn close_modal(state: &mut SessionState, closing: ViewSelector) {
    let target = match closing {
        ViewSelector::Earnings => ViewSelector::Profile,
        ViewSelector::Profile | ViewSelector::Messages | ViewSelector::Subscription => {
            state.memory.unwrap_or(ViewSelector::Feed)
        }
        _ => ViewSelector::Feed,
    };
    if closing == ViewSelector::Messages {
        state.inbox.active = None;
    }
    set_view(state, target);
}

fn set_view(state: &mut SessionState, target: ViewSelector) {
    let from = state.view;
    if from == ViewSelector::Metaverse && target != ViewSelector::Metaverse {
        state.metaverse.disconnect();
    }
    state.view = target;
    debug!(from = from.label(), to = target.label(), "view changed");
    if from != target {
        state.activity.append(
            ActivityKind::Navigation,
            format!("{} -> {}", from.label(), target.label()),
        );
    }
}

fn show_story(state: &mut SessionState, index: usize) -> Vec<SessionEffect> {
    let story_id = state.catalog.stories[index].id.clone();
    state.story_generation += 1;
    let generation = state.story_generation;
    state.story = Some(StoryCursor {
        index,
        story_id: story_id.clone(),
        progress: 0,
        generation,
    });
    state
        .activity
        .append(ActivityKind::Story, format!("showing {}", story_id.0));
    vec![
        SessionEffect::StartStoryTimer {
            story_id,
            generation,
        },
        SessionEffect::RequestFrame,
    ]
}

fn advance_story(state: &mut SessionState, direction: StoryDirection) -> Vec<SessionEffect> {
    let Some(cursor) = state.story.as_ref() else {
        return Vec::new();
    };
    let next = match direction {
        StoryDirection::Forward => cursor.index.checked_add(1),
        StoryDirection::Backward => cursor.index.checked_sub(1),
    }
    .filter(|index| *index < state.catalog.stories.len());

    match next {
        Some(index) => show_story(state, index),
        None => {
            state.story = None;
            state
                .activity
                .append(ActivityKind::Story, "story sequence finished");
            vec![SessionEffect::StopStoryTimer, SessionEffect::RequestFrame]
        }
    }
}

/// Locked rooms send non-premium accounts to the paywall instead.
fn join_room(state: &mut SessionState, room_id: &str) -> Vec<SessionEffect> {
    if state.metaverse.connection != LinkStatus::Connected {
        warn!(room = room_id, "join before the phenoverse link is up ignored");
        return Vec::new();
    }
    let Some(room) = state.catalog.room(room_id).cloned() else {
        warn!(room = room_id, "join for unknown room ignored");
        return Vec::new();
    };
    let premium = state.identity.as_ref().is_some_and(|me| me.premium);
    if room.locked && !premium {
        state.activity.append(
            ActivityKind::Metaverse,
            format!("{} is Pheno+ only", room.name),
        );
        navigate(state, ViewSelector::Subscription);
        return vec![SessionEffect::RequestFrame];
    }
    state
        .activity
        .append(ActivityKind::Metaverse, format!("joined {}", room.name));
    state.metaverse.active_room = Some(room.name);
    state.metaverse.mic_on = true;
    vec![SessionEffect::RequestFrame]
}

fn seed_inbox(state: &mut SessionState, me: &Identity) {
    let now = Utc::now();
    let peers: Vec<Identity> = state
        .catalog
        .identities
        .iter()
        .filter(|peer| !peer.same_account(me))
        .cloned()
        .collect();
    for peer in peers {
        let thread = vec![
            DirectMessage {
                id: format!("msg-{}-1", peer.id.as_str()),
                sender: peer.id.clone(),
                text: format!("Yo {}, check out this new strain I found! 🔥", me.handle),
                sent_at: now - ChronoDuration::days(1),
            },
            DirectMessage {
                id: format!("msg-{}-2", peer.id.as_str()),
                sender: me.id.clone(),
                text: "That looks fire! What's the terp profile like?".to_string(),
                sent_at: now - ChronoDuration::hours(2),
            },
        ];
        state.inbox.threads.insert(peer.id, thread);
    }
}

fn push_direct_message(
    state: &mut SessionState,
    peer: &IdentityId,
    sender: IdentityId,
    text: String,
) {
    state.inbox.next_message_seq += 1;
    let message = DirectMessage {
        id: format!("dm-{}", state.inbox.next_message_seq),
        sender,
        text,
        sent_at: Utc::now(),
    };
    state
        .inbox
        .threads
        .entry(peer.clone())
        .or_default()
        .push(message);
}

fn publish_post(state: &mut SessionState) -> Vec<SessionEffect> {
    let (Some(author), Some(image)) = (state.identity.clone(), state.draft.image.clone()) else {
        return Vec::new();
    };
    let local_posts = state
        .feed
        .posts
        .iter()
        .filter(|post| post.id.0.starts_with("post-local-"))
        .count();
    let song = state
        .draft
        .song_id
        .as_deref()
        .and_then(|id| state.catalog.song(id))
        .cloned();
    let post = Post {
        id: PostId(format!("post-local-{}", local_posts + 1)),
        author,
        image_url: image,
        caption: state.draft.caption.trim().to_string(),
        likes: 0,
        comments: 0,
        liked: false,
        kind: MediaKind::Image,
        posted: "just now".to_string(),
        song,
        location: None,
    };
    state
        .activity
        .append(ActivityKind::Studio, format!("published {}", post.id.0));
    state.feed.posts.insert(0, post);
    clear_draft(state);
    navigate(state, ViewSelector::Feed);
    vec![SessionEffect::RequestFrame]
}

fn clear_draft(state: &mut SessionState) {
    let next_request_id = state.draft.next_request_id;
    state.draft = PostDraft {
        next_request_id,
        ..PostDraft::default()
    };
}

#[cfg(test)]
mod tests;
