use super::auth::AuthForm;
use super::state::AuthMode;
use super::state::BillingCycle;
use super::state::Citation;
use super::state::FeedTab;
use super::state::Identity;
use super::state::IdentityId;
use super::state::PostId;
use super::state::StoryDirection;
use super::state::StoryId;
use super::state::Timeframe;
use super::state::ViewSelector;

#[derive(Debug, Clone)]
pub enum SessionAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

/// Everything a presentation surface can ask the session to do.
#[derive(Debug, Clone)]
pub enum UserAction {
    SetAuthMode(AuthMode),
    SubmitAuth(AuthForm),
    Login(Identity),

    SelectProfile(Identity),
    OpenConversation(Identity),
    Navigate(ViewSelector),
    CloseModal(ViewSelector),
    UpgradeToPremium,

    OpenStory {
        story_id: StoryId,
    },
    CloseStory,
    AdvanceStory(StoryDirection),

    SetFeedTab(FeedTab),
    ToggleLike {
        post_id: PostId,
    },
    SendGift {
        post_id: PostId,
    },

    OpenThread {
        peer: IdentityId,
    },
    CloseThread,
    SendDirectMessage {
        text: String,
    },

    SendAssistantMessage {
        text: String,
    },

    AttachImage {
        data_url: String,
    },
    SetCaption(String),
    PickSong {
        song_id: Option<String>,
    },
    GenerateCaption,
    PublishPost,
    ClearDraft,

    SetBillingCycle(BillingCycle),
    Subscribe,

    SetTimeframe(Timeframe),
    CashOut,

    ConnectMetaverse,
    JoinRoom {
        room_id: String,
    },
    LeaveRoom,
    ToggleMic,

    ClearActivity,
}

/// Results coming back from timers and the generative service.
#[derive(Debug, Clone)]
pub enum RuntimeAction {
    StoryTick {
        story_id: StoryId,
        generation: u64,
    },
    DirectReplyArrived {
        peer: IdentityId,
        text: String,
    },
    AssistantReplied {
        request_id: u64,
        text: String,
        citations: Vec<Citation>,
    },
    CaptionGenerated {
        request_id: u64,
        caption: String,
    },
    SubscriptionSettled,
    CashOutSettled,
    CashOutReset,
    MetaverseConnected {
        attempt: u64,
    },
}
