use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::catalog::Post;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityId(pub String);

impl IdentityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoryId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

/// An account as seen by the session: the signed-in user or anyone they look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub handle: String,
    pub avatar: String,
    pub verified: bool,
    pub premium: bool,
    pub creator: bool,
    pub balance_cents: u64,
}

impl Identity {
    pub fn new(id: impl Into<String>, handle: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: IdentityId(id.into()),
            handle: handle.into(),
            avatar: avatar.into(),
            verified: false,
            premium: false,
            creator: false,
            balance_cents: 0,
        }
    }

    pub fn same_account(&self, other: &Identity) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewSelector {
    Feed,
    Reels,
    Create,
    Chat,
    Profile,
    Messages,
    Metaverse,
    Subscription,
    Earnings,
}

impl ViewSelector {
    pub const ALL: [ViewSelector; 9] = [
        Self::Feed,
        Self::Reels,
        Self::Create,
        Self::Chat,
        Self::Profile,
        Self::Messages,
        Self::Metaverse,
        Self::Subscription,
        Self::Earnings,
    ];

    /// Order of the persistent bottom navigation bar.
    pub const NAV_BAR: [ViewSelector; 6] = [
        Self::Feed,
        Self::Reels,
        Self::Metaverse,
        Self::Create,
        Self::Chat,
        Self::Profile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Feed => "FEED",
            Self::Reels => "REELS",
            Self::Create => "CREATE",
            Self::Chat => "CHAT",
            Self::Profile => "PROFILE",
            Self::Messages => "MESSAGES",
            Self::Metaverse => "METAVERSE",
            Self::Subscription => "SUBSCRIPTION",
            Self::Earnings => "EARNINGS",
        }
    }

    /// Case-insensitive lookup. Unknown names land on the feed.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|view| view.label().eq_ignore_ascii_case(name))
            .unwrap_or(Self::Feed)
    }

    pub fn shows_nav_bar(self) -> bool {
        !matches!(
            self,
            Self::Messages | Self::Create | Self::Subscription | Self::Earnings
        )
    }
}

impl Default for ViewSelector {
    fn default() -> Self {
        Self::Feed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryDirection {
    Forward,
    Backward,
}

pub const STORY_PROGRESS_COMPLETE: u8 = 100;

/// Position of the open story overlay inside the catalog's story sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryCursor {
    pub index: usize,
    pub story_id: StoryId,
    pub progress: u8,
    /// Fresh for every open or advance; ticks from older timers carry an older one.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Idle,
    Connecting,
    Connected,
}

/// Phenoverse link and room presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaverseState {
    pub connection: LinkStatus,
    /// Name of the joined room.
    pub active_room: Option<String>,
    pub mic_on: bool,
    pub attempt: u64,
}

impl Default for MetaverseState {
    fn default() -> Self {
        Self {
            connection: LinkStatus::Idle,
            active_room: None,
            mic_on: false,
            attempt: 0,
        }
    }
}

impl MetaverseState {
    /// Drops the link and room but keeps the attempt counter moving forward.
    pub fn disconnect(&mut self) {
        *self = Self {
            attempt: self.attempt,
            ..Self::default()
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    LogIn,
    SignUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub mode: AuthMode,
    pub error: Option<Arc<str>>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            mode: AuthMode::LogIn,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedTab {
    ForYou,
    Following,
}

impl FeedTab {
    pub fn label(self) -> &'static str {
        match self {
            Self::ForYou => "For You",
            Self::Following => "Following",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedState {
    pub tab: FeedTab,
    pub posts: Vec<Post>,
    pub reels: Vec<Post>,
    pub gifted: BTreeSet<PostId>,
}

impl FeedState {
    fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            tab: FeedTab::ForYou,
            posts: catalog.posts.clone(),
            reels: catalog.reels.clone(),
            gifted: BTreeSet::new(),
        }
    }

    /// Posts visible under the current tab. "Following" keeps every other post.
    pub fn visible(&self) -> Vec<&Post> {
        match self.tab {
            FeedTab::ForYou => self.posts.iter().collect(),
            FeedTab::Following => self.posts.iter().step_by(2).collect(),
        }
    }

    pub fn find_mut(&mut self, id: &PostId) -> Option<&mut Post> {
        self.posts
            .iter_mut()
            .chain(self.reels.iter_mut())
            .find(|post| &post.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectMessage {
    pub id: String,
    pub sender: IdentityId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct Inbox {
    pub threads: BTreeMap<IdentityId, Vec<DirectMessage>>,
    pub active: Option<IdentityId>,
    pub next_message_seq: u64,
}

impl Inbox {
    pub fn thread(&self, peer: &IdentityId) -> &[DirectMessage] {
        self.threads.get(peer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_message(&self, peer: &IdentityId) -> Option<&DirectMessage> {
        self.thread(peer).last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub citations: Vec<Citation>,
}

pub const ASSISTANT_WELCOME: &str = "Yo! I'm BudBot 🌿. I've been upgraded with deep-search capabilities. Enter any strain name to get a full breakdown of effects, flavors, medical benefits, and lineage from the latest databases. What are we smoking on today?";

#[derive(Debug, Clone)]
pub struct AssistantState {
    pub transcript: Vec<ChatMessage>,
    /// Outstanding requests; replies may land in any order.
    pub pending: usize,
    pub next_request_id: u64,
}

impl Default for AssistantState {
    fn default() -> Self {
        Self {
            transcript: vec![ChatMessage {
                id: "welcome".to_string(),
                role: ChatRole::Model,
                text: ASSISTANT_WELCOME.to_string(),
                sent_at: Utc::now(),
                citations: Vec::new(),
            }],
            pending: 0,
            next_request_id: 1,
        }
    }
}

impl AssistantState {
    pub fn is_waiting(&self) -> bool {
        self.pending > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub image: Option<String>,
    pub caption: String,
    pub song_id: Option<String>,
    pub generating: bool,
    pub caption_request: Option<u64>,
    pub next_request_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn price_cents(self) -> u64 {
        match self {
            Self::Monthly => 420,
            Self::Yearly => 4_200,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaywallState {
    pub cycle: BillingCycle,
    pub processing: bool,
}

impl Default for PaywallState {
    fn default() -> Self {
        Self {
            cycle: BillingCycle::Monthly,
            processing: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashOutStatus {
    Idle,
    Processing,
    Succeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarningsState {
    pub timeframe: Timeframe,
    pub cash_out: CashOutStatus,
}

impl Default for EarningsState {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Month,
            cash_out: CashOutStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Account,
    Navigation,
    Story,
    Messages,
    Assistant,
    Studio,
    Metaverse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub seq: u64,
    pub kind: ActivityKind,
    pub message: String,
}

/// Fixed-capacity ring of session events; oldest entries fall off first.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, kind: ActivityKind, message: impl Into<String>) {
        let entry = ActivityEntry {
            seq: self.next_seq,
            kind,
            message: message.into(),
        };
        self.next_seq += 1;

        if self.buf.len() >= self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(500)
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub catalog: Arc<Catalog>,
    pub identity: Option<Identity>,
    pub view: ViewSelector,
    /// Single slot: the view active before the last `SelectProfile`.
    pub memory: Option<ViewSelector>,
    pub subject: Option<Identity>,
    pub story: Option<StoryCursor>,
    pub story_generation: u64,
    pub auth: AuthState,
    pub feed: FeedState,
    pub inbox: Inbox,
    pub assistant: AssistantState,
    pub draft: PostDraft,
    pub paywall: PaywallState,
    pub earnings: EarningsState,
    pub metaverse: MetaverseState,
    pub activity: ActivityLog,
}

impl SessionState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let feed = FeedState::from_catalog(&catalog);
        Self {
            catalog,
            identity: None,
            view: ViewSelector::Feed,
            memory: None,
            subject: None,
            story: None,
            story_generation: 0,
            auth: AuthState::default(),
            feed,
            inbox: Inbox::default(),
            assistant: AssistantState::default(),
            draft: PostDraft::default(),
            paywall: PaywallState::default(),
            earnings: EarningsState::default(),
            metaverse: MetaverseState::default(),
            activity: ActivityLog::default(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Whose profile the Profile surface shows; never empty once signed in.
    pub fn profile_subject(&self) -> Option<&Identity> {
        self.subject.as_ref().or(self.identity.as_ref())
    }

    pub fn viewing_own_profile(&self) -> bool {
        match (self.profile_subject(), self.identity.as_ref()) {
            (Some(subject), Some(me)) => subject.same_account(me),
            _ => false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.identity.clone(),
            view: self.view,
            memory: self.memory,
            subject: self.profile_subject().map(|subject| subject.id.clone()),
            story: self.story.clone(),
            nav_bar_visible: self.view.shows_nav_bar(),
            assistant_pending: self.assistant.pending,
            active_thread: self.inbox.active.clone(),
        }
    }
}

/// Serializable summary of the navigation-relevant parts of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub view: ViewSelector,
    pub memory: Option<ViewSelector>,
    pub subject: Option<IdentityId>,
    pub story: Option<StoryCursor>,
    pub nav_bar_visible: bool,
    pub assistant_pending: usize,
    pub active_thread: Option<IdentityId>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
