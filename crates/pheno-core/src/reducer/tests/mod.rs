use std::sync::Arc;

pub(super) use super::reduce;
pub(super) use super::upgrade_to_premium;
pub(super) use super::SessionEffect;
pub(super) use super::UpgradeError;
pub(super) use super::DIRECT_REPLY_TEXT;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::SessionAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::auth::AuthForm;
pub(super) use crate::catalog::Catalog;
pub(super) use crate::state::BillingCycle;
pub(super) use crate::state::CashOutStatus;
pub(super) use crate::state::ChatRole;
pub(super) use crate::state::Citation;
pub(super) use crate::state::FeedTab;
pub(super) use crate::state::Identity;
pub(super) use crate::state::IdentityId;
pub(super) use crate::state::LinkStatus;
pub(super) use crate::state::PostId;
pub(super) use crate::state::SessionState;
pub(super) use crate::state::StoryDirection;
pub(super) use crate::state::StoryId;
pub(super) use crate::state::ViewSelector;
pub(super) use crate::state::STORY_PROGRESS_COMPLETE;

mod navigation;
mod studio;

fn me() -> Identity {
    let mut me = Identity::new("me", "terp_king", "https://example.test/me.png");
    me.creator = true;
    me
}

fn user(id: &str) -> Identity {
    Identity::new(id, format!("user_{id}"), format!("https://example.test/{id}.png"))
}

/// Demo catalog, not signed in.
fn state() -> SessionState {
    SessionState::new(Arc::new(Catalog::demo()))
}

fn signed_in() -> SessionState {
    let mut state = state();
    run_user(&mut state, UserAction::Login(me()));
    state
}

/// Catalog whose story sequence is exactly `ids`, signed in.
fn with_stories(ids: &[&str]) -> SessionState {
    let mut catalog = Catalog::demo();
    catalog.stories = ids
        .iter()
        .zip(Catalog::stories_for(&catalog.identities, &catalog.songs))
        .map(|(id, mut story)| {
            story.id = StoryId(id.to_string());
            story
        })
        .collect();
    let mut state = SessionState::new(Arc::new(catalog));
    run_user(&mut state, UserAction::Login(me()));
    state
}

fn story(id: &str) -> StoryId {
    StoryId(id.to_string())
}

fn run_user(state: &mut SessionState, action: UserAction) -> Vec<SessionEffect> {
    reduce(state, SessionAction::User(action))
}

fn run_runtime(state: &mut SessionState, action: RuntimeAction) -> Vec<SessionEffect> {
    reduce(state, SessionAction::Runtime(action))
}

/// A tick from the timer currently driving the open story.
fn live_tick(state: &SessionState) -> RuntimeAction {
    let cursor = state.story.as_ref().expect("a story is open");
    RuntimeAction::StoryTick {
        story_id: cursor.story_id.clone(),
        generation: cursor.generation,
    }
}

fn cursor_id(state: &SessionState) -> Option<&str> {
    state.story.as_ref().map(|cursor| cursor.story_id.0.as_str())
}

fn subject_id(state: &SessionState) -> Option<&str> {
    state.profile_subject().map(|subject| subject.id.as_str())
}
