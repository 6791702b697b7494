use super::*;
use crate::state::Timeframe;
use pretty_assertions::assert_eq;

const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

fn post_id(id: &str) -> PostId {
    PostId(id.to_string())
}

#[test]
fn like_toggles_count() {
    let mut state = signed_in();
    let id = post_id("post-2");
    run_user(&mut state, UserAction::ToggleLike { post_id: id.clone() });
    let post = state.feed.find_mut(&id).unwrap();
    assert!(post.liked);
    assert_eq!(post.likes, 1_206);

    run_user(&mut state, UserAction::ToggleLike { post_id: id.clone() });
    let post = state.feed.find_mut(&id).unwrap();
    assert!(!post.liked);
    assert_eq!(post.likes, 1_205);
}

#[test]
fn gift_is_sent_once_per_post() {
    let mut state = signed_in();
    let id = post_id("reel-1");
    assert!(!run_user(&mut state, UserAction::SendGift { post_id: id.clone() }).is_empty());
    assert!(run_user(&mut state, UserAction::SendGift { post_id: id.clone() }).is_empty());
    assert!(state.feed.gifted.contains(&id));

    assert!(run_user(
        &mut state,
        UserAction::SendGift {
            post_id: post_id("nope")
        }
    )
    .is_empty());
}

#[test]
fn following_tab_shows_every_other_post() {
    let mut state = signed_in();
    let all = state.feed.visible().len();
    run_user(&mut state, UserAction::SetFeedTab(FeedTab::Following));
    let ids: Vec<&str> = state
        .feed
        .visible()
        .iter()
        .map(|post| post.id.0.as_str())
        .collect();
    assert_eq!(ids.len(), all.div_ceil(2));
    assert_eq!(ids[0], "post-1");
    assert_eq!(ids[1], "post-2");
}

#[test]
fn caption_generation_needs_an_image() {
    let mut state = signed_in();
    assert!(run_user(&mut state, UserAction::GenerateCaption).is_empty());

    run_user(
        &mut state,
        UserAction::AttachImage {
            data_url: PIXEL.to_string(),
        },
    );
    let effects = run_user(&mut state, UserAction::GenerateCaption);
    assert_eq!(
        effects[0],
        SessionEffect::GenerateCaption {
            request_id: 1,
            data_url: PIXEL.to_string(),
        }
    );
    assert!(state.draft.generating);
}

#[test]
fn superseded_caption_is_dropped() {
    let mut state = signed_in();
    run_user(
        &mut state,
        UserAction::AttachImage {
            data_url: PIXEL.to_string(),
        },
    );
    run_user(&mut state, UserAction::GenerateCaption);
    run_user(&mut state, UserAction::GenerateCaption);

    assert!(run_runtime(
        &mut state,
        RuntimeAction::CaptionGenerated {
            request_id: 1,
            caption: "old".to_string(),
        },
    )
    .is_empty());
    assert!(state.draft.generating);

    run_runtime(
        &mut state,
        RuntimeAction::CaptionGenerated {
            request_id: 2,
            caption: "Frosty. ❄️".to_string(),
        },
    );
    assert_eq!(state.draft.caption, "Frosty. ❄️");
    assert!(!state.draft.generating);
}

#[test]
fn cleared_draft_ignores_late_caption() {
    let mut state = signed_in();
    run_user(
        &mut state,
        UserAction::AttachImage {
            data_url: PIXEL.to_string(),
        },
    );
    run_user(&mut state, UserAction::GenerateCaption);
    run_user(&mut state, UserAction::ClearDraft);

    run_runtime(
        &mut state,
        RuntimeAction::CaptionGenerated {
            request_id: 1,
            caption: "late".to_string(),
        },
    );
    assert_eq!(state.draft.caption, "");
    assert_eq!(state.draft.image, None);
}

#[test]
fn publish_prepends_post_and_returns_to_feed() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::Navigate(ViewSelector::Create));
    run_user(
        &mut state,
        UserAction::AttachImage {
            data_url: PIXEL.to_string(),
        },
    );
    run_user(&mut state, UserAction::SetCaption(" first drop ".to_string()));
    run_user(
        &mut state,
        UserAction::PickSong {
            song_id: Some("s2".to_string()),
        },
    );
    run_user(&mut state, UserAction::PublishPost);

    let post = &state.feed.posts[0];
    assert_eq!(post.id, post_id("post-local-1"));
    assert_eq!(post.caption, "first drop");
    assert_eq!(post.author.id.as_str(), "me");
    assert_eq!(post.song.as_ref().map(|song| song.id.as_str()), Some("s2"));
    assert_eq!(state.view, ViewSelector::Feed);
    assert_eq!(state.draft.image, None);
}

#[test]
fn unknown_song_is_not_picked() {
    let mut state = signed_in();
    run_user(
        &mut state,
        UserAction::PickSong {
            song_id: Some("s99".to_string()),
        },
    );
    assert_eq!(state.draft.song_id, None);
}

#[test]
fn publish_without_image_does_nothing() {
    let mut state = signed_in();
    let before = state.feed.posts.len();
    assert!(run_user(&mut state, UserAction::PublishPost).is_empty());
    assert_eq!(state.feed.posts.len(), before);
}

#[test]
fn cash_out_walks_its_states() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::SetTimeframe(Timeframe::Year));
    assert_eq!(state.earnings.timeframe, Timeframe::Year);

    let effects = run_user(&mut state, UserAction::CashOut);
    assert_eq!(effects[0], SessionEffect::ProcessCashOut);
    assert_eq!(state.earnings.cash_out, CashOutStatus::Processing);
    assert!(run_user(&mut state, UserAction::CashOut).is_empty());

    let effects = run_runtime(&mut state, RuntimeAction::CashOutSettled);
    assert_eq!(effects[0], SessionEffect::ScheduleCashOutReset);
    assert_eq!(state.earnings.cash_out, CashOutStatus::Succeeded);

    run_runtime(&mut state, RuntimeAction::CashOutReset);
    assert_eq!(state.earnings.cash_out, CashOutStatus::Idle);
}

#[test]
fn stray_cash_out_signals_are_ignored() {
    let mut state = signed_in();
    assert!(run_runtime(&mut state, RuntimeAction::CashOutSettled).is_empty());
    assert!(run_runtime(&mut state, RuntimeAction::CashOutReset).is_empty());
    assert_eq!(state.earnings.cash_out, CashOutStatus::Idle);
}
