use super::*;
use pretty_assertions::assert_eq;

#[test]
fn navigate_always_lands_on_requested_view() {
    let mut state = signed_in();
    let walk = [
        ViewSelector::Reels,
        ViewSelector::Metaverse,
        ViewSelector::Earnings,
        ViewSelector::Feed,
        ViewSelector::Chat,
        ViewSelector::Subscription,
        ViewSelector::Create,
        ViewSelector::Messages,
        ViewSelector::Profile,
    ];

    for target in walk {
        let effects = run_user(&mut state, UserAction::Navigate(target));
        assert_eq!(state.view, target);
        assert!(matches!(effects.as_slice(), [SessionEffect::RequestFrame]));
    }
}

#[test]
fn navigate_to_profile_or_feed_resets_subject_to_self() {
    for target in [ViewSelector::Profile, ViewSelector::Feed] {
        let mut state = signed_in();
        run_user(&mut state, UserAction::SelectProfile(user("b")));
        assert_eq!(subject_id(&state), Some("b"));

        run_user(&mut state, UserAction::Navigate(target));
        assert_eq!(subject_id(&state), Some("me"));
    }
}

#[test]
fn navigate_elsewhere_keeps_selected_subject() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::SelectProfile(user("b")));
    run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
    assert_eq!(subject_id(&state), Some("b"));
}

#[test]
fn navigate_does_not_touch_memory() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
    run_user(&mut state, UserAction::SelectProfile(user("b")));
    assert_eq!(state.memory, Some(ViewSelector::Reels));

    run_user(&mut state, UserAction::Navigate(ViewSelector::Chat));
    run_user(&mut state, UserAction::Navigate(ViewSelector::Subscription));
    assert_eq!(state.memory, Some(ViewSelector::Reels));
}

#[test]
fn select_profile_then_close_restores_prior_view() {
    for origin in [
        ViewSelector::Feed,
        ViewSelector::Reels,
        ViewSelector::Metaverse,
        ViewSelector::Chat,
    ] {
        let mut state = signed_in();
        run_user(&mut state, UserAction::Navigate(origin));
        run_user(&mut state, UserAction::SelectProfile(user("b")));
        assert_eq!(state.view, ViewSelector::Profile);

        run_user(&mut state, UserAction::CloseModal(ViewSelector::Profile));
        assert_eq!(state.view, origin);
    }
}

#[test]
fn memory_is_one_slot_not_a_stack() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
    run_user(&mut state, UserAction::SelectProfile(user("b")));
    run_user(&mut state, UserAction::SelectProfile(user("c")));
    assert_eq!(state.memory, Some(ViewSelector::Profile));

    run_user(&mut state, UserAction::CloseModal(ViewSelector::Profile));
    assert_eq!(state.view, ViewSelector::Profile);
    run_user(&mut state, UserAction::CloseModal(ViewSelector::Profile));
    assert_eq!(state.view, ViewSelector::Profile);
}

#[test]
fn open_conversation_leaves_memory_alone() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
    run_user(&mut state, UserAction::OpenConversation(user("b")));

    assert_eq!(state.view, ViewSelector::Messages);
    assert_eq!(subject_id(&state), Some("b"));
    assert_eq!(state.memory, None);
}

#[test]
fn back_from_messages_after_profile_hop_restores_feed() {
    let mut state = signed_in();
    let b = user("b");
    run_user(&mut state, UserAction::SelectProfile(b.clone()));
    run_user(&mut state, UserAction::OpenConversation(b));
    assert_eq!(state.view, ViewSelector::Messages);

    run_user(&mut state, UserAction::CloseModal(ViewSelector::Messages));
    assert_eq!(state.view, ViewSelector::Feed);
}

#[test]
fn close_without_memory_falls_back_to_feed() {
    for closing in [ViewSelector::Messages, ViewSelector::Subscription] {
        let mut state = signed_in();
        run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
        run_user(&mut state, UserAction::Navigate(closing));
        run_user(&mut state, UserAction::CloseModal(closing));
        assert_eq!(state.view, ViewSelector::Feed);
    }
}

#[test]
fn earnings_back_always_returns_to_profile() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
    run_user(&mut state, UserAction::SelectProfile(user("b")));
    assert_eq!(state.memory, Some(ViewSelector::Reels));

    run_user(&mut state, UserAction::Navigate(ViewSelector::Earnings));
    run_user(&mut state, UserAction::CloseModal(ViewSelector::Earnings));
    assert_eq!(state.view, ViewSelector::Profile);
}

#[test]
fn closing_a_non_modal_view_goes_home() {
    let mut state = signed_in();
    run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
    run_user(&mut state, UserAction::SelectProfile(user("b")));
    run_user(&mut state, UserAction::Navigate(ViewSelector::Create));
    run_user(&mut state, UserAction::CloseModal(ViewSelector::Create));
    assert_eq!(state.view, ViewSelector::Feed);
}

#[test]
fn navigation_is_logged_once_per_change() {
    let mut state = signed_in();
    let before = state.activity.len();
    run_user(&mut state, UserAction::Navigate(ViewSelector::Feed));
    assert_eq!(state.activity.len(), before);
    run_user(&mut state, UserAction::Navigate(ViewSelector::Reels));
    assert_eq!(state.activity.len(), before + 1);
    assert_eq!(
        state.activity.iter().last().map(|entry| entry.message.as_str()),
        Some("FEED -> REELS")
    );
}
