use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use pheno_core::auth::AuthForm;
use pheno_core::AuthMode;
use pheno_core::BillingCycle;
use pheno_core::FeedTab;
use pheno_core::Identity;
use pheno_core::PostId;
use pheno_core::SessionState;
use pheno_core::StoryDirection;
use pheno_core::StoryId;
use pheno_core::Timeframe;
use pheno_core::UserAction;
use pheno_core::ViewSelector;

/// Read-only panels the driver can print without touching the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Feed,
    Reels,
    Stories,
    Inbox,
    Thread,
    Chat,
    Draft,
    Earnings,
    Rooms,
    Activity,
}

#[derive(Debug, Clone)]
pub enum Command {
    Action(UserAction),
    Status { json: bool },
    Show(Panel),
    Describe(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
account   login HANDLE PASSWORD | signup HANDLE PASSWORD [AVATAR] | auth-mode login|signup
          upgrade
navigate  go VIEW | back [VIEW] | profile HANDLE | dm HANDLE
stories   story open ID | story next | story prev | story close
feed      tab foryou|following | like POST | gift POST
messages  thread HANDLE | thread close | say TEXT
assistant ask TEXT | describe STRAIN
studio    attach DATA_URL | caption TEXT | song ID|none | gen-caption | publish | discard
paywall   plan monthly|yearly | subscribe
earnings  timeframe week|month|year | cashout
verse     link | room ID|NAME | room leave | mic
panels    show feed|reels|stories|inbox|thread|chat|draft|earnings|rooms|log
session   status [json] | clear-log | help | quit";

/// Parses one input line. Handles resolve against the signed-in account and
/// the catalog.
pub fn parse_command(line: &str, state: &SessionState) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let action = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(Some(Command::Help)),
        "quit" | "exit" => return Ok(Some(Command::Quit)),
        "status" => {
            return Ok(Some(Command::Status {
                json: rest.eq_ignore_ascii_case("json"),
            }))
        }
        "show" => return parse_panel(rest).map(|panel| Some(Command::Show(panel))),
        "describe" => {
            if rest.is_empty() {
                bail!("usage: describe STRAIN");
            }
            return Ok(Some(Command::Describe(rest.to_string())));
        }

        "login" => {
            let handle = args.next().unwrap_or_default();
            let password = args.next().unwrap_or_default();
            UserAction::SubmitAuth(AuthForm::log_in(handle, password))
        }
        "signup" => {
            let handle = args.next().unwrap_or_default();
            let password = args.next().unwrap_or_default();
            let avatar = args.next().map(str::to_string);
            UserAction::SubmitAuth(AuthForm::sign_up(handle, password, avatar))
        }
        "auth-mode" => match rest.to_ascii_lowercase().as_str() {
            "login" => UserAction::SetAuthMode(AuthMode::LogIn),
            "signup" => UserAction::SetAuthMode(AuthMode::SignUp),
            _ => bail!("usage: auth-mode login|signup"),
        },
        "upgrade" => {
            if state.identity.as_ref().is_some_and(|me| me.premium) {
                bail!("already on Pheno+");
            }
            UserAction::UpgradeToPremium
        }

        "go" => {
            let target = ViewSelector::parse(rest);
            if target == ViewSelector::Earnings && !can_open_earnings(state) {
                bail!("the creator dashboard is only on your own creator profile");
            }
            UserAction::Navigate(target)
        }
        "back" => {
            let closing = if rest.is_empty() {
                state.view
            } else {
                ViewSelector::parse(rest)
            };
            UserAction::CloseModal(closing)
        }
        "profile" => UserAction::SelectProfile(lookup(state, rest)?),
        "dm" => UserAction::OpenConversation(lookup(state, rest)?),

        "story" => match (args.next(), args.next()) {
            (Some("open"), Some(id)) => UserAction::OpenStory {
                story_id: StoryId(id.to_string()),
            },
            (Some("next"), None) => UserAction::AdvanceStory(StoryDirection::Forward),
            (Some("prev"), None) => UserAction::AdvanceStory(StoryDirection::Backward),
            (Some("close"), None) => UserAction::CloseStory,
            _ => bail!("usage: story open ID | story next | story prev | story close"),
        },

        "tab" => match rest.to_ascii_lowercase().as_str() {
            "foryou" | "for-you" => UserAction::SetFeedTab(FeedTab::ForYou),
            "following" => UserAction::SetFeedTab(FeedTab::Following),
            _ => bail!("usage: tab foryou|following"),
        },
        "like" => UserAction::ToggleLike {
            post_id: post_arg(rest)?,
        },
        "gift" => UserAction::SendGift {
            post_id: post_arg(rest)?,
        },

        "thread" => {
            if rest.eq_ignore_ascii_case("close") {
                UserAction::CloseThread
            } else {
                UserAction::OpenThread {
                    peer: lookup(state, rest)?.id,
                }
            }
        }
        "say" => UserAction::SendDirectMessage {
            text: rest.to_string(),
        },
        "ask" => UserAction::SendAssistantMessage {
            text: rest.to_string(),
        },

        "attach" => UserAction::AttachImage {
            data_url: rest.to_string(),
        },
        "caption" => UserAction::SetCaption(rest.to_string()),
        "song" => UserAction::PickSong {
            song_id: match rest {
                "" | "none" => None,
                id => Some(id.to_string()),
            },
        },
        "gen-caption" => UserAction::GenerateCaption,
        "publish" => UserAction::PublishPost,
        "discard" => UserAction::ClearDraft,

        "plan" => match rest.to_ascii_lowercase().as_str() {
            "monthly" => UserAction::SetBillingCycle(BillingCycle::Monthly),
            "yearly" => UserAction::SetBillingCycle(BillingCycle::Yearly),
            _ => bail!("usage: plan monthly|yearly"),
        },
        "subscribe" => UserAction::Subscribe,

        "timeframe" => match rest.to_ascii_lowercase().as_str() {
            "week" => UserAction::SetTimeframe(Timeframe::Week),
            "month" => UserAction::SetTimeframe(Timeframe::Month),
            "year" => UserAction::SetTimeframe(Timeframe::Year),
            _ => bail!("usage: timeframe week|month|year"),
        },
        "cashout" => UserAction::CashOut,

        "link" => UserAction::ConnectMetaverse,
        "room" => match rest {
            "" => bail!("usage: room ID|NAME | room leave"),
            leave if leave.eq_ignore_ascii_case("leave") => UserAction::LeaveRoom,
            room => UserAction::JoinRoom {
                room_id: room.to_string(),
            },
        },
        "mic" => UserAction::ToggleMic,

        "clear-log" => UserAction::ClearActivity,
        other => bail!("unknown command `{other}` (try `help`)"),
    };
    Ok(Some(Command::Action(action)))
}

fn parse_panel(name: &str) -> Result<Panel> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "feed" => Panel::Feed,
        "reels" => Panel::Reels,
        "stories" => Panel::Stories,
        "inbox" => Panel::Inbox,
        "thread" => Panel::Thread,
        "chat" => Panel::Chat,
        "draft" => Panel::Draft,
        "earnings" => Panel::Earnings,
        "rooms" => Panel::Rooms,
        "log" | "activity" => Panel::Activity,
        _ => bail!("usage: show feed|reels|stories|inbox|thread|chat|draft|earnings|rooms|log"),
    })
}

/// The dashboard entry only exists on the signed-in creator's own profile.
fn can_open_earnings(state: &SessionState) -> bool {
    state.viewing_own_profile() && state.identity.as_ref().is_some_and(|me| me.creator)
}

fn post_arg(rest: &str) -> Result<PostId> {
    if rest.is_empty() {
        bail!("a post id is required");
    }
    Ok(PostId(rest.to_string()))
}

fn lookup(state: &SessionState, handle: &str) -> Result<Identity> {
    let handle = handle.trim().trim_start_matches('@');
    if handle.is_empty() {
        bail!("a handle is required");
    }
    if let Some(me) = state
        .identity
        .as_ref()
        .filter(|me| me.handle.eq_ignore_ascii_case(handle))
    {
        return Ok(me.clone());
    }
    state
        .catalog
        .identity_by_handle(handle)
        .cloned()
        .ok_or_else(|| anyhow!("no account named @{handle}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pheno_core::catalog::Catalog;
    use pheno_core::reduce;
    use pheno_core::SessionAction;
    use pretty_assertions::assert_eq;

    fn state() -> SessionState {
        SessionState::new(Arc::new(Catalog::demo()))
    }

    fn signed_in_as(identity: Identity) -> SessionState {
        let mut state = state();
        reduce(&mut state, SessionAction::User(UserAction::Login(identity)));
        state
    }

    fn creator() -> SessionState {
        let me = Catalog::demo().me;
        signed_in_as(me)
    }

    fn action(line: &str) -> UserAction {
        match parse_command(line, &state()) {
            Ok(Some(Command::Action(action))) => action,
            other => panic!("{line}: {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parse_command("   ", &state()).unwrap().is_none());
    }

    #[test]
    fn navigation_commands() {
        assert!(matches!(
            action("go reels"),
            UserAction::Navigate(ViewSelector::Reels)
        ));
        assert!(matches!(
            action("go nowhere"),
            UserAction::Navigate(ViewSelector::Feed)
        ));
        assert!(matches!(
            action("back"),
            UserAction::CloseModal(ViewSelector::Feed)
        ));
        assert!(matches!(
            action("back messages"),
            UserAction::CloseModal(ViewSelector::Messages)
        ));
    }

    #[test]
    fn handles_resolve_through_catalog() {
        match action("profile @Green_Goddess") {
            UserAction::SelectProfile(identity) => assert_eq!(identity.id.as_str(), "1"),
            other => panic!("{other:?}"),
        }
        match action("thread bangkok_buds") {
            UserAction::OpenThread { peer } => assert_eq!(peer.as_str(), "u_thai"),
            other => panic!("{other:?}"),
        }
        let err = parse_command("dm ghost", &state()).unwrap_err();
        assert_eq!(err.to_string(), "no account named @ghost");
    }

    #[test]
    fn story_commands() {
        match action("story open story-3") {
            UserAction::OpenStory { story_id } => assert_eq!(story_id.0, "story-3"),
            other => panic!("{other:?}"),
        }
        assert!(matches!(
            action("story prev"),
            UserAction::AdvanceStory(StoryDirection::Backward)
        ));
        assert!(parse_command("story sideways", &state()).is_err());
    }

    #[test]
    fn free_text_is_kept_whole() {
        match action("ask what's in   Blue Dream?") {
            UserAction::SendAssistantMessage { text } => {
                assert_eq!(text, "what's in   Blue Dream?")
            }
            other => panic!("{other:?}"),
        }
        match parse_command("describe Lemon Haze", &state()) {
            Ok(Some(Command::Describe(strain))) => assert_eq!(strain, "Lemon Haze"),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn incomplete_login_still_reaches_the_reducer() {
        match action("login terp_king") {
            UserAction::SubmitAuth(form) => {
                assert_eq!(form.handle, "terp_king");
                assert_eq!(form.password, "");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn earnings_needs_own_creator_profile() {
        let mut state = creator();
        assert!(matches!(
            parse_command("go earnings", &state),
            Ok(Some(Command::Action(UserAction::Navigate(ViewSelector::Earnings))))
        ));

        let goddess = state.catalog.identities[0].clone();
        reduce(
            &mut state,
            SessionAction::User(UserAction::SelectProfile(goddess)),
        );
        assert!(parse_command("go earnings", &state).is_err());

        let fan = state.catalog.identities[1].clone();
        assert!(parse_command("go earnings", &signed_in_as(fan)).is_err());
        assert!(parse_command("go earnings", &self::state()).is_err());
    }

    #[test]
    fn upgrade_is_refused_once_premium() {
        let state = creator();
        assert!(matches!(
            parse_command("upgrade", &state),
            Ok(Some(Command::Action(UserAction::UpgradeToPremium)))
        ));

        let premium = state.catalog.identities[0].clone();
        let err = parse_command("upgrade", &signed_in_as(premium)).unwrap_err();
        assert_eq!(err.to_string(), "already on Pheno+");
    }

    #[test]
    fn metaverse_commands() {
        assert!(matches!(action("link"), UserAction::ConnectMetaverse));
        assert!(matches!(action("mic"), UserAction::ToggleMic));
        assert!(matches!(action("room LEAVE"), UserAction::LeaveRoom));
        match action("room Growers Guild VR") {
            UserAction::JoinRoom { room_id } => assert_eq!(room_id, "Growers Guild VR"),
            other => panic!("{other:?}"),
        }
        assert!(parse_command("room", &state()).is_err());
    }

    #[test]
    fn status_and_panels() {
        assert!(matches!(
            parse_command("status json", &state()),
            Ok(Some(Command::Status { json: true }))
        ));
        assert!(matches!(
            parse_command("show log", &state()),
            Ok(Some(Command::Show(Panel::Activity)))
        ));
        assert!(parse_command("frobnicate", &state()).is_err());
    }
}
