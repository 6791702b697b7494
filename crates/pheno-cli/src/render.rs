use std::fmt::Write;

use pheno_core::catalog::Catalog;
use pheno_core::catalog::Post;
use pheno_core::format_cents;
use pheno_core::BillingCycle;
use pheno_core::CashOutStatus;
use pheno_core::ChatRole;
use pheno_core::Identity;
use pheno_core::IdentityId;
use pheno_core::LinkStatus;
use pheno_core::SessionState;
use pheno_core::ViewSelector;

use crate::commands::Panel;

fn badge(identity: &Identity) -> String {
    let mut out = format!("@{}", identity.handle);
    if identity.verified {
        out.push_str(" ✓");
    }
    if identity.premium {
        out.push_str(" +");
    }
    out
}

/// One-line summary printed after every state change.
pub fn status_line(state: &SessionState) -> String {
    let Some(me) = state.identity.as_ref() else {
        let mut line = "[signed out] login HANDLE PASSWORD or signup HANDLE PASSWORD".to_string();
        if let Some(err) = state.auth.error.as_deref() {
            let _ = write!(line, " | {err}");
        }
        return line;
    };

    let mut line = format!("[{}] {}", state.view.label(), badge(me));
    if state.view == ViewSelector::Profile {
        if let Some(subject) = state.profile_subject().filter(|_| !state.viewing_own_profile()) {
            let _ = write!(line, " viewing {}", badge(subject));
        }
    }
    if let Some(peer) = state.inbox.active.as_ref() {
        let _ = write!(line, " | thread {}", peer.as_str());
    }
    if let Some(cursor) = state.story.as_ref() {
        let _ = write!(
            line,
            " | story {} ({}/{}) {}%",
            cursor.story_id.0,
            cursor.index + 1,
            state.catalog.stories.len(),
            cursor.progress
        );
    }
    if state.assistant.is_waiting() {
        let _ = write!(line, " | BudBot thinking ({})", state.assistant.pending);
    }
    if state.draft.generating {
        let _ = write!(line, " | captioning");
    }
    if state.paywall.processing {
        let _ = write!(line, " | checkout pending");
    }
    if state.view == ViewSelector::Metaverse {
        match state.metaverse.active_room.as_deref() {
            Some(room) => {
                let mic = if state.metaverse.mic_on { "on" } else { "off" };
                let _ = write!(line, " | in {room} (mic {mic})");
            }
            None => {
                let _ = write!(line, " | link {}", link_label(state.metaverse.connection));
            }
        }
    }
    match state.earnings.cash_out {
        CashOutStatus::Idle => {}
        CashOutStatus::Processing => line.push_str(" | cash out processing"),
        CashOutStatus::Succeeded => line.push_str(" | cash out sent"),
    }
    if !state.view.shows_nav_bar() {
        line.push_str(" | nav hidden");
    }
    line
}

fn link_label(status: LinkStatus) -> &'static str {
    match status {
        LinkStatus::Idle => "idle",
        LinkStatus::Connecting => "connecting",
        LinkStatus::Connected => "connected",
    }
}

/// The newest message in `peer`'s thread, labelled with their handle.
pub fn direct_reply(state: &SessionState, peer: &IdentityId) -> Option<String> {
    let message = state.inbox.last_message(peer)?;
    let sender = state
        .catalog
        .identity(&message.sender)
        .map(|identity| identity.handle.as_str())
        .unwrap_or(message.sender.as_str());
    Some(format!("@{sender}: {}", message.text))
}

fn post_line(post: &Post, gifted: bool) -> String {
    let mut line = format!(
        "{:<12} {} {}{} · {} likes · {} comments · {}",
        post.id.0,
        badge(&post.author),
        if post.liked { "♥ " } else { "" },
        post.caption,
        post.likes,
        post.comments,
        post.posted
    );
    if let Some(song) = post.song.as_ref() {
        let _ = write!(line, " · ♪ {} by {}", song.title, song.artist);
    }
    if let Some(location) = post.location.as_deref() {
        let _ = write!(line, " · {location}");
    }
    if gifted {
        line.push_str(" · gifted");
    }
    line
}

pub fn panel(state: &SessionState, panel: Panel) -> String {
    let mut out = String::new();
    match panel {
        Panel::Feed => {
            let _ = writeln!(out, "feed ({})", state.feed.tab.label());
            for post in state.feed.visible() {
                let _ = writeln!(out, "  {}", post_line(post, state.feed.gifted.contains(&post.id)));
            }
        }
        Panel::Reels => {
            for reel in &state.feed.reels {
                let _ = writeln!(out, "  {}", post_line(reel, state.feed.gifted.contains(&reel.id)));
            }
        }
        Panel::Stories => {
            for story in &state.catalog.stories {
                let open = state
                    .story
                    .as_ref()
                    .is_some_and(|cursor| cursor.story_id == story.id);
                let _ = writeln!(
                    out,
                    "{} {:<10} {}{}",
                    if open { ">" } else { " " },
                    story.id.0,
                    badge(&story.author),
                    if story.viewed { " (seen)" } else { "" }
                );
            }
        }
        Panel::Inbox => {
            for (peer, thread) in &state.inbox.threads {
                let handle = state
                    .catalog
                    .identity(peer)
                    .map(|identity| identity.handle.as_str())
                    .unwrap_or(peer.as_str());
                let preview = thread.last().map(|msg| msg.text.as_str()).unwrap_or("");
                let _ = writeln!(out, "  @{handle:<22} {preview}");
            }
        }
        Panel::Thread => match state.inbox.active.as_ref() {
            Some(peer) => {
                for message in state.inbox.thread(peer) {
                    let who = if &message.sender == peer { "them" } else { "you" };
                    let _ = writeln!(
                        out,
                        "  {} {:>4}: {}",
                        message.sent_at.format("%H:%M"),
                        who,
                        message.text
                    );
                }
            }
            None => out.push_str("no thread open\n"),
        },
        Panel::Chat => {
            for message in &state.assistant.transcript {
                let who = match message.role {
                    ChatRole::User => "you",
                    ChatRole::Model => "BudBot",
                };
                let _ = writeln!(out, "{who}: {}", message.text);
                for citation in &message.citations {
                    let _ = writeln!(out, "    [{}] {}", citation.title, citation.uri);
                }
            }
        }
        Panel::Draft => {
            let draft = &state.draft;
            let image = if draft.image.is_some() { "attached" } else { "none" };
            let song = draft
                .song_id
                .as_deref()
                .and_then(|id| state.catalog.song(id))
                .map(|song| format!("{} by {}", song.title, song.artist))
                .unwrap_or_else(|| "none".to_string());
            let _ = writeln!(out, "image:   {image}");
            let _ = writeln!(out, "caption: {}", draft.caption);
            let _ = writeln!(out, "song:    {song}");
            if draft.generating {
                out.push_str("(caption in progress)\n");
            }
        }
        Panel::Earnings => {
            let balance = state
                .identity
                .as_ref()
                .map(|me| me.balance_cents)
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "balance {} · timeframe {:?} · cash out {:?}",
                format_cents(balance),
                state.earnings.timeframe,
                state.earnings.cash_out
            );
            for tx in &state.catalog.transactions {
                let _ = writeln!(
                    out,
                    "  {:<20} {:<22} +{} {}",
                    tx.kind.label(),
                    tx.counterparty,
                    format_cents(tx.amount_cents),
                    tx.when
                );
            }
        }
        Panel::Rooms => {
            let premium = state.identity.as_ref().is_some_and(|me| me.premium);
            let _ = writeln!(out, "phenoverse link {}", link_label(state.metaverse.connection));
            for room in &state.catalog.rooms {
                let access = if room.locked && !premium {
                    "Pheno+ only"
                } else {
                    "enter"
                };
                let _ = writeln!(
                    out,
                    "  {} {:<18} {:>4} connected · {:<11} · {access}",
                    room.id, room.name, room.occupants, room.vibe
                );
            }
        }
        Panel::Activity => {
            for entry in state.activity.iter() {
                let _ = writeln!(out, "{:>5} {:?} {}", entry.seq, entry.kind, entry.message);
            }
        }
    }
    out
}

pub fn catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "accounts");
    for identity in std::iter::once(&catalog.me).chain(catalog.identities.iter()) {
        let _ = writeln!(out, "  {:<8} {}", identity.id.as_str(), badge(identity));
    }
    let _ = writeln!(out, "songs");
    for song in &catalog.songs {
        let _ = writeln!(
            out,
            "  {:<4} {} by {} ({}:{:02})",
            song.id,
            song.title,
            song.artist,
            song.duration_secs / 60,
            song.duration_secs % 60
        );
    }
    let _ = writeln!(out, "stories");
    for story in &catalog.stories {
        let _ = writeln!(out, "  {:<10} {}", story.id.0, badge(&story.author));
    }
    let _ = writeln!(out, "posts");
    for post in catalog.posts.iter().chain(catalog.reels.iter()) {
        let _ = writeln!(out, "  {}", post_line(post, false));
    }
    let _ = writeln!(out, "plans");
    for cycle in [BillingCycle::Monthly, BillingCycle::Yearly] {
        let _ = writeln!(out, "  {:<8} {}", cycle.label(), format_cents(cycle.price_cents()));
    }
    out
}
