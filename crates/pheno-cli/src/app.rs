use std::sync::Arc;

use anyhow::Result;
use pheno_core::catalog::Catalog;
use pheno_core::config::Config;
use pheno_core::reduce;
use pheno_core::ActivityLog;
use pheno_core::CashOutStatus;
use pheno_core::IdentityId;
use pheno_core::LinkStatus;
use pheno_core::RuntimeAction;
use pheno_core::SessionAction;
use pheno_core::SessionState;
use pheno_core::StoryId;
use pheno_exec::EffectRunner;
use pheno_exec::GenerativeText;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc::unbounded_channel;
use tracing::debug;
use tracing::info;

use crate::commands::parse_command;
use crate::commands::Command;
use crate::commands::HELP;
use crate::render;

/// Line-oriented session driver: stdin commands and runtime results are
/// folded into one `SessionState`, one action at a time.
pub async fn run(config: Config, genai: Arc<dyn GenerativeText>) -> Result<()> {
    let mut state = SessionState::new(Arc::new(Catalog::demo()));
    state.activity = ActivityLog::new(config.session.activity_capacity);

    let (tx, mut rx) = unbounded_channel::<RuntimeAction>();
    let mut runner = EffectRunner::new(tx, Arc::clone(&genai), config.playback.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(model = %config.assistant.model, "session started");
    println!("{}", render::status_line(&state));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                let command = match parse_command(&line, &state) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(err) => {
                        println!("! {err}");
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Status { json: true } => println!("{}", state.snapshot().to_json()?),
                    Command::Status { json: false } => println!("{}", render::status_line(&state)),
                    Command::Show(panel) => print!("{}", render::panel(&state, panel)),
                    Command::Describe(strain) => {
                        let genai = Arc::clone(&genai);
                        tokio::spawn(async move {
                            let text = genai.describe_strain(&strain).await;
                            println!("{strain}: {text}");
                        });
                    }
                    Command::Action(action) => {
                        let effects = reduce(&mut state, SessionAction::User(action));
                        if runner.dispatch_all(effects) {
                            println!("{}", render::status_line(&state));
                        }
                    }
                }
            }
            Some(action) = rx.recv() => {
                let before = Observed::of(&state);
                let replying = match &action {
                    RuntimeAction::DirectReplyArrived { peer, .. } => Some(peer.clone()),
                    _ => None,
                };
                let effects = reduce(&mut state, SessionAction::Runtime(action));
                let frame = runner.dispatch_all(effects);
                if frame {
                    announce(&state, &before, replying.as_ref());
                }
            }
        }
    }

    info!(events = state.activity.len(), "session ended");
    Ok(())
}

/// The bits of state worth announcing when a background result lands.
struct Observed {
    story: Option<StoryId>,
    transcript: usize,
    messages: usize,
    caption: String,
    premium: bool,
    cash_out: CashOutStatus,
    link: LinkStatus,
}

impl Observed {
    fn of(state: &SessionState) -> Self {
        Self {
            story: state.story.as_ref().map(|cursor| cursor.story_id.clone()),
            transcript: state.assistant.transcript.len(),
            messages: state.inbox.threads.values().map(Vec::len).sum(),
            caption: state.draft.caption.clone(),
            premium: state.identity.as_ref().is_some_and(|me| me.premium),
            cash_out: state.earnings.cash_out,
            link: state.metaverse.connection,
        }
    }
}

fn announce(state: &SessionState, before: &Observed, replying: Option<&IdentityId>) {
    let now = Observed::of(state);
    if now.transcript != before.transcript {
        if let Some(reply) = state.assistant.transcript.last() {
            println!("BudBot: {}", reply.text);
            for citation in &reply.citations {
                println!("    [{}] {}", citation.title, citation.uri);
            }
        }
    }
    if now.messages != before.messages {
        if let Some(line) = replying.and_then(|peer| render::direct_reply(state, peer)) {
            println!("{line}");
        }
    }
    if now.caption != before.caption {
        println!("caption: {}", now.caption);
    }
    if now.premium && !before.premium {
        println!("welcome to Pheno+");
    }
    if now.link == LinkStatus::Connected && before.link != LinkStatus::Connected {
        println!("phenoverse link established");
    }

    let changed = now.story != before.story
        || now.premium != before.premium
        || now.cash_out != before.cash_out
        || now.transcript != before.transcript
        || now.messages != before.messages
        || now.link != before.link;
    if changed {
        println!("{}", render::status_line(state));
    } else {
        debug!("runtime frame without visible change");
    }
}
