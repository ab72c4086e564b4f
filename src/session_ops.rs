use std::path::Path;

use anyhow::anyhow;

use crate::session::{list_sessions, SessionStore};
use crate::SessionSubcommand;

pub fn handle_session_command(state_dir: &Path, cmd: &SessionSubcommand) -> anyhow::Result<()> {
    match cmd {
        SessionSubcommand::Info { name } => {
            let store = SessionStore::open(state_dir, name);
            let data = store.load()?;
            println!(
                "session={} helper={} language={} messages={} updated_at={}",
                data.name,
                data.helper_type.as_deref().unwrap_or("-"),
                data.language,
                data.messages.len(),
                data.updated_at
            );
        }
        SessionSubcommand::Show { name, last } => {
            let store = SessionStore::open(state_dir, name);
            let data = store.load()?;
            let len = data.messages.len();
            let start = len.saturating_sub(*last);
            for (idx, m) in data.messages.iter().enumerate().skip(start) {
                let mut line = format!(
                    "{} {}: {}",
                    idx,
                    m.role.as_str().to_uppercase(),
                    m.content.replace('\n', " ")
                );
                if let Some(reason) = &m.parse_error {
                    line.push_str(&format!(" [parse-error: {reason}]"));
                } else if m.parsed.is_some() {
                    line.push_str(" [parsed]");
                }
                println!("{line}");
            }
        }
        SessionSubcommand::Drop { name, from, last } => {
            let store = SessionStore::open(state_dir, name);
            match (from, last) {
                (Some(i), None) => {
                    store.drop_from(*i)?;
                    println!("dropped messages from index {}", i);
                }
                (None, Some(n)) => {
                    store.drop_last(*n)?;
                    println!("dropped last {} messages", n);
                }
                _ => return Err(anyhow!("provide exactly one of --from or --last")),
            }
        }
        SessionSubcommand::Reset { name } => {
            let store = SessionStore::open(state_dir, name);
            store.reset()?;
            println!("session reset");
        }
        SessionSubcommand::List { name_glob } => {
            let sessions = list_sessions(state_dir, name_glob.as_deref())?;
            if sessions.is_empty() {
                println!("no sessions found");
                return Ok(());
            }
            for s in sessions {
                println!(
                    "{}\t{}\t{} messages\t{}",
                    s.name,
                    s.helper_type.as_deref().unwrap_or("-"),
                    s.message_count,
                    s.updated_at
                );
            }
        }
    }
    Ok(())
}
