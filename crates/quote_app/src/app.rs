use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveTime, Weekday};
use quote_domain::{
    FavoriteItem, FavoriteToggle, MemorySink, NotificationContent, PermissionStatus, PolicyConfig,
    QuoteService, TriggerStyle,
};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) policy: PolicyConfig,
    pub(crate) permission_answer: PermissionStatus,
    pub(crate) rng_seed: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = lookup("QUOTES_DAILY_TIME") {
            match parse_time(&value) {
                Some(time) => config.policy.daily_time = time,
                None => warn!(%value, "ignoring invalid QUOTES_DAILY_TIME"),
            }
        }
        if let Some(value) = lookup("QUOTES_WEEKLY_TIME") {
            match parse_time(&value) {
                Some(time) => config.policy.weekly_time = time,
                None => warn!(%value, "ignoring invalid QUOTES_WEEKLY_TIME"),
            }
        }
        if let Some(value) = lookup("QUOTES_WEEKLY_DAY") {
            match value.trim().parse::<Weekday>() {
                Ok(day) => config.policy.weekly_weekday = day,
                Err(_) => warn!(%value, "ignoring invalid QUOTES_WEEKLY_DAY"),
            }
        }
        if let Some(value) = lookup("QUOTES_TRIGGER_STYLE") {
            match TriggerStyle::parse(&value) {
                Some(style) => config.policy.trigger_style = style,
                None => warn!(%value, "ignoring invalid QUOTES_TRIGGER_STYLE"),
            }
        }
        if let Some(value) = lookup("QUOTES_NOTIFICATIONS") {
            match value.trim().to_ascii_lowercase().as_str() {
                "granted" | "allow" => config.permission_answer = PermissionStatus::Granted,
                "denied" | "deny" => config.permission_answer = PermissionStatus::Denied,
                _ => warn!(%value, "ignoring invalid QUOTES_NOTIFICATIONS"),
            }
        }
        if let Some(value) = lookup("QUOTES_RNG_SEED") {
            match value.trim().parse::<u64>() {
                Ok(seed) => config.rng_seed = Some(seed),
                Err(_) => warn!(%value, "ignoring invalid QUOTES_RNG_SEED"),
            }
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            permission_answer: PermissionStatus::Granted,
            rng_seed: None,
        }
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open,
    Save(FavoriteItem),
    Remove(u32),
    Favorites,
    Scheduled,
    Help,
    Quit,
}

const WHEN: &str = "%a %Y-%m-%d %H:%M";

const HELP: &str = "\
commands:
  open                          open the quotes screen (permission + schedules)
  save <id> <author> | <quote>  toggle a quote as favorite
  remove <id>                   un-favorite a saved quote
  favorites                     list saved quotes
  scheduled                     show pending notifications
  quit";

/// Parse one shell line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let command = match verb.to_ascii_lowercase().as_str() {
        "open" => Command::Open,
        "favorites" | "favs" => Command::Favorites,
        "scheduled" => Command::Scheduled,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "remove" => Command::Remove(parse_id(rest)?),
        "save" => {
            let (id, rest) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: save <id> <author> | <quote>"))?;
            let (author, content) = rest
                .split_once('|')
                .ok_or_else(|| anyhow!("usage: save <id> <author> | <quote>"))?;
            let (author, content) = (author.trim(), content.trim());
            if author.is_empty() || content.is_empty() {
                bail!("author and quote must both be present");
            }
            Command::Save(FavoriteItem::new(parse_id(id)?, content, author))
        }
        other => bail!("unknown command `{other}`, try `help`"),
    };
    Ok(Some(command))
}

fn parse_id(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .with_context(|| format!("`{}` is not a quote id", value.trim()))
}

struct QuoteShell {
    service: QuoteService,
    sink: Arc<MemorySink>,
}

impl QuoteShell {
    fn new(config: AppConfig) -> Result<Self> {
        info!(
            trigger_style = ?config.policy.trigger_style,
            daily = %config.policy.daily_time,
            weekly = %config.policy.weekly_time,
            "initializing quote session"
        );
        let sink = Arc::new(MemorySink::new().with_prompt_answer(config.permission_answer));
        let mut builder = QuoteService::builder()
            .with_notification_sink(Box::new(Arc::clone(&sink)))
            .with_config(config.policy);
        if let Some(seed) = config.rng_seed {
            builder = builder.with_rng_seed(seed);
        }
        let service = builder
            .build()
            .context("failed to initialize quote service")?;
        Ok(Self { service, sink })
    }

    /// Returns `false` once the user asks to quit.
    fn execute(&self, command: Command, out: &mut impl Write) -> Result<bool> {
        debug!(?command, "executing");
        match command {
            Command::Open => {
                let report = self.service.open_quotes();
                if !report.permission_granted {
                    writeln!(out, "Notifications are off; reminders will not be scheduled.")?;
                }
                if let Some(daily) = &report.daily {
                    writeln!(out, "Daily motivation at {}", daily.trigger_time.format(WHEN))?;
                }
                if let Some(weekly) = &report.weekly {
                    writeln!(out, "Weekly reminder at {}", weekly.trigger_time.format(WHEN))?;
                }
            }
            Command::Save(item) => {
                let id = item.id;
                match self.service.toggle_favorite(item) {
                    FavoriteToggle::Added => writeln!(out, "Saved quote {id}")?,
                    FavoriteToggle::Removed => writeln!(out, "Removed quote {id}")?,
                }
            }
            Command::Remove(id) => {
                let existing = self
                    .service
                    .favorites()
                    .into_iter()
                    .find(|item| item.id == id);
                match existing {
                    Some(item) => {
                        self.service.toggle_favorite(item);
                        writeln!(out, "Removed quote {id}")?;
                    }
                    None => writeln!(out, "Quote {id} is not a favorite")?,
                }
            }
            Command::Favorites => {
                let favorites = self.service.favorites();
                writeln!(out, "Saved Favorites ({})", favorites.len())?;
                for item in favorites {
                    writeln!(
                        out,
                        "  [{}] \"{}\" — {}",
                        item.id,
                        item.content,
                        item.display_author()
                    )?;
                }
            }
            Command::Scheduled => {
                let entries = self.sink.entries();
                writeln!(out, "Pending notifications ({})", entries.len())?;
                for entry in entries {
                    let metadata = entry.content.data.to_metadata()?;
                    writeln!(
                        out,
                        "  {} {} {}",
                        entry.identifier,
                        entry.content.title,
                        serde_json::Value::Object(metadata)
                    )?;
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        for alert in self.sink.take_fired() {
            print_alert(out, &alert)?;
        }
        Ok(true)
    }

    fn run_lines(&self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command, out)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => writeln!(out, "{err:#}")?,
            }
        }
        Ok(())
    }
}

fn print_alert(out: &mut impl Write, alert: &NotificationContent) -> io::Result<()> {
    writeln!(out, "🔔 {}", alert.title)?;
    for line in alert.body.lines() {
        writeln!(out, "   {line}")?;
    }
    Ok(())
}

pub fn run(config: AppConfig) -> Result<()> {
    info!("starting quotes shell");
    let shell = QuoteShell::new(config)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{HELP}")?;
    shell.run_lines(stdin.lock(), &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let config = config_from(&[
            ("QUOTES_DAILY_TIME", "06:30"),
            ("QUOTES_WEEKLY_TIME", "nine"),
            ("QUOTES_WEEKLY_DAY", "friday"),
            ("QUOTES_TRIGGER_STYLE", "calendar"),
            ("QUOTES_NOTIFICATIONS", "denied"),
            ("QUOTES_RNG_SEED", "42"),
        ]);
        assert_eq!(
            config.policy.daily_time,
            NaiveTime::from_hms_opt(6, 30, 0).unwrap()
        );
        assert_eq!(
            config.policy.weekly_time,
            PolicyConfig::default().weekly_time
        );
        assert_eq!(config.policy.weekly_weekday, Weekday::Fri);
        assert_eq!(config.policy.trigger_style, TriggerStyle::Calendar);
        assert_eq!(config.permission_answer, PermissionStatus::Denied);
        assert_eq!(config.rng_seed, Some(42));
    }

    #[test]
    fn parses_shell_commands() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("OPEN").unwrap(), Some(Command::Open));
        assert_eq!(parse_command("remove 12").unwrap(), Some(Command::Remove(12)));
        assert_eq!(
            parse_command("save 3 Mark Twain | Get started.").unwrap(),
            Some(Command::Save(FavoriteItem::new(3, "Get started.", "Mark Twain")))
        );
        assert!(parse_command("save 3 no separator").is_err());
        assert!(parse_command("remove abc").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn shell_session_prints_alerts_and_stops_on_quit() {
        let shell = QuoteShell::new(AppConfig {
            rng_seed: Some(1),
            ..AppConfig::default()
        })
        .unwrap();
        let input = Cursor::new(
            "open\nsave 1 Seneca | Luck is what happens when preparation meets opportunity.\nfavorites\nquit\nsave 2 Ignored | never read\n",
        );
        let mut out = Vec::new();
        shell.run_lines(input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Daily motivation at"));
        assert!(text.contains("Saved quote 1"));
        assert!(text.contains("❤️ Saved to Favorites!"));
        assert!(text.contains("Saved Favorites (1)"));
        assert!(!text.contains("Saved quote 2"));
        assert_eq!(shell.service.favorites_count(), 1);
    }

    #[test]
    fn scheduled_listing_shows_metadata() {
        let shell = QuoteShell::new(AppConfig {
            rng_seed: Some(3),
            ..AppConfig::default()
        })
        .unwrap();
        let mut out = Vec::new();
        shell.execute(Command::Open, &mut out).unwrap();
        shell
            .execute(
                Command::Save(FavoriteItem::new(2, "Know thyself.", "Socrates, type.kindle")),
                &mut out,
            )
            .unwrap();
        out.clear();

        shell.execute(Command::Scheduled, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Pending notifications (2)\n"));
        assert!(text.contains(r#""type":"daily_motivation""#));
        assert!(text.contains(
            r#"{"author":"Socrates","quote":"Know thyself.","type":"weekly_random"}"#
        ));
    }

    #[test]
    fn remove_unknown_favorite_is_reported() {
        let shell = QuoteShell::new(AppConfig::default()).unwrap();
        let mut out = Vec::new();
        shell.execute(Command::Remove(5), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Quote 5 is not a favorite\n");
    }
}
