//! Slash commands understood by the interactive chat.
//!
//! Anything not starting with `/` is a message for the tutor.

use std::path::PathBuf;

use tutor_core::VoicePersona;

use crate::error::CliError;

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Send text to the tutor.
    Say(String),
    /// Read message `n` (1-based, as listed by `/history`); the latest reply
    /// when omitted.
    Read(Option<usize>),
    Stop,
    Speed(f32),
    Seek(f64),
    /// Save message audio as WAV.
    Save {
        index: Option<usize>,
        dir: Option<PathBuf>,
    },
    Clear,
    /// Replace the learning goals: `/goals objectives | knowledge`.
    Goals {
        objectives: String,
        knowledge_base: String,
    },
    Voice(VoicePersona),
    Autoplay(bool),
    History,
    Status,
    Help,
    Quit,
    /// Blank line.
    Empty,
}

pub const HELP: &str = "\
Commands:
  /read [n]          read message n aloud (latest reply by default)
  /stop              stop playback
  /speed <0.5-2.0>   change playback rate
  /seek <seconds>    jump within the current reply
  /save [n] [dir]    save message audio as a WAV file
  /history           list messages
  /status            show playback position and settings
  /goals <obj> | <kb>  set learning objectives and knowledge base
  /voice <name>      switch voice (Puck, Charon, Kore, Fenrir, Zephyr)
  /autoplay on|off   toggle automatic playback of replies
  /clear             clear the conversation
  /help              show this help
  /quit              leave";

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, CliError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Self::Say(line.to_string()));
        };

        let (name, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));

        match name.to_ascii_lowercase().as_str() {
            "read" | "r" => Ok(Self::Read(parse_optional_index(args)?)),
            "stop" | "s" => Ok(Self::Stop),
            "speed" => parse_number(args, "speed").map(Self::Speed),
            "seek" => parse_number(args, "seek").map(Self::Seek),
            "save" => parse_save(args),
            "clear" => Ok(Self::Clear),
            "goals" => {
                let (objectives, knowledge_base) =
                    args.split_once('|').map_or((args, ""), |(o, k)| (o, k));
                Ok(Self::Goals {
                    objectives: objectives.trim().to_string(),
                    knowledge_base: knowledge_base.trim().to_string(),
                })
            }
            "voice" => Ok(Self::Voice(args.parse()?)),
            "autoplay" => parse_toggle(args).map(Self::Autoplay),
            "history" | "h" => Ok(Self::History),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CliError::Arguments(format!(
                "unknown command '/{other}' (try /help)"
            ))),
        }
    }
}

fn parse_optional_index(args: &str) -> Result<Option<usize>, CliError> {
    if args.is_empty() {
        return Ok(None);
    }
    parse_index(args).map(Some)
}

fn parse_index(arg: &str) -> Result<usize, CliError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CliError::Arguments(format!(
            "'{arg}' is not a message number"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(args: &str, command: &str) -> Result<T, CliError> {
    args.parse()
        .map_err(|_| CliError::Arguments(format!("/{command} needs a number, got '{args}'")))
}

fn parse_save(args: &str) -> Result<ReplCommand, CliError> {
    let mut parts = args.split_whitespace();
    let mut index = None;
    let mut dir = None;
    if let Some(first) = parts.next() {
        if first.chars().all(|c| c.is_ascii_digit()) {
            index = Some(parse_index(first)?);
            dir = parts.next().map(PathBuf::from);
        } else {
            dir = Some(PathBuf::from(first));
        }
    }
    if parts.next().is_some() {
        return Err(CliError::Arguments("usage: /save [n] [dir]".into()));
    }
    Ok(ReplCommand::Save { index, dir })
}

fn parse_toggle(args: &str) -> Result<bool, CliError> {
    match args.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CliError::Arguments("usage: /autoplay on|off".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            ReplCommand::parse("  explain osmosis ").unwrap(),
            ReplCommand::Say("explain osmosis".into())
        );
        assert_eq!(ReplCommand::parse("   ").unwrap(), ReplCommand::Empty);
    }

    #[test]
    fn test_read_and_index() {
        assert_eq!(ReplCommand::parse("/read").unwrap(), ReplCommand::Read(None));
        assert_eq!(ReplCommand::parse("/READ 3").unwrap(), ReplCommand::Read(Some(3)));
        assert!(ReplCommand::parse("/read 0").is_err());
        assert!(ReplCommand::parse("/read x").is_err());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(ReplCommand::parse("/speed 1.5").unwrap(), ReplCommand::Speed(1.5));
        assert_eq!(ReplCommand::parse("/seek 12").unwrap(), ReplCommand::Seek(12.0));
        assert!(ReplCommand::parse("/speed").is_err());
    }

    #[test]
    fn test_save_forms() {
        assert_eq!(
            ReplCommand::parse("/save").unwrap(),
            ReplCommand::Save { index: None, dir: None }
        );
        assert_eq!(
            ReplCommand::parse("/save 2 out").unwrap(),
            ReplCommand::Save {
                index: Some(2),
                dir: Some(PathBuf::from("out"))
            }
        );
        assert_eq!(
            ReplCommand::parse("/save exports").unwrap(),
            ReplCommand::Save {
                index: None,
                dir: Some(PathBuf::from("exports"))
            }
        );
        assert!(ReplCommand::parse("/save 1 a b").is_err());
    }

    #[test]
    fn test_goals_split() {
        assert_eq!(
            ReplCommand::parse("/goals pass chemistry | chapter 4 notes").unwrap(),
            ReplCommand::Goals {
                objectives: "pass chemistry".into(),
                knowledge_base: "chapter 4 notes".into()
            }
        );
        assert_eq!(
            ReplCommand::parse("/goals algebra").unwrap(),
            ReplCommand::Goals {
                objectives: "algebra".into(),
                knowledge_base: String::new()
            }
        );
    }

    #[test]
    fn test_voice_and_autoplay() {
        assert_eq!(
            ReplCommand::parse("/voice zephyr").unwrap(),
            ReplCommand::Voice(VoicePersona::Zephyr)
        );
        assert!(matches!(
            ReplCommand::parse("/voice robot"),
            Err(CliError::Config(_))
        ));
        assert_eq!(ReplCommand::parse("/autoplay off").unwrap(), ReplCommand::Autoplay(false));
        assert!(ReplCommand::parse("/autoplay maybe").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = ReplCommand::parse("/dance").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/dance"));
    }
}
