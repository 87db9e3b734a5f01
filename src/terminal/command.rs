use std::str::FromStr;

use thiserror::Error;

use crate::models::{OptionLabel, ParseOptionError};
use crate::services::exam_session::ExitChoice;

/// One line typed by the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Show,
    /// 1-based question number as printed by `show`.
    Answer { number: usize, option: OptionLabel },
    Status,
    Submit,
    Exit,
    Back,
    Navigate(String),
    Choose(ExitChoice),
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    InvalidOption(#[from] ParseOptionError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = parts.collect();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("show", []) => Command::Show,
            ("status", []) => Command::Status,
            ("submit", []) => Command::Submit,
            ("exit", []) => Command::Exit,
            ("back", []) => Command::Back,
            ("help", []) => Command::Help,
            ("continue", []) => Command::Choose(ExitChoice::Continue),
            ("goback", []) => Command::Choose(ExitChoice::GoBack),
            ("exitsubmit", []) => Command::Choose(ExitChoice::ExitAndSubmit),
            ("answer", [number, option]) => {
                let number = number
                    .parse::<usize>()
                    .ok()
                    .filter(|number| *number > 0)
                    .ok_or(CommandError::Usage("answer <question-number> <A-D>"))?;
                Command::Answer { number, option: option.parse()? }
            }
            ("answer", _) => return Err(CommandError::Usage("answer <question-number> <A-D>")),
            ("nav", [path]) if path.starts_with('/') => Command::Navigate((*path).to_string()),
            ("nav", _) => return Err(CommandError::Usage("nav </path>")),
            (other, _) => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

pub(crate) const HELP: &str = "\
commands:
  show                 list questions with your answers
  answer <n> <A-D>     answer question n
  status               time remaining and progress
  submit               submit the exam
  exit                 open the exit prompt
  back                 browser back
  nav </path>          navbar navigation
  continue | goback | exitsubmit   answer the exit prompt";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answer_with_lowercase_option() {
        assert_eq!(
            "answer 2 c".parse::<Command>(),
            Ok(Command::Answer { number: 2, option: OptionLabel::C })
        );
    }

    #[test]
    fn parses_prompt_choices_and_navigation() {
        assert_eq!("exitsubmit".parse::<Command>(), Ok(Command::Choose(ExitChoice::ExitAndSubmit)));
        assert_eq!("  GOBACK ".parse::<Command>(), Ok(Command::Choose(ExitChoice::GoBack)));
        assert_eq!(
            "nav /student/results".parse::<Command>(),
            Ok(Command::Navigate("/student/results".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert!(matches!("answer 0 A".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("answer 1 E".parse::<Command>(), Err(CommandError::InvalidOption(_))));
        assert!(matches!("nav results".parse::<Command>(), Err(CommandError::Usage(_))));
        assert_eq!("dance".parse::<Command>(), Err(CommandError::Unknown("dance".to_string())));
    }
}
