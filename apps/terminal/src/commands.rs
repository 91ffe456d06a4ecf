use std::sync::Arc;

use client_core::{RoundRejected, SessionController};
use shared::domain::Answer;

use crate::render;

pub const HELP_TEXT: &str =
    "commands: begin | yes (y) | no (n) | unsure (u, ?) | restart | status | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Begin,
    Answer(Answer),
    Restart,
    Status,
    Help,
    Quit,
}

impl UiCommand {
    pub fn name(self) -> &'static str {
        match self {
            UiCommand::Begin => "begin",
            UiCommand::Answer(_) => "answer",
            UiCommand::Restart => "restart",
            UiCommand::Status => "status",
            UiCommand::Help => "help",
            UiCommand::Quit => "quit",
        }
    }
}

pub fn parse_command(line: &str) -> Result<UiCommand, String> {
    let word = line.trim().to_ascii_lowercase();
    match word.as_str() {
        "begin" | "start" | "b" => Ok(UiCommand::Begin),
        "restart" | "again" | "r" => Ok(UiCommand::Restart),
        "status" | "s" => Ok(UiCommand::Status),
        "help" | "h" => Ok(UiCommand::Help),
        "quit" | "exit" | "q" => Ok(UiCommand::Quit),
        other => other
            .parse::<Answer>()
            .map(UiCommand::Answer)
            .map_err(|_| format!("Unknown command '{other}'. {HELP_TEXT}")),
    }
}

pub fn rejection_notice(rejected: RoundRejected) -> &'static str {
    match rejected {
        RoundRejected::NoSession => "Begin the divination first.",
        RoundRejected::RoundInProgress => "The genie is still pondering...",
        RoundRejected::NotInProgress => "The divination is over. Type 'restart' to summon again.",
        RoundRejected::AlreadyStarted => "The divination has already begun.",
        RoundRejected::Closed => "The genie has departed.",
    }
}

pub async fn dispatch(controller: &Arc<SessionController>, command: UiCommand) -> Option<String> {
    tracing::debug!(command = command.name(), "dispatching terminal command");
    match command {
        UiCommand::Begin => controller
            .start_game()
            .await
            .err()
            .map(|rejected| rejection_notice(rejected).to_string()),
        UiCommand::Answer(answer) => match controller.submit_answer(answer).await {
            Ok(_round) => None,
            Err(rejected) => Some(rejection_notice(rejected).to_string()),
        },
        UiCommand::Restart => {
            controller.restart().await;
            None
        }
        UiCommand::Status => Some(render::render_snapshot(&controller.snapshot().await)),
        UiCommand::Help => Some(HELP_TEXT.to_string()),
        UiCommand::Quit => None,
    }
}
