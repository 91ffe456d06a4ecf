use client_core::GameSnapshot;
use shared::domain::{CurrentQuestion, GameLifecycle, GenieState};

pub fn genie_face(state: GenieState) -> &'static str {
    match state {
        GenieState::Idle => "(o_o)",
        GenieState::Yes => "(^o^)",
        GenieState::No => "(>_<)",
        GenieState::Unsure => "(o_O)",
        GenieState::Thinking => "(-_-)",
    }
}

pub fn speech_bubble(message: &str, thinking: bool) -> String {
    if thinking {
        format!("< {message} ... >")
    } else {
        format!("< {message} >")
    }
}

pub fn question_display(question: &CurrentQuestion, number: u32, total: u32) -> String {
    format!("Question {number}/{total}: {}", question.text)
}

pub fn controls(snapshot: &GameSnapshot) -> &'static str {
    match snapshot.lifecycle {
        GameLifecycle::NotStarted if snapshot.round_in_progress => "",
        GameLifecycle::NotStarted => "[begin] Begin the Divination",
        GameLifecycle::InProgress if snapshot.answers_enabled() => "[yes] [no] [unsure]",
        GameLifecycle::InProgress => "(the genie is listening...)",
        GameLifecycle::Finished => "[restart] Summon Again",
    }
}

pub fn render_snapshot(snapshot: &GameSnapshot) -> String {
    let mut lines = vec![format!(
        "{} {}",
        genie_face(snapshot.genie),
        speech_bubble(&snapshot.message, snapshot.thinking)
    )];

    if snapshot.lifecycle == GameLifecycle::InProgress {
        if let Some(question) = &snapshot.question {
            lines.push(question_display(
                question,
                snapshot.question_number,
                snapshot.total_questions,
            ));
        }
    }

    let controls = controls(snapshot);
    if !controls.is_empty() {
        lines.push(controls.to_string());
    }
    lines.join("\n")
}
