use std::sync::Mutex;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, RngCore, SeedableRng};
use shared::domain::Answer;
use thiserror::Error;

const YES_COMMENTS: &[&str] = &[
    "Ah, as I suspected...",
    "The vision grows clearer.",
    "Yes... the melody takes shape.",
    "The spirits nod in agreement.",
];

const NO_COMMENTS: &[&str] = &[
    "Hmm, not that path then.",
    "The mist shifts in another direction.",
    "A wrong turn, but a useful one.",
    "Interesting... that narrows it down.",
];

const UNSURE_COMMENTS: &[&str] = &[
    "Even mortals forget. No matter.",
    "The fog of memory, I understand.",
    "I shall look deeper instead.",
    "Uncertainty is a clue of its own.",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentTableError {
    #[error("comment list for '{0}' must not be empty")]
    EmptyList(Answer),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTable {
    yes: Vec<String>,
    no: Vec<String>,
    unsure: Vec<String>,
}

impl CommentTable {
    pub fn new(
        yes: Vec<String>,
        no: Vec<String>,
        unsure: Vec<String>,
    ) -> Result<Self, CommentTableError> {
        for (answer, list) in [
            (Answer::Yes, &yes),
            (Answer::No, &no),
            (Answer::Unsure, &unsure),
        ] {
            if list.is_empty() {
                return Err(CommentTableError::EmptyList(answer));
            }
        }
        Ok(Self { yes, no, unsure })
    }

    pub fn comments_for(&self, answer: Answer) -> &[String] {
        match answer {
            Answer::Yes => &self.yes,
            Answer::No => &self.no,
            Answer::Unsure => &self.unsure,
        }
    }
}

impl Default for CommentTable {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            yes: owned(YES_COMMENTS),
            no: owned(NO_COMMENTS),
            unsure: owned(UNSURE_COMMENTS),
        }
    }
}

pub fn pick_comment<'a, R: Rng + ?Sized>(
    table: &'a CommentTable,
    answer: Answer,
    rng: &mut R,
) -> &'a str {
    table
        .comments_for(answer)
        .choose(rng)
        .map(String::as_str)
        .unwrap_or_default()
}

pub struct CommentPicker {
    table: CommentTable,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl CommentPicker {
    pub fn new(table: CommentTable) -> Self {
        Self::with_rng(table, StdRng::from_entropy())
    }

    pub fn with_rng(table: CommentTable, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            table,
            rng: Mutex::new(Box::new(rng)),
        }
    }

    pub fn table(&self) -> &CommentTable {
        &self.table
    }

    pub fn pick(&self, answer: Answer) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pick_comment(&self.table, answer, &mut **rng).to_string()
    }
}

impl Default for CommentPicker {
    fn default() -> Self {
        Self::new(CommentTable::default())
    }
}

#[cfg(test)]
#[path = "tests/comments_tests.rs"]
mod tests;
