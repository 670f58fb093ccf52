//! Operator input.
//!
//! Every interactive decision goes through a [`Prompter`], keyed by a
//! [`PromptKey`]. The console implementation reads lines from stdin; the
//! scripted one replays canned answers per key so the same command logic runs
//! unattended in tests.

use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};

/// What is being asked. Scripted answers are queued per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKey {
    Title,
    Pinned,
    Sketch,
    Description,
    Tags,
    Category,
    Character,
    RelatedCharacters,
    AttachAsVariant,
    ImageTitle,
    ImageAlt,
    VariantLabel,
    VariantAlt,
    BaseIndex,
    CreationDate,
    ConfirmDelete,
}

pub trait Prompter {
    /// Ask `question` and return the answer as typed, minus the line ending.
    ///
    /// End of input yields an empty answer.
    fn ask_raw(&mut self, key: PromptKey, question: &str) -> io::Result<String>;

    /// Like [`ask_raw`](Prompter::ask_raw) with surrounding whitespace trimmed.
    fn ask(&mut self, key: PromptKey, question: &str) -> io::Result<String> {
        Ok(self.ask_raw(key, question)?.trim().to_string())
    }

    /// Show an informational line (e.g. a selection menu).
    fn inform(&mut self, line: &str) -> io::Result<()>;

    /// Ask for an optional value; a blank answer is `None`.
    fn optional(&mut self, key: PromptKey, question: &str) -> io::Result<Option<String>> {
        let answer = self.ask(key, question)?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    /// Yes/no question defaulting to no. Any answer starting with `y` is yes.
    fn confirm(&mut self, key: PromptKey, question: &str) -> io::Result<bool> {
        Ok(is_yes(&self.ask(key, question)?))
    }
}

pub fn is_yes(answer: &str) -> bool {
    answer.trim_start().to_lowercase().starts_with('y')
}

/// Split a comma-separated answer, dropping empty items.
pub fn split_list(answer: &str) -> Vec<String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Line-oriented prompter over any reader/writer pair.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr so stdout stays clean for command output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn ask_raw(&mut self, _key: PromptKey, question: &str) -> io::Result<String> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn inform(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }
}

/// Replays queued answers per key. Unqueued keys answer blank.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: HashMap<PromptKey, VecDeque<String>>,
    /// Every question asked, in order, with the answer given.
    pub transcript: Vec<(PromptKey, String, String)>,
    /// Lines passed to [`Prompter::inform`].
    pub shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `value` as the next answer for `key`.
    pub fn answer(mut self, key: PromptKey, value: &str) -> Self {
        self.answers
            .entry(key)
            .or_default()
            .push_back(value.to_string());
        self
    }

    /// Number of times `key` was asked.
    pub fn asked(&self, key: PromptKey) -> usize {
        self.transcript.iter().filter(|(k, _, _)| *k == key).count()
    }

    /// Whether every queued answer was consumed.
    pub fn exhausted(&self) -> bool {
        self.answers.values().all(VecDeque::is_empty)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_raw(&mut self, key: PromptKey, question: &str) -> io::Result<String> {
        let answer = self
            .answers
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();
        self.transcript
            .push((key, question.to_string(), answer.clone()));
        Ok(answer)
    }

    fn inform(&mut self, line: &str) -> io::Result<()> {
        self.shown.push(line.to_string());
        Ok(())
    }
}
