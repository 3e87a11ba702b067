//! Quiz question generation from flashcards.
//!
//! All randomness comes from the caller's [`Rng`], so a seeded generator
//! reproduces the same quiz.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::matching::is_answer_correct;
use crate::types::FlashCard;

/// Number of options in a multiple-choice question.
const CHOICES: usize = 4;

/// Filler used when the deck has too few distinct wrong answers.
const FILLER_OPTION: &str = "Other";

/// Share of adaptive questions drawn from weak cards.
const WEAK_FOCUS: f64 = 0.7;

/// Question type options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Written,
}

impl QuestionType {
    /// Draw a type: 40% multiple choice, 30% true/false, 30% written.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll: f64 = rng.gen();
        if roll < 0.4 {
            Self::MultipleChoice
        } else if roll < 0.7 {
            Self::TrueFalse
        } else {
            Self::Written
        }
    }
}

/// A generated quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub card_id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question: String,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Question {
    /// Whether `answer` is right.
    ///
    /// Written answers go through fuzzy grading; choices must match exactly.
    pub fn check(&self, answer: &str, threshold: f64) -> bool {
        match self.kind {
            QuestionType::Written => is_answer_correct(answer, &self.correct_answer, threshold),
            QuestionType::MultipleChoice | QuestionType::TrueFalse => {
                answer.trim() == self.correct_answer
            }
        }
    }
}

/// Build up to `count` questions, each from a different card.
pub fn generate_questions<R: Rng + ?Sized>(
    cards: &[FlashCard],
    count: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<Question> {
    let mut order: Vec<&FlashCard> = cards.iter().collect();
    order.shuffle(rng);

    let mut seen = HashSet::new();
    let picked: Vec<&FlashCard> = order
        .into_iter()
        .filter(|card| seen.insert(card.id.as_str()))
        .take(count)
        .collect();

    picked
        .into_iter()
        .map(|card| {
            let kind = QuestionType::random(rng);
            create_question(card, kind, cards, rng, now)
        })
        .collect()
}

/// One question, favouring weak cards 70% of the time when there are any.
pub fn generate_adaptive_question<R: Rng + ?Sized>(
    cards: &[FlashCard],
    weak_cards: &[FlashCard],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<Question> {
    let focus_on_weak = rng.gen::<f64>() < WEAK_FOCUS && !weak_cards.is_empty();
    let pool = if focus_on_weak { weak_cards } else { cards };

    let card = pool.choose(rng)?;
    let kind = QuestionType::random(rng);
    Some(create_question(card, kind, cards, rng, now))
}

/// Shuffled copy of `cards`.
pub fn shuffle_cards<R: Rng + ?Sized>(cards: &[FlashCard], rng: &mut R) -> Vec<FlashCard> {
    let mut shuffled = cards.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Build a question of the given type for `card`.
pub fn create_question<R: Rng + ?Sized>(
    card: &FlashCard,
    kind: QuestionType,
    all_cards: &[FlashCard],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Question {
    let id = format!("q-{}-{}", card.id, now.timestamp_millis());

    match kind {
        QuestionType::MultipleChoice => Question {
            id,
            card_id: card.id.clone(),
            kind,
            question: card.front.clone(),
            correct_answer: card.back.clone(),
            options: Some(multiple_choice_options(card, all_cards, rng)),
        },
        QuestionType::TrueFalse => {
            let (statement, correct_answer) = if rng.gen_bool(0.5) {
                (card.back.clone(), "True")
            } else {
                (false_statement(&card.back, rng), "False")
            };
            Question {
                id,
                card_id: card.id.clone(),
                kind,
                question: format!("True or False: {} is {}", card.front, statement),
                correct_answer: correct_answer.to_string(),
                options: Some(vec!["True".to_string(), "False".to_string()]),
            }
        }
        QuestionType::Written => Question {
            id,
            card_id: card.id.clone(),
            kind,
            question: card.front.clone(),
            correct_answer: card.back.clone(),
            options: None,
        },
    }
}

fn multiple_choice_options<R: Rng + ?Sized>(
    card: &FlashCard,
    all_cards: &[FlashCard],
    rng: &mut R,
) -> Vec<String> {
    let mut others: Vec<&FlashCard> = all_cards.iter().filter(|c| c.id != card.id).collect();
    others.shuffle(rng);

    let mut options: Vec<String> = Vec::with_capacity(CHOICES);
    for other in others {
        if options.len() == CHOICES - 1 {
            break;
        }
        if other.back != card.back && !options.contains(&other.back) {
            options.push(other.back.clone());
        }
    }
    while options.len() < CHOICES - 1 {
        options.push(FILLER_OPTION.to_string());
    }

    options.push(card.back.clone());
    options.shuffle(rng);
    options
}

/// A plausible but wrong variant of `answer`.
///
/// Falls back to negation when the drawn strategy leaves the text unchanged.
fn false_statement<R: Rng + ?Sized>(answer: &str, rng: &mut R) -> String {
    let statement = match rng.gen_range(0..4) {
        0 => format!("not {}", answer.to_lowercase()),
        1 => increment_numbers(answer),
        2 => answer.split(' ').rev().collect::<Vec<_>>().join(" "),
        _ => format!("the opposite of {}", answer.to_lowercase()),
    };

    if statement == answer {
        format!("not {}", answer.to_lowercase())
    } else {
        statement
    }
}

/// Add one to every run of ASCII digits.
fn increment_numbers(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    let mut digits = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            flush_number(&mut digits, &mut out);
            out.push(c);
        }
    }
    flush_number(&mut digits, &mut out);
    out
}

fn flush_number(digits: &mut String, out: &mut String) {
    if digits.is_empty() {
        return;
    }
    match digits.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
        Some(n) => out.push_str(&n.to_string()),
        None => out.push_str(digits),
    }
    digits.clear();
}
