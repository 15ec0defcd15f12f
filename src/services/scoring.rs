// src/services/scoring.rs

use std::collections::HashMap;

use crate::{
    error::AppError,
    models::question::{ANSWER_FIELD_PREFIX, QuizDetail},
};

/// Result of scoring one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// Number of correctly answered questions, in `[0, question_count]`.
    pub score: i64,

    /// True when at least one question had no answer. The score is then 0
    /// and the submission must be rejected as a whole.
    pub unanswered: bool,
}

/// Extracts `question_<id> -> choice id` pairs from a submitted form.
///
/// Fields without the answer prefix (csrf tokens, submit buttons) are ignored.
/// Empty values count as "no answer" for that question.
pub fn parse_answers(form: &HashMap<String, String>) -> Result<HashMap<i64, i64>, AppError> {
    let mut answers = HashMap::with_capacity(form.len());

    for (field, value) in form {
        let Some(raw_id) = field.strip_prefix(ANSWER_FIELD_PREFIX) else {
            continue;
        };

        let question_id = raw_id
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest(format!("Malformed answer field '{}'", field)))?;

        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let choice_id = value.parse::<i64>().map_err(|_| {
            AppError::InvalidChoice(format!(
                "Choice '{}' is not valid for question {}",
                value, question_id
            ))
        })?;

        answers.insert(question_id, choice_id);
    }

    Ok(answers)
}

/// Scores a submission against the stored correct choices.
///
/// Questions are walked in the quiz's natural order. The first question
/// without an answer stops the walk and the whole submission is reported
/// as unanswered; partial credit is never awarded. Answers to questions that
/// are not part of the quiz are ignored.
pub fn score(quiz: &QuizDetail, answers: &HashMap<i64, i64>) -> Result<ScoreOutcome, AppError> {
    let mut score = 0;

    for entry in &quiz.questions {
        let question_id = entry.question.id;

        let Some(&choice_id) = answers.get(&question_id) else {
            return Ok(ScoreOutcome {
                score: 0,
                unanswered: true,
            });
        };

        let choice = entry.choice(choice_id).ok_or_else(|| {
            AppError::InvalidChoice(format!(
                "Choice {} does not belong to question {}",
                choice_id, question_id
            ))
        })?;

        if choice.is_correct {
            score += 1;
        }
    }

    Ok(ScoreOutcome {
        score,
        unanswered: false,
    })
}
