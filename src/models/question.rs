// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::quiz::Quiz;

/// Prefix of the form field carrying the answer to one question.
/// A field `question_12=40` answers question 12 with choice 40.
pub const ANSWER_FIELD_PREFIX: &str = "question_";

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,

    /// Sanitized rich text of the question.
    pub text: String,
}

/// Represents the 'choices' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// A question together with all of its choices.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionWithChoices {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl QuestionWithChoices {
    pub fn choice(&self, choice_id: i64) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// A quiz with its questions in creation order.
#[derive(Debug, Clone, Serialize)]
pub struct QuizDetail {
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithChoices>,
}

/// Choice as shown to a quiz taker (correctness hidden).
#[derive(Debug, Serialize)]
pub struct PublicChoice {
    pub id: i64,
    pub text: String,
}

/// Question as shown to a quiz taker.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,

    /// Name of the form field the answer must be posted under.
    pub field: String,
    pub choices: Vec<PublicChoice>,
}

/// The quiz form served on `GET /take_quiz/{id}/`.
#[derive(Debug, Serialize)]
pub struct QuizForm {
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}

impl From<QuizDetail> for QuizForm {
    fn from(detail: QuizDetail) -> Self {
        let questions = detail
            .questions
            .into_iter()
            .map(|q| PublicQuestion {
                id: q.question.id,
                text: q.question.text,
                field: format!("{}{}", ANSWER_FIELD_PREFIX, q.question.id),
                choices: q
                    .choices
                    .into_iter()
                    .map(|c| PublicChoice {
                        id: c.id,
                        text: c.text,
                    })
                    .collect(),
            })
            .collect();

        Self {
            quiz: detail.quiz,
            questions,
        }
    }
}

/// A choice supplied while authoring a question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewChoice {
    #[validate(length(min = 1, max = 255))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for creating a question together with its choices.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub quiz_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(nested)]
    pub choices: Vec<NewChoice>,
}

/// DTO for updating the text of a question.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

/// DTO for updating a single choice. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChoiceRequest {
    #[validate(length(min = 1, max = 255))]
    pub text: Option<String>,
    pub is_correct: Option<bool>,
}
