use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Answer;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubmitAnswerRequest {
    #[validate(range(min = 1, message = "question_id must be positive"))]
    pub(crate) question_id: i64,
    #[validate(length(min = 1, max = 500, message = "answer must be 1-500 characters"))]
    pub(crate) answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAnswerResponse {
    pub(crate) answer_id: i64,
    pub(crate) question_id: i64,
    pub(crate) is_correct: bool,
    pub(crate) recorded_at: String,
}

impl From<Answer> for SubmitAnswerResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer_id: answer.id,
            question_id: answer.question_id,
            is_correct: answer.is_correct,
            recorded_at: format_primitive(answer.created_at),
        }
    }
}
