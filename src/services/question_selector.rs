use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sqlx::PgPool;

use crate::db::models::{Question, QuestionOption};
use crate::repositories;
use crate::services::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct OptionView {
    pub(crate) id: i64,
    pub(crate) text: String,
}

/// A question as delivered to the student: no correct answer, options in
/// a per-call random order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct QuestionView {
    pub(crate) id: i64,
    pub(crate) topic_id: i64,
    pub(crate) text: String,
    pub(crate) options: Vec<OptionView>,
}

/// Uniform sample of `count` distinct questions, or the whole pool when it is
/// not larger than `count`.
pub(crate) fn sample_questions<R: Rng + ?Sized>(
    mut pool: Vec<Question>,
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    if pool.len() <= count {
        return pool;
    }

    let (chosen, _) = pool.partial_shuffle(rng, count);
    chosen.to_vec()
}

pub(crate) fn attach_shuffled_options<R: Rng + ?Sized>(
    questions: Vec<Question>,
    options: Vec<QuestionOption>,
    rng: &mut R,
) -> Vec<QuestionView> {
    let mut by_question: HashMap<i64, Vec<OptionView>> = HashMap::new();
    for option in options {
        by_question
            .entry(option.question_id)
            .or_default()
            .push(OptionView { id: option.id, text: option.text });
    }

    questions
        .into_iter()
        .map(|question| {
            let mut options = by_question.remove(&question.id).unwrap_or_default();
            options.shuffle(rng);
            QuestionView {
                id: question.id,
                topic_id: question.topic_id,
                text: question.text,
                options,
            }
        })
        .collect()
}

/// Draws a fresh batch for `test_id`. Nothing is pinned to a session, so two
/// calls may return different subsets and option orders.
pub(crate) async fn select_questions(
    pool: &PgPool,
    test_id: i64,
    count: u32,
) -> ServiceResult<Vec<QuestionView>> {
    let mut rng = StdRng::from_entropy();
    select_questions_with(pool, test_id, count, &mut rng).await
}

pub(crate) async fn select_questions_with(
    pool: &PgPool,
    test_id: i64,
    count: u32,
    rng: &mut StdRng,
) -> ServiceResult<Vec<QuestionView>> {
    repositories::test_catalog::find_by_id(pool, test_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Test", test_id))?;

    let topic_ids = repositories::test_catalog::topic_ids(pool, test_id).await?;
    if topic_ids.is_empty() {
        tracing::warn!(test_id, "Test has no topics configured");
        return Err(ServiceError::validation("No topics are selected for this test"));
    }

    let candidates = repositories::questions::list_pool(pool, test_id, &topic_ids).await?;
    if candidates.is_empty() {
        tracing::warn!(test_id, topics = topic_ids.len(), "Topic pool is empty");
        return Err(ServiceError::validation("No questions are available for this test"));
    }

    let pool_size = candidates.len();
    let selected = sample_questions(candidates, count as usize, rng);

    let question_ids: Vec<i64> = selected.iter().map(|question| question.id).collect();
    let options = repositories::questions::list_options(pool, &question_ids).await?;

    tracing::info!(test_id, pool_size, selected = selected.len(), "Question batch drawn");

    Ok(attach_shuffled_options(selected, options, rng))
}
