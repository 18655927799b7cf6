use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::TestResult;
use crate::services::result_aggregator::summary_text;

#[derive(Debug, Serialize)]
pub(crate) struct ResultResponse {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) test_id: i64,
    pub(crate) correct_count: i32,
    pub(crate) total_count: i32,
    pub(crate) percentage: f64,
    pub(crate) result_text: String,
    pub(crate) updated_at: String,
}

impl From<TestResult> for ResultResponse {
    fn from(result: TestResult) -> Self {
        Self {
            result_text: summary_text(result.correct_count, result.total_count, result.percentage),
            id: result.id,
            student_id: result.student_id,
            test_id: result.test_id,
            correct_count: result.correct_count,
            total_count: result.total_count,
            percentage: result.percentage,
            updated_at: format_primitive(result.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResultsQuery {
    #[serde(default)]
    pub(crate) student_id: Option<i64>,
    #[serde(default)]
    pub(crate) test_id: Option<i64>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

const fn default_limit() -> i64 {
    100
}
