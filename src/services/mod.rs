pub(crate) mod answer_recorder;
pub(crate) mod errors;
pub(crate) mod question_selector;
pub(crate) mod result_aggregator;
pub(crate) mod session_manager;
