pub(crate) mod answers;
pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod results;
pub(crate) mod sessions;
pub(crate) mod students;
pub(crate) mod test_catalog;
