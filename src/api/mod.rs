pub(crate) mod admin;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod results;
pub(crate) mod router;
pub(crate) mod sessions;
