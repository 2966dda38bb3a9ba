pub(crate) mod analysis;
pub(crate) mod health;
pub(crate) mod portfolios;
pub(crate) mod qa;
pub(crate) mod sessions;
