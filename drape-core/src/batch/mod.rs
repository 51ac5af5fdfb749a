pub(crate) mod driver;
pub(crate) mod job;
pub(crate) mod mask_cache;
