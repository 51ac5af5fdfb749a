pub(crate) mod blur;
pub(crate) mod buffer;
pub(crate) mod plane;
pub(crate) mod resample;
pub(crate) mod sample;
