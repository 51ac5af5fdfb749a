pub(crate) mod homography;
pub(crate) mod placement;
