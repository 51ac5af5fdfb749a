pub(crate) mod composite;
pub(crate) mod displacement;
pub(crate) mod light_blend;
pub(crate) mod perspective;
