pub(crate) mod color_space;
pub(crate) mod image;
pub(crate) mod page;
