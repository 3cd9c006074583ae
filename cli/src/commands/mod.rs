pub mod carve;
pub mod inspect;
