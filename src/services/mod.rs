pub mod display;
pub mod markdown;
pub mod random;
pub mod recipes;
#[cfg(feature = "remote")]
pub mod remote;
pub mod slug;
pub mod source;

pub use source::RecipeSource;
