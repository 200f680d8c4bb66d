pub mod characters;
pub mod sessions;
