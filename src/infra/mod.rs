pub mod export;
pub mod github;
