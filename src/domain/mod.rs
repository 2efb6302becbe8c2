pub mod body;
pub mod labels;
pub mod tracker;
