pub mod generate;
pub mod history;
