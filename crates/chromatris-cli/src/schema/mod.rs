pub mod high_score;
pub mod report;
pub mod script;
