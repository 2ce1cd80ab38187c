pub mod answer;
pub mod question;
pub mod section;
pub mod test_attempt;
