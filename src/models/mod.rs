pub mod answer;
pub mod answer_record;
pub mod group;
pub mod participation;
pub mod question;
pub mod result;
pub mod user;
