pub mod question;

pub use question::{CreateQuestionRequest, Question, QuestionMeta, QuestionStatus};
