// Response collection: one answer box per question, drafts kept in the session,
// final echo of question/answer pairs.

pub mod collector;
