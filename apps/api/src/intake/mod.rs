// Intake: the seven-field candidate form, its exit-keyword check and completeness rules.

pub mod validation;
