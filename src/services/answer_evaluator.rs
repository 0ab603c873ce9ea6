use crate::errors::AppResult;
use crate::models::domain::Question;
use crate::models::dto::response::AnswerOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: bool,
    /// Only populated for incorrect answers whose designated option has text.
    pub correct_answer: Option<String>,
}

impl From<Evaluation> for AnswerOutcome {
    fn from(evaluation: Evaluation) -> Self {
        AnswerOutcome {
            correct: evaluation.correct,
            correct_answer: evaluation.correct_answer,
        }
    }
}

pub struct AnswerEvaluator;

impl AnswerEvaluator {
    /// Evaluate a submitted answer against the question's canonical response.
    ///
    /// A question without a canonical response is an error, never an automatic miss.
    pub fn evaluate(question: &Question, user_id: &str, submitted: &str) -> AppResult<Evaluation> {
        let correct = question.is_correct_answer(submitted)?;

        let correct_answer = if correct {
            None
        } else {
            question.correct_answer_text()?
        };

        log::debug!(
            "Evaluated answer from user '{}' to question '{}': correct={}",
            user_id,
            question.id(),
            correct
        );

        Ok(Evaluation {
            correct,
            correct_answer,
        })
    }
}
