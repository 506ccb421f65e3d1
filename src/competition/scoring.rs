// src/competition/scoring.rs
// Server-side quiz scoring: points are awarded for every answer matching the
// question's correct option.

use std::collections::HashMap;
use thiserror::Error;

use super::types::{AnsweredQuestion, Answer, Question};

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Question answered more than once: {0}")]
    DuplicateAnswer(String),

    #[error("Selected option {selected} is out of range for question {question_id}")]
    OptionOutOfRange { question_id: String, selected: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub score: i64,
    pub max_score: i64,
    pub correct_count: i64,
    pub question_count: i64,
    pub answers: Vec<AnsweredQuestion>,
}

/// Upper bound for a single question's points.
pub const MAX_QUESTION_POINTS: i64 = 1000;

pub fn max_score(questions: &[Question]) -> i64 {
    questions.iter().map(|q| q.points).sum()
}

/// Score `answers` against `questions`. Unanswered questions earn nothing;
/// the breakdown follows question order.
pub fn score_submission(questions: &[Question], answers: &[Answer]) -> Result<ScoreBreakdown, ScoringError> {
    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let mut selected: HashMap<&str, i64> = HashMap::with_capacity(answers.len());
    for answer in answers {
        let question = by_id
            .get(answer.question_id.as_str())
            .ok_or_else(|| ScoringError::UnknownQuestion(answer.question_id.clone()))?;
        let option_count = question.options.len() as i64;
        if answer.selected_option < 0 || answer.selected_option >= option_count {
            return Err(ScoringError::OptionOutOfRange {
                question_id: answer.question_id.clone(),
                selected: answer.selected_option,
            });
        }
        if selected.insert(question.id.as_str(), answer.selected_option).is_some() {
            return Err(ScoringError::DuplicateAnswer(answer.question_id.clone()));
        }
    }

    let answered: Vec<AnsweredQuestion> = questions
        .iter()
        .map(|q| {
            let choice = selected.get(q.id.as_str()).copied();
            let correct = choice == Some(q.correct_option);
            AnsweredQuestion {
                question_id: q.id.clone(),
                selected_option: choice,
                correct,
                points_awarded: if correct { q.points } else { 0 },
            }
        })
        .collect();

    Ok(ScoreBreakdown {
        score: answered.iter().map(|a| a.points_awarded).sum(),
        max_score: max_score(questions),
        correct_count: answered.iter().filter(|a| a.correct).count() as i64,
        question_count: questions.len() as i64,
        answers: answered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, correct: i64, points: i64) -> Question {
        Question {
            id: id.to_string(),
            competition_id: "c1".to_string(),
            position: 0,
            prompt: format!("prompt {id}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option: correct,
            points,
        }
    }

    fn answer(id: &str, selected: i64) -> Answer {
        Answer {
            question_id: id.to_string(),
            selected_option: selected,
        }
    }

    #[test]
    fn test_sums_points_for_matching_answers() {
        let questions = vec![question("q1", 0, 1), question("q2", 2, 3), question("q3", 1, 5)];
        let answers = vec![answer("q1", 0), answer("q2", 1), answer("q3", 1)];

        let result = score_submission(&questions, &answers).unwrap();
        assert_eq!(result.score, 6);
        assert_eq!(result.max_score, 9);
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.question_count, 3);
        assert!(!result.answers[1].correct);
        assert_eq!(result.answers[2].points_awarded, 5);
    }

    #[test]
    fn test_unanswered_questions_score_zero() {
        let questions = vec![question("q1", 0, 2), question("q2", 1, 2)];
        let result = score_submission(&questions, &[answer("q2", 1)]).unwrap();

        assert_eq!(result.score, 2);
        assert_eq!(result.answers[0].selected_option, None);
        assert!(!result.answers[0].correct);
    }

    #[test]
    fn test_rejects_unknown_and_duplicate() {
        let questions = vec![question("q1", 0, 1)];

        assert_eq!(
            score_submission(&questions, &[answer("nope", 0)]),
            Err(ScoringError::UnknownQuestion("nope".into()))
        );
        assert_eq!(
            score_submission(&questions, &[answer("q1", 0), answer("q1", 1)]),
            Err(ScoringError::DuplicateAnswer("q1".into()))
        );
    }

    #[test]
    fn test_rejects_out_of_range_option() {
        let questions = vec![question("q1", 0, 1)];
        let err = score_submission(&questions, &[answer("q1", 3)]).unwrap_err();
        assert!(matches!(err, ScoringError::OptionOutOfRange { selected: 3, .. }));
    }

    #[test]
    fn test_empty_submission() {
        let questions = vec![question("q1", 0, 4)];
        let result = score_submission(&questions, &[]).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.max_score, 4);
    }
}
