// File: admitbot-core/src/survey/state.rs

use std::fmt;

use admitbot_common::models::Field;

use crate::survey::catalog::INELIGIBLE_OBSTACLE;

/// Position of a session in the fixed question sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyState {
    Name,
    Interviewer,
    CanonicalObstacles,
    SpiritualGuide,
    Impression1,
    Impression2,
    Impression3,
    Impression4,
    Impression5,
    Impression6,
    StudyProblems,
    GeneralComments,
    Verdict,
    AwaitingContinue,
}

/// Successor table in question order.
const TRANSITIONS: [(SurveyState, SurveyState); 13] = [
    (SurveyState::Name, SurveyState::Interviewer),
    (SurveyState::Interviewer, SurveyState::CanonicalObstacles),
    (SurveyState::CanonicalObstacles, SurveyState::SpiritualGuide),
    (SurveyState::SpiritualGuide, SurveyState::Impression1),
    (SurveyState::Impression1, SurveyState::Impression2),
    (SurveyState::Impression2, SurveyState::Impression3),
    (SurveyState::Impression3, SurveyState::Impression4),
    (SurveyState::Impression4, SurveyState::Impression5),
    (SurveyState::Impression5, SurveyState::Impression6),
    (SurveyState::Impression6, SurveyState::StudyProblems),
    (SurveyState::StudyProblems, SurveyState::GeneralComments),
    (SurveyState::GeneralComments, SurveyState::Verdict),
    (SurveyState::Verdict, SurveyState::AwaitingContinue),
];

/// Input-keyed overrides of the successor table: (state, exact input, target).
const SKIP_RULES: [(SurveyState, &str, SurveyState); 1] = [(
    SurveyState::CanonicalObstacles,
    INELIGIBLE_OBSTACLE,
    SurveyState::Verdict,
)];

impl SurveyState {
    /// Every state, question order first, terminal last.
    pub const ALL: [SurveyState; 14] = [
        SurveyState::Name,
        SurveyState::Interviewer,
        SurveyState::CanonicalObstacles,
        SurveyState::SpiritualGuide,
        SurveyState::Impression1,
        SurveyState::Impression2,
        SurveyState::Impression3,
        SurveyState::Impression4,
        SurveyState::Impression5,
        SurveyState::Impression6,
        SurveyState::StudyProblems,
        SurveyState::GeneralComments,
        SurveyState::Verdict,
        SurveyState::AwaitingContinue,
    ];

    /// The answer slot filled while in this state. `None` for the terminal state.
    pub fn field(&self) -> Option<Field> {
        let field = match self {
            SurveyState::Name => Field::Fio,
            SurveyState::Interviewer => Field::Interviewer,
            SurveyState::CanonicalObstacles => Field::CanonicalObstacles,
            SurveyState::SpiritualGuide => Field::SpiritualGuide,
            SurveyState::Impression1 => Field::Impressions1,
            SurveyState::Impression2 => Field::Impressions2,
            SurveyState::Impression3 => Field::Impressions3,
            SurveyState::Impression4 => Field::Impressions4,
            SurveyState::Impression5 => Field::Impressions5,
            SurveyState::Impression6 => Field::Impressions6,
            SurveyState::StudyProblems => Field::Problems,
            SurveyState::GeneralComments => Field::Comments,
            SurveyState::Verdict => Field::Verdict,
            SurveyState::AwaitingContinue => return None,
        };
        Some(field)
    }

    /// 1-based step number shown to the operator; `None` for the terminal state.
    pub fn step_number(&self) -> Option<usize> {
        if self.is_terminal() {
            return None;
        }
        SurveyState::ALL.iter().position(|s| s == self).map(|i| i + 1)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SurveyState::AwaitingContinue)
    }

    /// Next state in the fixed order, ignoring skip rules.
    pub fn successor(&self) -> Option<SurveyState> {
        TRANSITIONS
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, to)| *to)
    }

    /// Next state after storing `input` in this state.
    pub fn next(&self, input: &str) -> Option<SurveyState> {
        SKIP_RULES
            .iter()
            .find(|(from, trigger, _)| from == self && *trigger == input)
            .map(|(_, _, to)| *to)
            .or_else(|| self.successor())
    }
}

impl fmt::Display for SurveyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_chain_covers_every_state_once() {
        let mut visited = vec![SurveyState::Name];
        let mut current = SurveyState::Name;
        while let Some(next) = current.successor() {
            visited.push(next);
            current = next;
        }
        assert_eq!(visited, SurveyState::ALL.to_vec());
        assert!(current.is_terminal());
    }

    #[test]
    fn ineligible_answer_skips_to_verdict() {
        assert_eq!(
            SurveyState::CanonicalObstacles.next(INELIGIBLE_OBSTACLE),
            Some(SurveyState::Verdict)
        );
        assert_eq!(
            SurveyState::CanonicalObstacles.next("Надо посоветоваться с проректором"),
            Some(SurveyState::SpiritualGuide)
        );
        // Sentinel only matters in the obstacles state.
        assert_eq!(
            SurveyState::Name.next(INELIGIBLE_OBSTACLE),
            Some(SurveyState::Interviewer)
        );
    }

    #[test]
    fn fields_and_step_numbers() {
        assert_eq!(SurveyState::Name.step_number(), Some(1));
        assert_eq!(SurveyState::Verdict.step_number(), Some(13));
        assert_eq!(SurveyState::AwaitingContinue.step_number(), None);
        assert_eq!(SurveyState::AwaitingContinue.field(), None);

        let fields: Vec<Field> = SurveyState::ALL.iter().filter_map(|s| s.field()).collect();
        assert_eq!(fields, Field::ALL.to_vec());
    }
}
