//! Walkthrough engine.
//!
//! Keeps a walkthrough's denormalized state — answered-question set,
//! per-profile scores, progress and completion — consistent with its live
//! answer set under incremental changes. The aggregate is pure and
//! synchronous: callers load [`WalkthroughState`] from storage, apply an
//! [`AnswerChange`], and persist the returned [`Mutation`]s. Each change
//! costs O(weighted links on the single changed answer), never a rescan of
//! the whole answer set.

/// Weight contributed by an answer toward one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileWeight {
    /// Target profile.
    pub profile_id: String,
    /// Contributed weight.
    pub quantifier: i32,
}

/// Everything the engine needs to know about one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSnapshot {
    /// The answer itself.
    pub answer_id: String,
    /// The question it belongs to.
    pub question_id: String,
    /// Whether its question accepts several answers at once.
    pub multiple_answers: bool,
    /// Weighted profile links of this answer.
    pub links: Vec<ProfileWeight>,
}

/// An explicit command against the walkthrough's answer set.
#[derive(Debug, Clone)]
pub enum AnswerChange {
    /// Select an answer. `displaced` carries snapshots of any answers
    /// currently selected for the same question, so a single-answer
    /// question can shed its prior selection in the same step.
    Select {
        /// The answer being selected.
        answer: AnswerSnapshot,
        /// Currently-selected answers for the same question.
        displaced: Vec<AnswerSnapshot>,
    },
    /// Deselect an answer.
    Deselect(AnswerSnapshot),
    /// Drop every selection, answered mark and score.
    Clear,
}

/// A minimal persistence delta produced by [`WalkthroughState::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Record a selected answer.
    SelectAnswer {
        /// Selected answer.
        answer_id: String,
        /// Its question.
        question_id: String,
    },
    /// Drop a selected answer.
    DeselectAnswer {
        /// Deselected answer.
        answer_id: String,
    },
    /// Add a question to the answered set.
    MarkAnswered {
        /// Newly answered question.
        question_id: String,
    },
    /// Remove a question from the answered set.
    UnmarkAnswered {
        /// No-longer-answered question.
        question_id: String,
    },
    /// Create a score row.
    CreateScore {
        /// Scored profile.
        profile_id: String,
        /// Initial quantifier.
        quantifier: i32,
    },
    /// Add `delta` to an existing score row.
    AdjustScore {
        /// Scored profile.
        profile_id: String,
        /// Signed adjustment.
        delta: i32,
    },
    /// Drop all selections, answered marks and scores.
    ClearAll,
}

/// A selected answer held in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAnswer {
    /// Selected answer.
    pub answer_id: String,
    /// Its question.
    pub question_id: String,
}

/// A running per-profile score held in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileScore {
    /// Scored profile.
    pub profile_id: String,
    /// Accumulated quantifier. May reach zero or go negative on removal;
    /// such rows are inert but kept.
    pub quantifier: i32,
}

/// The denormalized state of one walkthrough.
///
/// `scores` keeps creation order; result resolution relies on it for its
/// tie-break.
#[derive(Debug, Clone, Default)]
pub struct WalkthroughState {
    total_questions: u64,
    selected: Vec<SelectedAnswer>,
    answered: Vec<String>,
    scores: Vec<ProfileScore>,
}

impl WalkthroughState {
    /// Fresh state for a poll with `total_questions` questions.
    #[must_use]
    pub const fn new(total_questions: u64) -> Self {
        Self {
            total_questions,
            selected: Vec::new(),
            answered: Vec::new(),
            scores: Vec::new(),
        }
    }

    /// Rebuild state from persisted rows.
    #[must_use]
    pub const fn from_parts(
        total_questions: u64,
        selected: Vec<SelectedAnswer>,
        answered: Vec<String>,
        scores: Vec<ProfileScore>,
    ) -> Self {
        Self {
            total_questions,
            selected,
            answered,
            scores,
        }
    }

    /// Apply a change, returning the persistence delta.
    pub fn apply(&mut self, change: AnswerChange) -> Vec<Mutation> {
        match change {
            AnswerChange::Select { answer, displaced } => self.apply_select(answer, &displaced),
            AnswerChange::Deselect(answer) => self.apply_deselect(&answer),
            AnswerChange::Clear => self.apply_clear(),
        }
    }

    fn apply_select(&mut self, answer: AnswerSnapshot, displaced: &[AnswerSnapshot]) -> Vec<Mutation> {
        // Re-selecting a selected answer must not double-count.
        if self.is_selected(&answer.answer_id) {
            return Vec::new();
        }

        let mut mutations = Vec::new();

        if self.is_answered(&answer.question_id) {
            if !answer.multiple_answers {
                // Shed the prior selection(s); the question stays marked
                // answered throughout.
                for prior in displaced {
                    if prior.question_id == answer.question_id
                        && prior.answer_id != answer.answer_id
                    {
                        self.deselect_rows(prior, false, &mut mutations);
                    }
                }
            }
        } else {
            self.answered.push(answer.question_id.clone());
            mutations.push(Mutation::MarkAnswered {
                question_id: answer.question_id.clone(),
            });
        }

        self.selected.push(SelectedAnswer {
            answer_id: answer.answer_id.clone(),
            question_id: answer.question_id.clone(),
        });
        mutations.push(Mutation::SelectAnswer {
            answer_id: answer.answer_id,
            question_id: answer.question_id,
        });

        for link in answer.links {
            if let Some(entry) = self
                .scores
                .iter_mut()
                .find(|s| s.profile_id == link.profile_id)
            {
                entry.quantifier += link.quantifier;
                mutations.push(Mutation::AdjustScore {
                    profile_id: link.profile_id,
                    delta: link.quantifier,
                });
            } else {
                self.scores.push(ProfileScore {
                    profile_id: link.profile_id.clone(),
                    quantifier: link.quantifier,
                });
                mutations.push(Mutation::CreateScore {
                    profile_id: link.profile_id,
                    quantifier: link.quantifier,
                });
            }
        }

        mutations
    }

    fn apply_deselect(&mut self, answer: &AnswerSnapshot) -> Vec<Mutation> {
        let mut mutations = Vec::new();
        if self.is_selected(&answer.answer_id) {
            self.deselect_rows(answer, true, &mut mutations);
        }
        mutations
    }

    fn apply_clear(&mut self) -> Vec<Mutation> {
        self.selected.clear();
        self.answered.clear();
        self.scores.clear();
        vec![Mutation::ClearAll]
    }

    /// Drop one selected answer and roll its links out of the scores.
    ///
    /// Decrements are not clamped at zero; a score entry may go negative.
    fn deselect_rows(
        &mut self,
        answer: &AnswerSnapshot,
        unmark_question: bool,
        mutations: &mut Vec<Mutation>,
    ) {
        let before = self.selected.len();
        self.selected.retain(|s| s.answer_id != answer.answer_id);
        if self.selected.len() == before {
            return;
        }
        mutations.push(Mutation::DeselectAnswer {
            answer_id: answer.answer_id.clone(),
        });

        if unmark_question && self.is_answered(&answer.question_id) {
            self.answered.retain(|q| q != &answer.question_id);
            mutations.push(Mutation::UnmarkAnswered {
                question_id: answer.question_id.clone(),
            });
        }

        for link in &answer.links {
            if let Some(entry) = self
                .scores
                .iter_mut()
                .find(|s| s.profile_id == link.profile_id)
            {
                entry.quantifier -= link.quantifier;
                mutations.push(Mutation::AdjustScore {
                    profile_id: link.profile_id.clone(),
                    delta: -link.quantifier,
                });
            }
        }
    }

    // === Observations ===

    /// Answered / total questions; `None` while nothing is answered or the
    /// poll has no questions.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        if self.answered.is_empty() || self.total_questions == 0 {
            return None;
        }
        Some(self.answered.len() as f64 / self.total_questions as f64)
    }

    /// Whether every question of the poll is answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_questions > 0 && self.answered.len() as u64 == self.total_questions
    }

    /// Number of answered questions.
    #[must_use]
    pub fn answered_count(&self) -> u64 {
        self.answered.len() as u64
    }

    /// Whether this question is in the answered set.
    #[must_use]
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answered.iter().any(|q| q == question_id)
    }

    /// Whether this answer is currently selected.
    #[must_use]
    pub fn is_selected(&self, answer_id: &str) -> bool {
        self.selected.iter().any(|s| s.answer_id == answer_id)
    }

    /// Currently selected answers, in selection order.
    #[must_use]
    pub fn selected(&self) -> &[SelectedAnswer] {
        &self.selected
    }

    /// Selected answers for one question.
    #[must_use]
    pub fn selected_for_question(&self, question_id: &str) -> Vec<&SelectedAnswer> {
        self.selected
            .iter()
            .filter(|s| s.question_id == question_id)
            .collect()
    }

    /// Score entries, in creation order.
    #[must_use]
    pub fn scores(&self) -> &[ProfileScore] {
        &self.scores
    }

    /// The profile with the strictly highest quantifier.
    ///
    /// Equal quantifiers resolve to the entry created first; `None` when no
    /// profile has been scored yet.
    #[must_use]
    pub fn leading_profile(&self) -> Option<&ProfileScore> {
        self.scores.iter().fold(None, |best, score| match best {
            Some(b) if score.quantifier > b.quantifier => Some(score),
            None => Some(score),
            keep => keep,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snap(answer_id: &str, question_id: &str, links: &[(&str, i32)]) -> AnswerSnapshot {
        AnswerSnapshot {
            answer_id: answer_id.to_string(),
            question_id: question_id.to_string(),
            multiple_answers: false,
            links: links
                .iter()
                .map(|(profile_id, quantifier)| ProfileWeight {
                    profile_id: (*profile_id).to_string(),
                    quantifier: *quantifier,
                })
                .collect(),
        }
    }

    fn select(state: &mut WalkthroughState, answer: AnswerSnapshot) -> Vec<Mutation> {
        state.apply(AnswerChange::Select {
            answer,
            displaced: Vec::new(),
        })
    }

    fn score_of<'a>(state: &'a WalkthroughState, profile_id: &str) -> Option<&'a ProfileScore> {
        state.scores().iter().find(|s| s.profile_id == profile_id)
    }

    // Two questions; Q1 has A1(→P1, 10) and A2(→P2, 20); Q2 has B1(→P1, 10)
    // and B2(→P2, 25).
    fn a1() -> AnswerSnapshot {
        snap("a1", "q1", &[("p1", 10)])
    }
    fn a2() -> AnswerSnapshot {
        snap("a2", "q1", &[("p2", 20)])
    }
    fn b2() -> AnswerSnapshot {
        snap("b2", "q2", &[("p2", 25)])
    }

    #[test]
    fn test_select_marks_question_and_scores() {
        let mut state = WalkthroughState::new(2);
        let mutations = select(&mut state, a1());

        assert_eq!(
            mutations,
            vec![
                Mutation::MarkAnswered {
                    question_id: "q1".into()
                },
                Mutation::SelectAnswer {
                    answer_id: "a1".into(),
                    question_id: "q1".into()
                },
                Mutation::CreateScore {
                    profile_id: "p1".into(),
                    quantifier: 10
                },
            ]
        );
        assert!(state.is_answered("q1"));
        assert_eq!(state.progress(), Some(0.5));
        assert!(!state.is_complete());
    }

    #[test]
    fn test_walkthrough_to_completion() {
        let mut state = WalkthroughState::new(2);

        select(&mut state, a1());
        assert_eq!(state.progress(), Some(0.5));
        assert_eq!(state.leading_profile().unwrap().profile_id, "p1");

        select(&mut state, b2());
        assert_eq!(state.progress(), Some(1.0));
        assert!(state.is_complete());
        assert_eq!(state.leading_profile().unwrap().profile_id, "p2");
        assert_eq!(score_of(&state, "p2").unwrap().quantifier, 25);
    }

    #[test]
    fn test_deselect_restores_prior_state() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, a1());

        let before_selected = state.selected().to_vec();
        let before_scores = state.scores().to_vec();

        select(&mut state, b2());
        state.apply(AnswerChange::Deselect(b2()));

        assert_eq!(state.selected(), before_selected.as_slice());
        // The P2 score row stays behind at zero; drop inert rows before
        // comparing the meaningful entries.
        let live: Vec<_> = state
            .scores()
            .iter()
            .filter(|s| s.quantifier != 0)
            .cloned()
            .collect();
        assert_eq!(live, before_scores);
        assert!(!state.is_answered("q2"));
        assert!(!state.is_complete());
    }

    #[test]
    fn test_score_floor_not_clamped() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, a1());
        select(&mut state, b2());

        state.apply(AnswerChange::Deselect(a1()));
        assert_eq!(score_of(&state, "p1").unwrap().quantifier, 0);

        // A link weight edited between add and remove drives the cached
        // score below zero; the entry is kept as-is.
        select(&mut state, a1());
        state.apply(AnswerChange::Deselect(snap("a1", "q1", &[("p1", 15)])));
        assert_eq!(score_of(&state, "p1").unwrap().quantifier, -5);
    }

    #[test]
    fn test_double_select_is_idempotent() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, a1());
        let mutations = select(&mut state, a1());

        assert!(mutations.is_empty());
        assert_eq!(state.selected().len(), 1);
        assert_eq!(score_of(&state, "p1").unwrap().quantifier, 10);
    }

    #[test]
    fn test_replacement_keeps_one_answer_per_question() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, a1());

        let mutations = state.apply(AnswerChange::Select {
            answer: a2(),
            displaced: vec![a1()],
        });

        // Q1 stays marked answered through the swap.
        assert!(!mutations.contains(&Mutation::UnmarkAnswered {
            question_id: "q1".into()
        }));
        assert!(state.is_answered("q1"));
        assert_eq!(state.selected().len(), 1);
        assert_eq!(state.selected()[0].answer_id, "a2");
        assert_eq!(score_of(&state, "p1").unwrap().quantifier, 0);
        assert_eq!(score_of(&state, "p2").unwrap().quantifier, 20);
        assert_eq!(state.leading_profile().unwrap().profile_id, "p2");
    }

    #[test]
    fn test_multiple_answers_question_accumulates() {
        let mut state = WalkthroughState::new(2);
        let mut first = snap("a1", "q1", &[("p1", 10)]);
        first.multiple_answers = true;
        let mut second = snap("a2", "q1", &[("p2", 20)]);
        second.multiple_answers = true;

        select(&mut state, first.clone());
        state.apply(AnswerChange::Select {
            answer: second,
            displaced: vec![first],
        });

        assert_eq!(state.selected().len(), 2);
        assert_eq!(state.selected_for_question("q1").len(), 2);
        assert_eq!(state.answered_count(), 1);
    }

    #[test]
    fn test_deselect_unknown_answer_is_noop() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, a1());

        let mutations = state.apply(AnswerChange::Deselect(b2()));
        assert!(mutations.is_empty());
        assert_eq!(state.progress(), Some(0.5));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, a1());
        select(&mut state, b2());
        assert!(state.is_complete());

        let mutations = state.apply(AnswerChange::Clear);
        assert_eq!(mutations, vec![Mutation::ClearAll]);
        assert!(state.selected().is_empty());
        assert!(state.scores().is_empty());
        assert_eq!(state.answered_count(), 0);
        assert_eq!(state.progress(), None);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_progress_bounds() {
        let mut state = WalkthroughState::new(2);
        assert_eq!(state.progress(), None);

        select(&mut state, a1());
        let progress = state.progress().unwrap();
        assert!((0.0..=1.0).contains(&progress));
        assert_eq!(progress, 0.5);

        select(&mut state, b2());
        assert_eq!(state.progress(), Some(1.0));

        // Completion iff progress == 1.
        assert!(state.is_complete());
        state.apply(AnswerChange::Deselect(b2()));
        assert!(state.progress().unwrap() < 1.0);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_empty_poll_has_no_progress() {
        let state = WalkthroughState::new(0);
        assert_eq!(state.progress(), None);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_shared_profile_accumulates_across_questions() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, a1());
        select(&mut state, snap("b1", "q2", &[("p1", 10)]));

        assert_eq!(score_of(&state, "p1").unwrap().quantifier, 20);
        assert_eq!(state.scores().len(), 1);
    }

    #[test]
    fn test_tie_break_prefers_earliest_scored() {
        let mut state = WalkthroughState::new(2);
        select(&mut state, snap("a1", "q1", &[("p1", 10)]));
        select(&mut state, snap("b1", "q2", &[("p2", 10)]));

        assert_eq!(state.leading_profile().unwrap().profile_id, "p1");
    }

    #[test]
    fn test_answer_with_several_links() {
        let mut state = WalkthroughState::new(1);
        select(&mut state, snap("a1", "q1", &[("p1", 3), ("p2", 7)]));

        assert_eq!(score_of(&state, "p1").unwrap().quantifier, 3);
        assert_eq!(score_of(&state, "p2").unwrap().quantifier, 7);
        assert_eq!(state.leading_profile().unwrap().profile_id, "p2");
    }
}
