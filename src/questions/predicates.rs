//! Query predicates for the question bank

use std::collections::BTreeSet;

use crate::types::{Question, QuestionId};

/// Questions whose id is not in `excluded`
pub fn id_not_in(excluded: &BTreeSet<QuestionId>) -> impl Fn(&Question) -> bool + '_ {
    move |q| !excluded.contains(&q.id)
}

/// Questions with the same text as `question`, used by importers to skip
/// duplicates
pub fn same_text(question: &Question) -> impl Fn(&Question) -> bool + '_ {
    move |q| q.text == question.text
}

pub fn any(_: &Question) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionOption;

    fn question(text: &str) -> Question {
        let options = vec![QuestionOption::new("yes"), QuestionOption::new("no")];
        let answer = options[0].id;
        Question::new(text, options, [answer]).unwrap()
    }

    #[test]
    fn test_id_not_in() {
        let (a, b) = (question("a?"), question("b?"));
        let excluded: BTreeSet<_> = [a.id].into_iter().collect();

        assert!(!id_not_in(&excluded)(&a));
        assert!(id_not_in(&excluded)(&b));
    }

    #[test]
    fn test_same_text_ignores_tags() {
        let a = question("Is TCP reliable?").with_tags(["network"]);
        let copy = question("Is TCP reliable?");

        assert!(same_text(&a)(&copy));
        assert!(!same_text(&a)(&question("Is UDP reliable?")));
        assert!(any(&copy));
    }
}
