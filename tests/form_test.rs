//! Deleting questions through a Form and undoing the deletion.

use std::cell::RefCell;
use std::rc::Rc;

use rstest::rstest;

use formtree::{
    Form, Identifiable, Position, Question, QuestionKind, Structure, Tree, UndoRecord,
};

#[ctor::ctor]
fn init() {
    formtree::util::testing::init_test_setup();
}

fn st(id: &str, children: Vec<Structure>) -> Structure {
    Structure::new(id, children)
}

fn leaf(id: &str) -> Structure {
    Structure::leaf(id)
}

fn new_form() -> Form<Question> {
    Form::new(Tree::default())
}

/// Appends `mug` into `parent` (root when `None`) as a user edit.
fn add(form: &mut Form<Question>, mug: &Question, parent: Option<&Question>) {
    form.insert_question(mug.clone(), parent, Position::Into, false)
        .unwrap();
}

fn ids(form: &Form<Question>) -> Vec<String> {
    form.tree().mugs().map(|m| m.node_id()).collect()
}

fn summary(record: &UndoRecord<Question>) -> (String, Option<String>, Position) {
    (
        record.mug.node_id(),
        record.previous_sibling.as_ref().map(|m| m.node_id()),
        record.position,
    )
}

// ============================================================
// Single and sibling deletions
// ============================================================

#[test]
fn given_one_question_when_deleted_and_undone_then_restored() {
    let mut form = new_form();
    let text = Question::text("text");
    add(&mut form, &text, None);

    assert_eq!(form.remove_questions(&[text.clone()]), 1);
    assert!(form.tree().get_mug_from_path("/text").is_none());
    assert!(form.tree().is_empty());

    assert_eq!(form.undo().unwrap(), 1);
    assert_eq!(form.tree().get_mug_from_path("/text"), Some(&text));
    assert_eq!(form.tree().structure(), st("", vec![leaf("text")]));
}

#[test]
fn given_question_with_question_after_it_when_deleted_and_undone_then_restored_before_it() {
    let mut form = new_form();
    let text = Question::text("text");
    let text2 = Question::text("text2");
    add(&mut form, &text, None);
    add(&mut form, &text2, None);

    form.remove_questions(&[text.clone()]);
    assert_eq!(
        summary(&form.undo_manager().records()[0]),
        ("text".to_string(), Some("text2".to_string()), Position::Before)
    );

    form.undo().unwrap();
    assert_eq!(ids(&form), vec!["text", "text2"]);
}

#[test]
fn given_middle_question_when_deleted_then_recorded_after_previous_sibling() {
    let mut form = new_form();
    let [a, b, c] = ["a", "b", "c"].map(Question::text);
    for mug in [&a, &b, &c] {
        add(&mut form, mug, None);
    }

    form.remove_questions(&[b.clone()]);
    assert_eq!(
        summary(&form.undo_manager().records()[0]),
        ("b".to_string(), Some("a".to_string()), Position::After)
    );

    form.undo().unwrap();
    assert_eq!(ids(&form), vec!["a", "b", "c"]);
}

#[test]
fn given_two_selected_siblings_when_deleted_and_undone_then_both_restored_in_order() {
    let mut form = new_form();
    let text = Question::text("text");
    let text2 = Question::text("text2");
    add(&mut form, &text, None);
    add(&mut form, &text2, None);

    assert_eq!(form.remove_questions(&[text.clone(), text2.clone()]), 2);
    assert!(form.tree().is_empty());

    assert_eq!(form.undo().unwrap(), 2);
    assert_eq!(ids(&form), vec!["text", "text2"]);
}

#[rstest]
#[case::out_of_order(&["text3", "text2"], vec!["text"])]
#[case::in_order(&["text2", "text3"], vec!["text"])]
#[case::around_survivor(&["text", "text3"], vec!["text2"])]
#[case::all(&["text3", "text", "text2"], vec![])]
fn given_several_selected_questions_when_deleted_and_undone_then_original_order_returns(
    #[case] selected: &[&str],
    #[case] remaining: Vec<&str>,
) {
    let mut form = new_form();
    let questions = ["text", "text2", "text3"].map(Question::text);
    for mug in &questions {
        add(&mut form, mug, None);
    }
    let selection: Vec<Question> = selected
        .iter()
        .filter_map(|id| questions.iter().find(|q| q.node_id() == *id).cloned())
        .collect();

    form.remove_questions(&selection);
    assert_eq!(ids(&form), remaining);

    form.undo().unwrap();
    assert_eq!(ids(&form), vec!["text", "text2", "text3"]);
}

#[test]
fn given_first_and_only_question_when_deleted_and_undone_then_tree_has_it_again() {
    let mut form = new_form();
    let text = Question::text("text");
    add(&mut form, &text, None);

    form.remove_questions(&[text.clone()]);
    form.undo().unwrap();

    assert_eq!(form.tree().get_root_children(), vec![&text]);
    assert!(form.undo_manager().is_empty());
}

// ============================================================
// Nested deletions
// ============================================================

#[test]
fn given_nested_question_when_deleted_and_undone_then_restored_into_group() {
    let mut form = new_form();
    let group = Question::group("group");
    let text2 = Question::text("text2");
    add(&mut form, &group, None);
    add(&mut form, &text2, Some(&group));

    form.remove_questions(&[text2.clone()]);
    assert_eq!(form.tree().structure(), st("", vec![leaf("group")]));

    form.undo().unwrap();
    assert_eq!(form.tree().get_mug_from_path("/group/text2"), Some(&text2));
    assert_eq!(
        form.tree().structure(),
        st("", vec![st("group", vec![leaf("text2")])])
    );
}

#[test]
fn given_group_when_deleted_and_undone_then_children_come_back() {
    let mut form = new_form();
    let group = Question::group("group");
    let text2 = Question::text("text2");
    add(&mut form, &group, None);
    add(&mut form, &text2, Some(&group));

    form.remove_questions(&[group.clone()]);
    assert!(form.tree().is_empty());
    assert!(form.tree().get_node_from_mug(&text2).is_none());

    assert_eq!(form.undo().unwrap(), 2);
    assert_eq!(form.tree().get_mug_from_path("/group/text2"), Some(&text2));
}

#[test]
fn given_nested_group_when_deleted_then_records_follow_detachment_order() {
    let mut form = new_form();
    let group = Question::group("group");
    let group2 = Question::group("group2");
    let text2 = Question::text("text2");
    add(&mut form, &group, None);
    add(&mut form, &group2, Some(&group));
    add(&mut form, &text2, Some(&group2));
    let original = form.tree().structure();

    form.remove_questions(&[group2.clone()]);
    assert_eq!(form.tree().structure(), st("", vec![leaf("group")]));

    let records: Vec<_> = form.undo_manager().records().iter().map(summary).collect();
    assert_eq!(
        records,
        vec![
            ("group2".to_string(), Some("group".to_string()), Position::Into),
            ("text2".to_string(), Some("group2".to_string()), Position::Into),
        ]
    );

    form.undo().unwrap();
    assert_eq!(form.tree().structure(), original);
    assert_eq!(
        form.tree().get_absolute_path(&text2).as_deref(),
        Some("/group/group2/text2")
    );
}

#[test]
fn given_select_with_choices_when_deleted_and_undone_then_choice_count_and_order_kept() {
    let mut form = new_form();
    let select = Question::new(QuestionKind::Select, "select");
    let choice1 = Question::new(QuestionKind::Choice, "choice1");
    let choice2 = Question::new(QuestionKind::Choice, "choice2");
    add(&mut form, &select, None);
    add(&mut form, &choice1, Some(&select));
    add(&mut form, &choice2, Some(&select));

    form.remove_questions(&[select.clone()]);
    form.undo().unwrap();

    let node = form.tree().get_node_from_mug(&select).unwrap();
    assert_eq!(node.child_count(), 2);
    assert_eq!(node.children_mugs(), vec![&choice1, &choice2]);
}

#[test]
fn given_group_and_its_child_selected_when_deleted_then_child_goes_with_group() {
    let mut form = new_form();
    let group = Question::group("group");
    let text2 = Question::text("text2");
    let text = Question::text("text");
    add(&mut form, &group, None);
    add(&mut form, &text2, Some(&group));
    add(&mut form, &text, None);

    assert_eq!(form.remove_questions(&[text2.clone(), group.clone()]), 1);
    assert_eq!(ids(&form), vec!["text"]);
    assert_eq!(form.undo_manager().len(), 2);

    form.undo().unwrap();
    assert_eq!(
        form.tree().structure(),
        st("", vec![st("group", vec![leaf("text2")]), leaf("text")])
    );
}

// ============================================================
// Undo history lifecycle
// ============================================================

#[test]
fn given_unknown_selection_when_deleting_then_nothing_recorded() {
    let mut form = new_form();
    let text = Question::text("text");
    add(&mut form, &text, None);

    assert_eq!(form.remove_questions(&[Question::text("stranger")]), 0);
    assert!(form.undo_manager().is_empty());
    assert_eq!(form.undo().unwrap(), 0);
    assert_eq!(ids(&form), vec!["text"]);
}

#[test]
fn given_second_deletion_when_undone_then_only_latest_is_restored() {
    let mut form = new_form();
    let text = Question::text("text");
    let text2 = Question::text("text2");
    add(&mut form, &text, None);
    add(&mut form, &text2, None);

    form.remove_questions(&[text.clone()]);
    form.remove_questions(&[text2.clone()]);
    form.undo().unwrap();

    assert_eq!(ids(&form), vec!["text2"]);
}

#[test]
fn given_user_edit_after_deletion_when_undoing_then_nothing_happens() {
    let mut form = new_form();
    let text = Question::text("text");
    add(&mut form, &text, None);
    form.remove_questions(&[text.clone()]);

    let other = Question::text("other");
    add(&mut form, &other, None);

    assert!(form.undo_manager().is_empty());
    assert_eq!(form.undo().unwrap(), 0);
    assert_eq!(ids(&form), vec!["other"]);
}

#[test]
fn given_suppressed_insert_after_deletion_when_undoing_then_history_survives() {
    let mut form = new_form();
    let text = Question::text("text");
    add(&mut form, &text, None);
    form.remove_questions(&[text.clone()]);

    let other = Question::text("other");
    form.insert_question(other, None, Position::Into, true)
        .unwrap();

    assert_eq!(form.undo().unwrap(), 1);
    assert_eq!(ids(&form), vec!["other", "text"]);
}

#[test]
fn given_affordance_when_deleting_and_undoing_then_sees_availability_changes() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut form = Form::with_affordance(Tree::default(), move |available: bool| {
        sink.borrow_mut().push(available)
    });
    let group = Question::group("group");
    let text2 = Question::text("text2");
    form.insert_question(group.clone(), None, Position::Into, false)
        .unwrap();
    form.insert_question(text2, Some(&group), Position::Into, false)
        .unwrap();
    assert!(seen.borrow().is_empty());

    form.remove_questions(&[group]);
    assert_eq!(*seen.borrow(), vec![true, true]);

    form.undo().unwrap();
    assert_eq!(seen.borrow().last(), Some(&false));
    assert!(form.undo_manager().is_empty());
}
