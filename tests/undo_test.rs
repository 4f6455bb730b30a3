//! UndoManager replay against a bare Tree and a recording inserter.

use std::cell::RefCell;
use std::rc::Rc;

use rstest::{fixture, rstest};

use formtree::{
    Identifiable, Position, Question, QuestionInserter, Structure, Tree, TreeError, TreeResult,
    UndoManager,
};

#[ctor::ctor]
fn init() {
    formtree::util::testing::init_test_setup();
}

/// root -> group -> group2 -> text2
struct Nested {
    tree: Tree<Question>,
    group: Question,
    group2: Question,
    text2: Question,
}

#[fixture]
fn nested() -> Nested {
    let mut tree = Tree::default();
    let group = Question::group("group");
    let group2 = Question::group("group2");
    let text2 = Question::text("text2");
    tree.insert_mug(group.clone(), Position::Into, None).unwrap();
    tree.insert_mug(group2.clone(), Position::Into, Some(&group))
        .unwrap();
    tree.insert_mug(text2.clone(), Position::Into, Some(&group2))
        .unwrap();
    Nested {
        tree,
        group,
        group2,
        text2,
    }
}

/// Captures every replayed insertion instead of applying it.
#[derive(Default)]
struct RecordingInserter {
    calls: Vec<(String, Option<String>, Position, bool)>,
}

impl QuestionInserter<Question> for RecordingInserter {
    fn insert_question(
        &mut self,
        mug: Question,
        previous_sibling: Option<&Question>,
        position: Position,
        suppress_undo_recording: bool,
    ) -> TreeResult<()> {
        self.calls.push((
            mug.node_id(),
            previous_sibling.map(|m| m.node_id()),
            position,
            suppress_undo_recording,
        ));
        Ok(())
    }
}

// ============================================================
// Replay
// ============================================================

#[rstest]
fn given_cascading_delete_when_undone_then_three_levels_restored(mut nested: Nested) {
    let original = nested.tree.structure();
    let mut manager = UndoManager::new();
    manager.reset_undo(
        nested.group2.clone(),
        Some(nested.group.clone()),
        Position::Into,
    );
    manager.append_mug(
        nested.text2.clone(),
        Some(nested.group2.clone()),
        Position::Into,
    );
    nested.tree.remove_mug(&nested.group2).unwrap();
    assert_eq!(manager.len(), 2);

    let replayed = manager.undo(&mut nested.tree).unwrap();

    assert_eq!(replayed, 2);
    assert_eq!(nested.tree.structure(), original);
    assert_eq!(
        nested.tree.get_absolute_path(&nested.text2).as_deref(),
        Some("/group/group2/text2")
    );
    assert!(manager.is_empty());
}

#[test]
fn given_single_delete_when_undone_then_restored_before_next_sibling() {
    let mut tree = Tree::default();
    let text = Question::text("text");
    let text2 = Question::text("text2");
    tree.insert_mug(text.clone(), Position::Into, None).unwrap();
    tree.insert_mug(text2.clone(), Position::Into, None).unwrap();

    let mut manager = UndoManager::new();
    manager.reset_undo(text.clone(), Some(text2.clone()), Position::Before);
    tree.remove_mug(&text).unwrap();

    manager.undo(&mut tree).unwrap();

    assert_eq!(tree.get_root_children(), vec![&text, &text2]);
}

#[rstest]
fn given_records_out_of_detachment_order_when_undone_then_descendant_lands_at_root(
    mut nested: Nested,
) {
    let mut manager = UndoManager::new();
    manager.reset_undo(
        nested.text2.clone(),
        Some(nested.group2.clone()),
        Position::Into,
    );
    manager.append_mug(
        nested.group2.clone(),
        Some(nested.group.clone()),
        Position::Into,
    );
    nested.tree.remove_mug(&nested.group2).unwrap();

    manager.undo(&mut nested.tree).unwrap();

    // group2 was not back yet when text2 was replayed
    assert_eq!(
        nested.tree.structure(),
        Structure::new(
            "",
            vec![
                Structure::new("group", vec![Structure::leaf("group2")]),
                Structure::leaf("text2"),
            ]
        )
    );
}

#[test]
fn given_records_when_undone_then_inserter_sees_them_in_order_with_recording_suppressed() {
    let group = Question::group("group");
    let text2 = Question::text("text2");
    let mut manager = UndoManager::new();
    manager.reset_undo(group.clone(), None, Position::Into);
    manager.append_mug(text2, Some(group), Position::Into);
    let mut inserter = RecordingInserter::default();

    manager.undo(&mut inserter).unwrap();

    assert_eq!(
        inserter.calls,
        vec![
            ("group".to_string(), None, Position::Into, true),
            (
                "text2".to_string(),
                Some("group".to_string()),
                Position::Into,
                true
            ),
        ]
    );
}

// ============================================================
// Stack lifecycle
// ============================================================

#[rstest]
fn given_empty_stack_when_undone_then_nothing_changes(mut nested: Nested) {
    let original = nested.tree.structure();
    let events = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&events);
    nested.tree.subscribe(move |_| *sink.borrow_mut() += 1);
    let toggles = Rc::new(RefCell::new(Vec::new()));
    let toggle_sink = Rc::clone(&toggles);
    let mut manager =
        UndoManager::with_affordance(move |available: bool| toggle_sink.borrow_mut().push(available));

    assert_eq!(manager.undo(&mut nested.tree).unwrap(), 0);
    assert_eq!(manager.undo(&mut nested.tree).unwrap(), 0);

    assert_eq!(nested.tree.structure(), original);
    assert_eq!(*events.borrow(), 0);
    assert!(toggles.borrow().is_empty());
    assert!(manager.is_empty());
}

#[test]
fn given_pending_records_when_reset_then_only_new_record_remains() {
    let text = Question::text("text");
    let text2 = Question::text("text2");
    let mut manager: UndoManager<Question> = UndoManager::default();
    manager.reset_undo(text.clone(), None, Position::Into);
    manager.append_mug(text2.clone(), Some(text.clone()), Position::After);

    manager.reset_undo(text2.clone(), None, Position::Into);

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.records()[0].mug, text2);
    assert_eq!(manager.records()[0].previous_sibling, None);
}

#[test]
fn given_pending_records_when_cleared_then_affordance_hidden() {
    let toggles = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&toggles);
    let mut manager =
        UndoManager::with_affordance(move |available: bool| sink.borrow_mut().push(available));
    manager.reset_undo(Question::text("text"), None, Position::Into);

    manager.clear();

    assert!(manager.is_empty());
    assert_eq!(*toggles.borrow(), vec![true, false]);
}

#[test]
fn given_failing_replay_step_when_undone_then_error_returned_and_stack_cleared() {
    let mut tree = Tree::default();
    let text = Question::text("text");
    let after = Question::text("after");
    let mut manager = UndoManager::new();
    manager.reset_undo(text.clone(), Some(text.clone()), Position::After);
    manager.append_mug(after, None, Position::Into);

    let err = manager.undo(&mut tree).unwrap_err();

    assert_eq!(
        err,
        TreeError::SelfReference {
            node_id: "text".to_string()
        }
    );
    assert!(manager.is_empty());
    assert!(tree.is_empty());
}
