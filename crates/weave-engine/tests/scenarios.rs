//! End-to-end editing scenarios driven through `Editor::apply`.

use pretty_assertions::assert_eq;
use rstest::rstest;
use weave_engine::editing::ZWS_INLINE_ATTR;
use weave_engine::{Cmd, Editor, Format, HookPoint, Side, invariants, markup};

fn editor(input: &str) -> Editor {
    Editor::from_markup(input).unwrap()
}

fn apply(editor: &mut Editor, cmd: Cmd) -> bool {
    let patch = editor.apply(cmd).unwrap();
    invariants::check(editor.document());
    assert!(editor.document().is_valid_point(patch.selection.anchor));
    assert!(editor.document().is_valid_point(patch.selection.focus));
    patch.changed
}

// ============ Character deletion ============

#[test]
fn test_delete_forward_removes_one_character() {
    let mut ed = editor("<p>ab[]cd</p>");
    assert!(apply(&mut ed, Cmd::DeleteForward));
    insta::assert_snapshot!(ed.render(), @"<p>ab[]d</p>");
}

#[rstest]
#[case::collapsed_spaces("<p>a  []b</p>", "<p>a[]b</p>")]
#[case::across_empty_inline("<p>a<i></i>[]b</p>", "<p>[]b</p>")]
#[case::line_break("<p>a<br>[]b</p>", "<p>a[]b</p>")]
#[case::non_editable_unit(r#"<p>a<span contenteditable="false">xyz</span>[]b</p>"#, "<p>a[]b</p>")]
fn test_backspace_removes_one_visible_unit(#[case] input: &str, #[case] expected: &str) {
    let mut ed = editor(input);
    apply(&mut ed, Cmd::DeleteBackward);
    assert_eq!(ed.render(), expected);
}

#[test]
fn test_space_left_at_edge_becomes_non_breaking() {
    let mut ed = editor("<p>a b[]</p>");
    apply(&mut ed, Cmd::DeleteBackward);
    insta::assert_snapshot!(ed.render(), @"<p>a&nbsp;[]</p>");
}

// ============ Range deletion ============

#[test]
fn test_range_across_blocks_merges_into_first() {
    let mut ed = editor("<h1>abc[</h1><p>]def</p>");
    assert!(apply(&mut ed, Cmd::DeleteSelection));
    insta::assert_snapshot!(ed.render(), @"<h1>abc[]def</h1>");
}

#[test]
fn test_fully_selected_block_keeps_placeholder() {
    let mut ed = editor("<p>[<b>ab</b>]</p>");
    apply(&mut ed, Cmd::DeleteSelection);
    insta::assert_snapshot!(ed.render(), @"<p>[]<br></p>");
}

#[test]
fn test_emptied_inline_around_cursor_is_anchored() {
    let mut ed = editor("<p><b>[ab]</b></p>");
    apply(&mut ed, Cmd::DeleteSelection);
    assert_eq!(
        ed.render(),
        format!("<p><b {ZWS_INLINE_ATTR}=\"\">\u{200B}[]</b></p>")
    );
}

#[test]
fn test_deleting_whole_middle_blocks() {
    let mut ed = editor("<p>a[b</p><p>c</p><p>d]e</p>");
    apply(&mut ed, Cmd::DeleteSelection);
    insta::assert_snapshot!(ed.render(), @"<p>a[]e</p>");
}

#[test]
fn test_unremovable_node_survives_range_deletion() {
    let mut ed = editor(r#"<p>a[b<span data-unremovable="">x</span>c]d</p>"#);
    let marked: Vec<_> = {
        let doc = ed.document();
        doc.descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.has_attr(n, "data-unremovable"))
            .collect()
    };
    apply(&mut ed, Cmd::DeleteSelection);
    invariants::assert_marked_nodes_survive(ed.document(), &marked);
    insta::assert_snapshot!(ed.render(), @r#"<p>a[]<span data-unremovable=""></span>d</p>"#);
}

#[test]
fn test_unmergeable_boundary_refuses_forward_merge() {
    let mut ed = editor(r#"<div data-unmergeable=""><p>ab[]</p></div><p>cd</p>"#);
    assert!(!apply(&mut ed, Cmd::DeleteForward));
    insta::assert_snapshot!(ed.render(), @r#"<div data-unmergeable=""><p>ab[]</p></div><p>cd</p>"#);
}

#[test]
fn test_unmergeable_boundary_refuses_range_merge() {
    let mut ed = editor(r#"<div data-unmergeable=""><p>ab[</p></div><p>]cd</p>"#);
    apply(&mut ed, Cmd::DeleteSelection);
    insta::assert_snapshot!(ed.render(), @r#"<div data-unmergeable=""><p>ab[]</p></div><p>cd</p>"#);
}

#[test]
fn test_unmergeable_block_between_survives_range_deletion() {
    let mut ed = editor(r#"<p>ab[</p><div data-unmergeable="">x</div><p>]cd</p>"#);
    assert!(apply(&mut ed, Cmd::DeleteSelection));
    insta::assert_snapshot!(ed.render(), @r#"<p>ab[]</p><div data-unmergeable=""><br></div><p>cd</p>"#);
}

#[test]
fn test_backspace_stops_at_unmergeable_block_between() {
    let mut ed = editor(r#"<p>ab</p><div data-unmergeable="">x</div><p>[]cd</p>"#);
    assert!(!apply(&mut ed, Cmd::DeleteBackward));
    insta::assert_snapshot!(ed.render(), @r#"<p>ab</p><div data-unmergeable="">x[]</div><p>cd</p>"#);
}

#[rstest]
#[case::backspace("<p></p><p>[]cd</p>", Cmd::DeleteBackward, "<p>[]cd</p>")]
#[case::delete_forward("<p>ab[]</p><p></p>", Cmd::DeleteForward, "<p>ab[]</p>")]
fn test_structurally_empty_block_is_dropped(
    #[case] input: &str,
    #[case] cmd: Cmd,
    #[case] expected: &str,
) {
    let mut ed = editor(input);
    assert!(apply(&mut ed, cmd));
    assert_eq!(ed.render(), expected);
}

// ============ Splitting ============

#[rstest]
#[case::middle("<p>ab[]cd</p>", "<p>ab</p><p>[]cd</p>")]
#[case::end("<p>ab[]</p>", "<p>ab</p><p>[]<br></p>")]
#[case::heading("<h2>[]ab</h2>", "<h2><br></h2><h2>[]ab</h2>")]
#[case::unbreakable(r#"<p data-unbreakable="">ab[]cd</p>"#, r#"<p data-unbreakable="">ab<br>[]cd</p>"#)]
#[case::unremovable_inline(
    r#"<p>a<span data-unremovable="">x[]y</span>d</p>"#,
    r#"<p>a<span data-unremovable="">x<br>[]y</span>d</p>"#
)]
fn test_enter(#[case] input: &str, #[case] expected: &str) {
    let mut ed = editor(input);
    assert!(apply(&mut ed, Cmd::SplitBlock));
    assert_eq!(ed.render(), expected);
}

#[rstest]
#[case("<p>ab[]cd</p>")]
#[case("<p><b>ab[]cd</b></p>")]
#[case("<p>a<i>b[]</i>cd</p>")]
fn test_enter_then_backspace_restores_tree(#[case] input: &str) {
    let mut ed = editor(input);
    let before = markup::render(ed.document());
    apply(&mut ed, Cmd::SplitBlock);
    apply(&mut ed, Cmd::DeleteBackward);
    assert_eq!(markup::render(ed.document()), before);
}

// ============ Formatting ============

#[test]
fn test_bold_toggle_round_trip() {
    let mut ed = editor("<p>a[bc]d</p>");
    apply(&mut ed, Cmd::ToggleFormat(Format::Bold));
    insta::assert_snapshot!(ed.render(), @"<p>a[<b>bc]</b>d</p>");
    assert!(ed.is_format_applied(Format::Bold));

    apply(&mut ed, Cmd::ToggleFormat(Format::Bold));
    assert_eq!(markup::render(ed.document()), "<p>abcd</p>");
    assert!(!ed.is_format_applied(Format::Bold));
}

#[test]
fn test_adjacent_bold_merges() {
    let mut ed = editor("<p><b>ab</b>[cd]</p>");
    apply(&mut ed, Cmd::ToggleFormat(Format::Bold));
    insta::assert_snapshot!(markup::render(ed.document()), @"<p><b>abcd</b></p>");
}

#[test]
fn test_formats_stack() {
    let mut ed = editor("<p>[ab]</p>");
    apply(&mut ed, Cmd::ToggleFormat(Format::Italic));
    apply(&mut ed, Cmd::ToggleFormat(Format::Underline));
    insta::assert_snapshot!(markup::render(ed.document()), @"<p><i><u>ab</u></i></p>");
    assert!(ed.is_format_applied(Format::Italic));
    assert!(ed.is_format_applied(Format::Underline));
    assert!(!ed.is_format_applied(Format::StrikeThrough));
}

// ============ Hooks ============

#[test]
fn test_trap_hook_keeps_cursor_inside_unmergeable() {
    let mut ed = editor(r#"<p>x</p><div data-unmergeable=""><p>[]ab</p></div>"#);
    ed.hooks_mut().add(
        HookPoint::DeleteBackward,
        weave_engine::editing::trap_in_unmergeable(Side::Left),
    );
    assert!(!apply(&mut ed, Cmd::DeleteBackward));
    assert_eq!(ed.render(), r#"<p>x</p><div data-unmergeable=""><p>[]ab</p></div>"#);
}
