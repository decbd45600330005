use hypewriter_engine::editing::{
    BlockKind, BubblePosition, Cmd, Document, EditError, Editor, EditorOptions, Key, Node,
    QuoteStyle, RuleStyle, Selection, Transaction,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn editor(nodes: Vec<Node>) -> Editor {
    Editor::new(Document::from_nodes(nodes).unwrap(), EditorOptions::default())
}

fn hr() -> Node {
    Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![])
}

fn chapter() -> Vec<Node> {
    vec![
        Node::textblock(BlockKind::Heading { level: 1, indent: 0 }, "Chapter One"),
        Node::paragraph("It was a dark night."),
        Node::textblock(BlockKind::bubble(BubblePosition::Left), "Who's there?"),
        Node::textblock(BlockKind::bubble(BubblePosition::Right), ""),
        hr(),
        Node::textblock(
            BlockKind::Blockquote {
                style: QuoteStyle::BubbleRight,
                indent: 2,
            },
            "Nobody.",
        ),
    ]
}

#[test]
fn every_offset_resolves_within_its_ancestors() {
    let doc = Document::from_nodes(chapter()).unwrap();
    for pos in 0..=doc.size() {
        let rp = doc.resolve(pos).unwrap();
        assert_eq!(rp.node(0), doc.root());
        for depth in 0..=rp.depth() {
            assert!(rp.start(depth) <= pos && pos <= rp.end(depth), "{pos} at depth {depth}");
        }
    }
    assert_eq!(
        doc.resolve(doc.size() + 1).unwrap_err(),
        EditError::OutOfRange {
            pos: doc.size() + 1,
            size: doc.size()
        }
    );
}

#[test]
fn wrapping_selection_in_bubble() {
    let mut editor = editor(vec![Node::paragraph("Hello world")]);
    editor.set_selection(Selection::range(1, 6)).unwrap();

    assert!(
        editor
            .execute(Cmd::InsertBubble {
                position: BubblePosition::Left
            })
            .unwrap()
    );

    assert_eq!(
        editor.doc().to_nodes(),
        vec![
            Node::textblock(BlockKind::bubble(BubblePosition::Left), "Hello"),
            Node::paragraph(" world"),
        ]
    );
    assert_eq!(editor.selection(), Selection::cursor(1));
}

#[test]
fn wrap_then_unwrap_keeps_the_selected_text() {
    let mut editor = editor(vec![Node::paragraph("Hello world")]);
    editor.set_selection(Selection::range(1, 6)).unwrap();
    editor
        .execute(Cmd::InsertBubble {
            position: BubblePosition::Right,
        })
        .unwrap();
    assert!(editor.execute(Cmd::RemoveBubble).unwrap());

    let first = editor.doc().top_level()[0];
    assert_eq!(editor.doc().kind(first), Some(&BlockKind::paragraph()));
    assert_eq!(editor.doc().text_content(first), "Hello");
}

#[rstest]
#[case(Cmd::Outdent, 0)]
#[case(Cmd::Indent, 8)]
fn indent_is_idempotent_at_the_bounds(#[case] cmd: Cmd, #[case] level: u8) {
    let block = Node::textblock(BlockKind::Paragraph { indent: level }, "text");
    let mut editor = editor(vec![block.clone()]);

    assert!(!editor.execute(cmd).unwrap());
    assert_eq!(editor.doc().to_nodes(), vec![block]);
    assert_eq!(editor.version(), 0);
}

#[test]
fn toggle_blockquote_twice_is_identity() {
    let original = vec![Node::paragraph("Quote me")];
    let mut editor = editor(original.clone());
    let toggle = Cmd::ToggleBlockquote {
        style: QuoteStyle::Line,
    };

    editor.set_selection(Selection::range(1, 9)).unwrap();
    assert!(editor.execute(toggle.clone()).unwrap());
    assert_eq!(
        editor.doc().to_nodes(),
        vec![Node::textblock(BlockKind::blockquote(QuoteStyle::Line), "Quote me")]
    );

    assert!(editor.execute(toggle).unwrap());
    assert_eq!(editor.doc().to_nodes(), original);
}

#[test]
fn horizontal_rule_at_start_of_empty_paragraph_goes_before_it() {
    let mut editor = editor(vec![Node::paragraph("")]);
    assert_eq!(editor.selection(), Selection::cursor(1));

    editor
        .execute(Cmd::SetHorizontalRule {
            style: RuleStyle::Solid,
        })
        .unwrap();

    assert_eq!(editor.doc().to_nodes(), vec![hr(), Node::paragraph("")]);
    assert_eq!(editor.selection(), Selection::cursor(2));
}

#[test]
fn backspace_in_empty_bubble_removes_it() {
    let mut editor = editor(vec![
        Node::paragraph("Before"),
        Node::textblock(BlockKind::bubble(BubblePosition::Left), ""),
    ]);
    editor.set_selection(Selection::cursor(9)).unwrap();

    assert!(editor.handle_key(Key::Backspace).unwrap());
    assert_eq!(editor.doc().to_nodes(), vec![Node::paragraph("Before")]);
    assert_eq!(editor.selection(), Selection::cursor(8));
}

#[test]
fn enter_in_quote_continues_after_it() {
    let mut editor = editor(chapter());
    // Inside "Nobody."; the blockquote spans 52..61.
    editor.set_selection(Selection::cursor(55)).unwrap();

    assert!(editor.handle_key(Key::Enter).unwrap());
    insta::assert_snapshot!(editor.doc().to_string(), @r#"
    heading[level=1] "Chapter One"
    paragraph "It was a dark night."
    bubble[position=left] "Who's there?"
    bubble[position=right] ""
    horizontalRule[type=solid]
    blockquote[type=bubble-right,indent=2] "Nobody."
    paragraph ""
    "#);
    assert_eq!(editor.selection(), Selection::cursor(62));
}

#[test]
fn decoration_always_contains_the_head() {
    let doc = Document::from_nodes(chapter()).unwrap();
    let mut editor = Editor::new(doc.clone(), EditorOptions::default());
    for head in 0..=doc.size() {
        editor.set_selection(Selection::range(0, head)).unwrap();
        for decoration in editor.decorations().iter() {
            assert!(decoration.from <= head && head <= decoration.to, "head {head}");
        }
    }
}

#[test]
fn failed_transaction_keeps_tree_and_selection() {
    let mut editor = editor(chapter());
    editor.set_selection(Selection::range(2, 5)).unwrap();
    let before = editor.doc().clone();

    let tr = Transaction::new()
        .delete_range(1, 4)
        .insert(1, vec![Node::text("x")])
        .set_attributes(500, BlockKind::paragraph());
    assert!(editor.apply(&tr).is_err());

    assert_eq!(editor.doc(), &before);
    assert_eq!(editor.selection(), Selection::range(2, 5));
    assert_eq!(editor.version(), 0);
}

#[test]
fn every_command_keeps_the_tree_valid() {
    let commands = [
        Cmd::InsertBubble {
            position: BubblePosition::Left,
        },
        Cmd::RemoveBubble,
        Cmd::SetBlockquote {
            style: QuoteStyle::BubbleLeft,
        },
        Cmd::ToggleBlockquote {
            style: QuoteStyle::Line,
        },
        Cmd::UnsetBlockquote,
        Cmd::SetHorizontalRule {
            style: RuleStyle::Solid,
        },
        Cmd::Indent,
        Cmd::Outdent,
        Cmd::InsertText {
            text: "ab".to_string(),
        },
        Cmd::DeleteBackward,
        Cmd::SplitBlock,
    ];
    let doc = Document::from_nodes(chapter()).unwrap();
    for cmd in commands {
        for pos in 0..=doc.size() {
            let mut editor = Editor::new(doc.clone(), EditorOptions::default());
            editor.set_selection(Selection::cursor(pos)).unwrap();
            editor.execute(cmd.clone()).unwrap();
            assert_eq!(editor.doc().check(), Ok(()), "{cmd:?} at {pos}");
            assert!(editor.selection().to() <= editor.doc().size());
        }
    }
}
