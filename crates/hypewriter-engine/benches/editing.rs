use criterion::{Criterion, criterion_group, criterion_main};
use hypewriter_engine::editing::{
    BlockKind, BubblePosition, Cmd, Document, Editor, EditorOptions, Node, RuleStyle, Selection,
};

fn generate_chapter(blocks: usize) -> Document {
    let nodes = (0..blocks)
        .map(|i| match i % 4 {
            0 => Node::paragraph("Paragraph with some content for the benchmark."),
            1 => Node::textblock(BlockKind::bubble(BubblePosition::Left), "A line of dialogue."),
            2 => Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![]),
            _ => Node::textblock(BlockKind::Paragraph { indent: 2 }, "Indented paragraph."),
        })
        .collect();
    Document::from_nodes(nodes).unwrap()
}

fn bench_editing(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing");
    group.sample_size(10);

    let doc = generate_chapter(1000);
    let middle = doc.size() / 2;

    group.bench_function("resolve", |b| {
        b.iter(|| {
            let rp = doc.resolve(std::hint::black_box(middle)).unwrap();
            std::hint::black_box(rp);
        });
    });

    group.bench_function("wrap_and_unwrap", |b| {
        b.iter(|| {
            let mut editor = Editor::new(doc.clone(), EditorOptions::default());
            editor.set_selection(Selection::range(2, 20)).unwrap();
            editor
                .execute(Cmd::InsertBubble {
                    position: BubblePosition::Right,
                })
                .unwrap();
            editor.execute(Cmd::RemoveBubble).unwrap();
        });
    });

    group.bench_function("line_highlight", |b| {
        let mut editor = Editor::new(doc.clone(), EditorOptions::default());
        editor.set_selection(Selection::cursor(middle)).unwrap();
        b.iter(|| std::hint::black_box(editor.decorations()));
    });

    group.finish();
}

criterion_group!(benches, bench_editing);
criterion_main!(benches);
