use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::{BuildStack, ElementRegistry, LayoutProperty, NodeId, NodeKind};
use trellis_graphics::Size;
use trellis_layout::{
    BorderWidthProperty, BoxConstraint, CalcLength, CalcSize, MarginProperty, PaddingProperty,
    PropertyChangeFlags,
};

const SECTION_COUNT: usize = 4;
const ROWS_PER_SECTION: usize = 64;
const ROWS_PER_SECTION_SAMPLES: &[usize] = &[ROWS_PER_SECTION];
const NESTED_ROWS_PER_LEVEL: usize = 8;
const NESTED_DEPTH: usize = 8;
const NESTED_DEPTH_SAMPLES: &[usize] = &[NESTED_DEPTH];
const ROOT_SIZE: Size = Size {
    width: 1080.0,
    height: 1920.0,
};

fn open_frame(stack: &BuildStack, tag: &str, atomic: bool) {
    let id = stack.registry().create_node(tag, NodeKind::Frame { atomic });
    stack.push(id);
}

fn section_content(stack: &BuildStack, rows_per_section: usize) {
    open_frame(stack, "Column", false);
    open_frame(stack, "Text", true);
    for _ in 0..rows_per_section {
        open_frame(stack, "Row", false);
        open_frame(stack, "Text", true);
        open_frame(stack, "Text", true);
        stack.pop_container();
    }
    stack.pop_container();
}

fn nested_content(stack: &BuildStack, depth: usize, rows_per_level: usize) {
    if depth == 0 {
        return;
    }
    open_frame(stack, "Column", false);
    open_frame(stack, "Text", true);
    for _ in 0..rows_per_level {
        open_frame(stack, "Row", false);
        open_frame(stack, "Text", true);
        open_frame(stack, "Text", true);
        stack.pop_container();
    }
    nested_content(stack, depth - 1, rows_per_level);
    stack.pop_container();
}

struct TreeFixture {
    registry: Rc<ElementRegistry>,
    sections: usize,
    rows_per_section: usize,
}

impl TreeFixture {
    fn new(sections: usize, rows_per_section: usize) -> Self {
        Self {
            registry: Rc::new(ElementRegistry::new()),
            sections,
            rows_per_section,
        }
    }

    fn build(&self) -> NodeId {
        self.registry.clear();
        let stack = BuildStack::new(Rc::clone(&self.registry));
        open_frame(&stack, "Column", false);
        for _ in 0..self.sections {
            section_content(&stack, self.rows_per_section);
        }
        stack.finish().expect("root element")
    }
}

struct NestedFixture {
    registry: Rc<ElementRegistry>,
    depth: usize,
    rows_per_level: usize,
}

impl NestedFixture {
    fn new(depth: usize, rows_per_level: usize) -> Self {
        Self {
            registry: Rc::new(ElementRegistry::new()),
            depth,
            rows_per_level,
        }
    }

    fn build(&self) -> NodeId {
        self.registry.clear();
        let stack = BuildStack::new(Rc::clone(&self.registry));
        nested_content(&stack, self.depth, self.rows_per_level);
        stack.finish().expect("root element")
    }
}

fn leaf_nodes(registry: &ElementRegistry, root: NodeId) -> Vec<NodeId> {
    let mut leaves = Vec::new();
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        let children = registry
            .with_node(id, |node| node.children())
            .expect("node in registry");
        if children.is_empty() {
            leaves.push(id);
        } else {
            pending.extend(children);
        }
    }
    leaves
}

fn ui_object_count(sections: usize, rows_per_section: usize) -> usize {
    1 + sections * (2 + rows_per_section * 3)
}

fn nested_ui_object_count(depth: usize, rows_per_level: usize) -> usize {
    depth * (2 + rows_per_level * 3)
}

fn bench_tree_build(c: &mut Criterion) {
    let sections = SECTION_COUNT;
    let mut group = c.benchmark_group("tree_build");
    for &rows_per_section in ROWS_PER_SECTION_SAMPLES {
        let total_ui_objects = ui_object_count(sections, rows_per_section);
        group.bench_with_input(
            BenchmarkId::new("ui_objects", total_ui_objects),
            &(sections, rows_per_section),
            |b, &(sections, rows_per_section)| {
                let fixture = TreeFixture::new(sections, rows_per_section);

                b.iter(|| {
                    black_box(fixture.build());
                });
            },
        );
    }
    group.finish();
}

fn bench_nested_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_tree_build");
    for &depth in NESTED_DEPTH_SAMPLES {
        let total_ui_objects = nested_ui_object_count(depth, NESTED_ROWS_PER_LEVEL);
        group.bench_with_input(
            BenchmarkId::new("ui_objects", total_ui_objects),
            &depth,
            |b, &depth| {
                let fixture = NestedFixture::new(depth, NESTED_ROWS_PER_LEVEL);

                b.iter(|| {
                    black_box(fixture.build());
                });
            },
        );
    }
    group.finish();
}

fn bench_dirty_routing(c: &mut Criterion) {
    let sections = SECTION_COUNT;
    let mut group = c.benchmark_group("dirty_routing");
    for &rows_per_section in ROWS_PER_SECTION_SAMPLES {
        let total_ui_objects = ui_object_count(sections, rows_per_section);
        group.bench_with_input(
            BenchmarkId::new("ui_objects", total_ui_objects),
            &(sections, rows_per_section),
            |b, &(sections, rows_per_section)| {
                let fixture = TreeFixture::new(sections, rows_per_section);
                let root = fixture.build();
                let leaves = leaf_nodes(&fixture.registry, root);

                b.iter(|| {
                    for &leaf in &leaves {
                        fixture
                            .registry
                            .mark_dirty_node(leaf, PropertyChangeFlags::MEASURE)
                            .expect("registered leaf");
                    }
                    black_box(fixture.registry.take_dirty_layout_nodes());
                });
            },
        );
    }
    group.finish();
}

fn bench_constraint_resolution(c: &mut Criterion) {
    let mut parent = BoxConstraint::unbounded();
    parent.max_size = ROOT_SIZE;
    parent.percent_reference = ROOT_SIZE;

    let mut property = LayoutProperty::default();
    property.update_padding(PaddingProperty::uniform(CalcLength::Px(8.0)));
    property.update_margin(MarginProperty::uniform(CalcLength::Px(4.0)));
    property.update_border_width(BorderWidthProperty::uniform(CalcLength::Px(1.0)));
    property.update_user_defined_ideal_size(CalcSize::new(Some(CalcLength::Percent(0.5)), None));
    property.update_aspect_ratio(1.5);

    c.bench_function("constraint_resolution", |b| {
        b.iter(|| {
            property
                .update_layout_constraint(&parent)
                .expect("layout constraint");
            property
                .update_content_constraint()
                .expect("content constraint");
            black_box(property.create_child_constraint());
        });
    });
}

criterion_group!(
    build_stack,
    bench_tree_build,
    bench_nested_tree_build,
    bench_dirty_routing,
    bench_constraint_resolution
);
criterion_main!(build_stack);
