use arbor::persistent::Tree;

use std::collections::HashSet;

fn build(xs: &[i8]) -> Tree<i8> {
    let mut tree = Tree::new();
    for x in xs {
        tree = tree.insert(*x);
    }
    tree
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree = build(&xs);

    xs.iter().all(|x| tree.search(x).and_then(Tree::value) == Some(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree = build(&xs);
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.search(x).is_none())
}

#[quickcheck]
fn in_order_is_sorted(xs: Vec<i8>) -> bool {
    let tree = build(&xs);
    let mut sorted = xs;
    sorted.sort();

    tree.iter().copied().eq(sorted.iter().copied())
        && tree.count() == sorted.len()
        && tree.min_value() == sorted.first()
        && tree.max_value() == sorted.last()
}

#[quickcheck]
fn insert_leaves_original_alone(xs: Vec<i8>, x: i8, probes: Vec<i8>) -> bool {
    let tree = build(&xs);
    let count = tree.count();
    let values: Vec<_> = tree.iter().copied().collect();
    let found: Vec<_> = probes.iter().map(|p| tree.contains(p)).collect();

    let new_tree = tree.insert(x);

    tree.count() == count
        && tree.iter().copied().eq(values.iter().copied())
        && probes.iter().map(|p| tree.contains(p)).eq(found)
        && new_tree.count() == count + 1
        && new_tree.contains(&x)
}

#[quickcheck]
fn height_bounds(xs: Vec<i8>) -> bool {
    let tree = build(&xs);
    let count = tree.count() as isize;

    // A chain is as tall as it gets and a full tree as short.
    tree.height() < count.max(0) && (count == 0 || tree.height() >= count.ilog2() as isize)
}
