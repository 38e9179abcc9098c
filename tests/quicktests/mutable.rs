use arbor::mutable::{NodeId, Tree};

use crate::{init_tracing, Op};

/// Every node in the subtree rooted at `id`, in pre-order. Also checks that every child points
/// back at its parent.
fn nodes(tree: &Tree<i8>, id: NodeId) -> Vec<NodeId> {
    let mut found = vec![id];
    for child in [tree.left(id).unwrap(), tree.right(id).unwrap()]
        .into_iter()
        .flatten()
    {
        assert_eq!(tree.parent(child), Ok(Some(id)));
        found.extend(nodes(tree, child));
    }
    found
}

fn all_nodes(tree: &Tree<i8>) -> Vec<NodeId> {
    tree.root().map(|root| nodes(tree, root)).unwrap_or_default()
}

/// Removes one occurrence of `x` from a sorted model.
fn remove_from_model(model: &mut Vec<i8>, x: &i8) -> bool {
    match model.iter().position(|v| v == x) {
        Some(pos) => {
            model.remove(pos);
            true
        }
        None => false,
    }
}

/// Applies a set of operations to a tree and a sorted vector. This way we can ensure that after a
/// random smattering of inserts and removals we have the same values in both.
fn do_ops(ops: &[Op<i8>], tree: &mut Tree<i8>, model: &mut Vec<i8>) {
    for op in ops {
        match op {
            Op::Insert(x) => {
                tree.insert(*x);
                let pos = model.partition_point(|v| v <= x);
                model.insert(pos, *x);
            }
            Op::Remove(x) => {
                let found = tree.search(x).map(|id| tree.remove(id).unwrap().value);
                assert_eq!(found.is_some(), remove_from_model(model, x));
            }
            Op::Pop => {
                let smallest = tree
                    .root()
                    .map(|root| tree.minimum(root).unwrap())
                    .map(|id| tree.remove(id).unwrap().value);
                assert_eq!(smallest, (!model.is_empty()).then(|| model.remove(0)));
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(first: i8, ops: Vec<Op<i8>>) -> bool {
    init_tracing();
    let mut tree = Tree::new(first);
    let mut model = vec![first];

    do_ops(&ops, &mut tree, &mut model);

    tree.len() == model.len()
        && all_nodes(&tree).len() == model.len()
        && tree.iter().copied().eq(model.iter().copied())
}

#[quickcheck]
fn in_order_is_sorted(xs: Vec<i8>) -> bool {
    let Ok(tree) = Tree::from_values(xs.clone()) else {
        return xs.is_empty();
    };
    let mut sorted = xs;
    sorted.sort();

    let mut visited = Vec::new();
    tree.traverse_in_order(tree.root().unwrap(), |v| visited.push(*v)).unwrap();

    visited == sorted && tree.map(tree.root().unwrap(), |v| *v).unwrap() == sorted
}

#[quickcheck]
fn count_matches_insertions(xs: Vec<i8>) -> bool {
    match Tree::from_values(xs.clone()) {
        Ok(tree) => tree.len() == xs.len() && tree.count(tree.root().unwrap()) == Ok(xs.len()),
        Err(_) => xs.is_empty(),
    }
}

#[quickcheck]
fn contains(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let Ok(tree) = Tree::from_values(xs.clone()) else {
        return true;
    };

    xs.iter().all(|x| tree.value(tree.search(x).unwrap()) == Ok(x))
        && nots
            .iter()
            .filter(|x| !xs.contains(x))
            .all(|x| !tree.contains(x))
}

#[quickcheck]
fn remove_takes_exactly_one(xs: Vec<i8>, x: i8) -> bool {
    let mut values = xs;
    values.push(x);
    let mut tree = Tree::from_values(values.clone()).unwrap();
    let copies = values.iter().filter(|v| **v == x).count();

    let id = tree.search(&x).unwrap();
    let removed = tree.remove(id).unwrap();

    removed.value == x
        && tree.len() == values.len() - 1
        && tree.iter().filter(|v| **v == x).count() == copies - 1
        && tree.contains(&x) == (copies > 1)
        && tree.value(id).is_err()
}

#[quickcheck]
fn depth_and_height_agree(xs: Vec<i8>) -> bool {
    let Ok(tree) = Tree::from_values(xs) else {
        return true;
    };
    let root = tree.root().unwrap();

    let ids = all_nodes(&tree);
    let deepest_leaf = ids
        .iter()
        .filter(|id| tree.is_leaf(**id).unwrap())
        .map(|id| tree.depth(*id).unwrap())
        .max();

    let depths_match_paths = ids.iter().all(|id| {
        let mut edges = 0;
        let mut current = *id;
        while let Some(parent) = tree.parent(current).unwrap() {
            current = parent;
            edges += 1;
        }
        current == root && tree.depth(*id) == Ok(edges)
    });

    depths_match_paths && deepest_leaf == tree.height(root).ok()
}
