use arbor::heap::{HeapOrder, Priority, PriorityHeap};

use crate::{init_tracing, Op};

/// Whether no element outranks its parent.
fn is_heap(heap: &PriorityHeap<i8>) -> bool {
    let values = heap.as_slice();
    (1..values.len()).all(|i| !heap.priority().outranks(&values[i], &values[(i - 1) / 2]))
}

/// Applies a set of operations to a heap and a plain vector and checks they agree on every
/// answer along the way.
fn do_ops(ops: &[Op<i8>], heap: &mut PriorityHeap<i8>, model: &mut Vec<i8>) -> bool {
    let order = *heap.priority();
    ops.iter().all(|op| {
        let agrees = match op {
            Op::Insert(x) => {
                heap.push(*x);
                model.push(*x);
                true
            }
            Op::Remove(x) => {
                let expected = model.iter().position(|v| v == x).map(|pos| model.remove(pos));
                heap.remove(x) == expected
            }
            Op::Pop => {
                let best = match order {
                    HeapOrder::Max => model.iter().max(),
                    HeapOrder::Min => model.iter().min(),
                }
                .copied();
                if let Some(best) = best {
                    let pos = model.iter().position(|v| *v == best).unwrap();
                    model.remove(pos);
                }
                heap.pop() == best
            }
        };
        agrees && heap.len() == model.len() && is_heap(heap)
    })
}

#[quickcheck]
fn fuzz_max_heap(ops: Vec<Op<i8>>) -> bool {
    init_tracing();
    do_ops(&ops, &mut PriorityHeap::new(), &mut Vec::new())
}

#[quickcheck]
fn fuzz_min_heap(initial: Vec<i8>, ops: Vec<Op<i8>>) -> bool {
    init_tracing();
    let mut heap = PriorityHeap::from_vec(initial.clone(), HeapOrder::Min);
    is_heap(&heap) && do_ops(&ops, &mut heap, &mut initial.clone())
}

#[quickcheck]
fn round_trip_sorts(xs: Vec<i8>) -> bool {
    let mut ascending = xs.clone();
    ascending.sort();
    let mut descending = ascending.clone();
    descending.reverse();

    PriorityHeap::from_vec(xs.clone(), HeapOrder::Min).into_sorted_vec() == ascending
        && PriorityHeap::from_vec(xs, HeapOrder::Max).into_sorted_vec() == descending
}

#[quickcheck]
fn remove_all_takes_every_copy(xs: Vec<i8>, x: i8) -> bool {
    let copies = xs.iter().filter(|v| **v == x).count();
    let mut heap: PriorityHeap<i8> = xs.iter().copied().collect();

    heap.remove_all(&x) == copies
        && heap.len() == xs.len() - copies
        && !heap.iter().any(|v| *v == x)
        && is_heap(&heap)
}
