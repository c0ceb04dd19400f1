use std::collections::HashSet;

use chart_layers::core::Size;
use chart_layers::render::{
    DrawableId, DrawableKey, DrawablePool, DrawableSetup, LayerId, LayerSurface,
    RecordingSurface,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum PoolOp {
    Dequeue,
    Enqueue(usize),
    Recycle,
    Resize(usize),
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        4 => Just(PoolOp::Dequeue),
        3 => (0usize..32).prop_map(PoolOp::Enqueue),
        1 => Just(PoolOp::Recycle),
        2 => (0usize..24).prop_map(PoolOp::Resize),
    ]
}

#[test]
fn dequeue_reuses_most_recent_enqueue() {
    let mut host = RecordingSurface::new(Size::new(100.0, 100.0));
    let mut surface = LayerSurface::new(&mut host, LayerId::new(3));
    let mut pool = DrawablePool::new(DrawableSetup::default());

    let first = pool.dequeue(&mut surface);
    let second = pool.dequeue(&mut surface);
    assert!(pool.enqueue(first, &mut surface));
    assert!(pool.enqueue(second, &mut surface));
    assert_eq!(pool.dequeue(&mut surface), second);
    assert_eq!(pool.allocated_count(), 2);
    assert!(!pool.enqueue(first, &mut surface));

    drop(surface);
    assert!(host.is_attached(DrawableKey {
        layer: LayerId::new(3),
        drawable: second,
    }));
    assert_eq!(host.attached_count(), 1);
}

#[test]
fn tear_down_detaches_everything() {
    let mut host = RecordingSurface::new(Size::new(100.0, 100.0));
    let mut pool = DrawablePool::new(DrawableSetup::default());
    {
        let mut surface = LayerSurface::new(&mut host, LayerId::new(0));
        pool.resize_visible(6, &mut surface);
        pool.resize_visible(2, &mut surface);
        pool.tear_down(&mut surface);
    }
    assert_eq!(host.attached_count(), 0);
    assert_eq!(pool.allocated_count(), 0);
    assert_eq!(pool.visible_count(), 0);
}

proptest! {
    #[test]
    fn visible_and_reusable_stay_disjoint(ops in proptest::collection::vec(pool_op(), 0..200)) {
        let mut host = RecordingSurface::new(Size::new(100.0, 100.0));
        let mut pool = DrawablePool::new(DrawableSetup::default());
        let mut surface = LayerSurface::new(&mut host, LayerId::new(0));
        let mut high_water = 0;

        for op in ops {
            match op {
                PoolOp::Dequeue => {
                    let before: HashSet<DrawableId> = pool.visible_ids().collect();
                    let id = pool.dequeue(&mut surface);
                    prop_assert!(!before.contains(&id));
                }
                PoolOp::Enqueue(raw) => {
                    pool.enqueue(DrawableId::new(raw), &mut surface);
                }
                PoolOp::Recycle => pool.recycle_visible(&mut surface),
                PoolOp::Resize(count) => {
                    pool.resize_visible(count, &mut surface);
                    prop_assert_eq!(pool.visible_count(), count);
                }
            }
            high_water = high_water.max(pool.visible_count());

            let visible: HashSet<DrawableId> = pool.visible_ids().collect();
            let reusable: HashSet<DrawableId> = pool.reusable_ids().collect();
            prop_assert!(visible.is_disjoint(&reusable));
            prop_assert_eq!(visible.len() + reusable.len(), pool.allocated_count());
            prop_assert!(pool.allocated_count() <= high_water);
        }
    }

    #[test]
    fn repeated_frames_never_exceed_peak_demand(demands in proptest::collection::vec(0usize..40, 1..60)) {
        let mut host = RecordingSurface::new(Size::new(100.0, 100.0));
        let mut pool = DrawablePool::new(DrawableSetup::default());
        let mut surface = LayerSurface::new(&mut host, LayerId::new(0));
        let peak = demands.iter().copied().max().unwrap_or(0);

        for demand in demands {
            pool.recycle_visible(&mut surface);
            for _ in 0..demand {
                pool.dequeue(&mut surface);
            }
        }
        prop_assert!(pool.allocated_count() <= peak);
    }
}
