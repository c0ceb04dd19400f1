use indexmap::IndexSet;
use tracing::{debug, trace};

use super::{Drawable, DrawableId, DrawableSetup, LayerSurface};

/// Recycling arena for the drawables one plugin shows per frame.
///
/// Every drawable ever created lives in the arena and is addressed by its
/// [`DrawableId`]. A live id is either *visible* (attached to the surface) or
/// *reusable* (detached, waiting on a LIFO stack), never both. The arena only
/// grows when a drawable is requested while the reusable stack is empty, so
/// its size is the high-water mark of simultaneously visible drawables.
#[derive(Debug, Default)]
pub struct DrawablePool {
    arena: Vec<Drawable>,
    visible: IndexSet<DrawableId>,
    reusable: Vec<DrawableId>,
    setup: DrawableSetup,
}

impl DrawablePool {
    #[must_use]
    pub fn new(setup: DrawableSetup) -> Self {
        Self {
            arena: Vec::new(),
            visible: IndexSet::new(),
            reusable: Vec::new(),
            setup,
        }
    }

    /// Pixel density applied to drawables created from now on.
    pub fn set_contents_scale(&mut self, contents_scale: f64) {
        if contents_scale.is_finite() && contents_scale > 0.0 {
            self.setup.contents_scale = contents_scale;
        }
    }

    /// Returns a visible drawable, reusing the most recently enqueued one.
    pub fn dequeue(&mut self, surface: &mut LayerSurface<'_>) -> DrawableId {
        let id = match self.reusable.pop() {
            Some(id) => id,
            None => {
                let id = DrawableId::new(self.arena.len());
                self.arena.push(Drawable::new(id, self.setup));
                debug!(
                    layer = surface.layer().raw(),
                    allocated = self.arena.len(),
                    "drawable pool grew"
                );
                id
            }
        };
        self.visible.insert(id);
        surface.attach(id);
        id
    }

    /// Detaches a visible drawable and makes it available for reuse.
    ///
    /// Returns `false` (and does nothing) when `id` is not currently visible.
    pub fn enqueue(&mut self, id: DrawableId, surface: &mut LayerSurface<'_>) -> bool {
        if !self.visible.swap_remove(&id) {
            trace!(
                layer = surface.layer().raw(),
                drawable = id.index(),
                "ignoring enqueue of a drawable that is not visible"
            );
            return false;
        }
        surface.detach(id);
        self.reusable.push(id);
        true
    }

    /// Returns every visible drawable to the pool.
    pub fn recycle_visible(&mut self, surface: &mut LayerSurface<'_>) {
        while let Some(id) = self.visible.pop() {
            surface.detach(id);
            self.reusable.push(id);
        }
    }

    /// Grows or shrinks the visible set to exactly `count` drawables.
    ///
    /// Surviving drawables keep their slot order; shrinking releases the
    /// most recently dequeued slots first.
    pub fn resize_visible(&mut self, count: usize, surface: &mut LayerSurface<'_>) {
        while self.visible.len() > count {
            if let Some(id) = self.visible.pop() {
                surface.detach(id);
                self.reusable.push(id);
            }
        }
        while self.visible.len() < count {
            self.dequeue(surface);
        }
    }

    /// Detaches all visible drawables and discards the whole arena.
    pub fn tear_down(&mut self, surface: &mut LayerSurface<'_>) {
        for id in self.visible.drain(..) {
            surface.detach(id);
        }
        self.reusable.clear();
        self.arena.clear();
    }

    #[must_use]
    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        self.arena.get(id.index())
    }

    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.arena.get_mut(id.index())
    }

    /// Visible drawable at `slot` in dequeue order.
    pub fn visible_mut(&mut self, slot: usize) -> Option<&mut Drawable> {
        let id = *self.visible.get_index(slot)?;
        self.arena.get_mut(id.index())
    }

    #[must_use]
    pub fn is_visible(&self, id: DrawableId) -> bool {
        self.visible.contains(&id)
    }

    pub fn visible_ids(&self) -> impl Iterator<Item = DrawableId> + '_ {
        self.visible.iter().copied()
    }

    pub fn reusable_ids(&self) -> impl Iterator<Item = DrawableId> + '_ {
        self.reusable.iter().copied()
    }

    pub fn visible_drawables(&self) -> impl Iterator<Item = &Drawable> + '_ {
        self.visible
            .iter()
            .filter_map(|id| self.arena.get(id.index()))
    }

    /// Applies `z_position` to every drawable the pool owns.
    pub fn set_z_position(&mut self, z_position: f64) {
        for drawable in &mut self.arena {
            drawable.z_position = z_position;
        }
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn reusable_count(&self) -> usize {
        self.reusable.len()
    }

    /// Total drawables ever created since the last tear-down.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.arena.len()
    }
}
