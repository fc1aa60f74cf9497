//! Region quadtree used as the collision broad phase
//!
//! The tree stores `usize` handles into a slice owned by the caller (the
//! simulation's particle `Vec`), never the items themselves. Nodes live in a
//! flat arena and refer to their children by index, so the whole structure is
//! a plain owned tree with no aliasing.
//!
//! An item is stored at the shallowest node whose region fully contains its
//! bounding box: anything straddling a node's midlines stays at that node.
//! A node splits once it holds more than `max_objects` handles and is above
//! `max_levels`; splitting pushes every held item that fits a single quadrant
//! down into it.
//!
//! The tree is not updated incrementally. Call [`QuadTree::clear`] and
//! re-insert everything whenever the items move.
//!
//! [`QuadTree::retrieve`] only walks the path from the root towards the
//! query's quadrant. It returns everything stored on that path (ancestors plus
//! the one matching child subtree path), but never items parked in sibling
//! quadrants, even if they sit right across a split line. That makes it a
//! cheap candidate set rather than an exact neighbor query.

use std::collections::BTreeSet;

use particle_physics::Particle;

use crate::params::QuadTreeParams;
use crate::rectangle::Rectangle;

const ROOT: usize = 0;

/// Anything with an axis-aligned bounding box can be indexed
pub trait Bounded {
    fn bounds(&self) -> Rectangle;
}

impl Bounded for Particle {
    fn bounds(&self) -> Rectangle {
        Rectangle::around_circle(self.position, self.radius())
    }
}

impl Bounded for Rectangle {
    fn bounds(&self) -> Rectangle {
        *self
    }
}

/// Child slot of a split node
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Quadrant {
    TopRight = 0,
    TopLeft = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopRight,
        Quadrant::TopLeft,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The part of `region` this quadrant covers
    pub fn of(self, region: &Rectangle) -> Rectangle {
        let half_w = region.width() / 2.0;
        let half_h = region.height() / 2.0;
        let (x, y) = (region.x(), region.y());
        match self {
            Quadrant::TopRight => Rectangle::new(x + half_w, y, half_w, half_h),
            Quadrant::TopLeft => Rectangle::new(x, y, half_w, half_h),
            Quadrant::BottomLeft => Rectangle::new(x, y + half_h, half_w, half_h),
            Quadrant::BottomRight => Rectangle::new(x + half_w, y + half_h, half_w, half_h),
        }
    }
}

/// Quadrant of `region` that `item` fits in without touching a midline.
///
/// `None` when the item straddles either midline.
pub fn quadrant_of(region: &Rectangle, item: &Rectangle) -> Option<Quadrant> {
    let mid = region.center();
    let top = item.bottom() < mid.y;
    let bottom = item.top() > mid.y;
    let left = item.right() < mid.x;
    let right = item.left() > mid.x;

    match (left, right, top, bottom) {
        (true, _, true, _) => Some(Quadrant::TopLeft),
        (true, _, _, true) => Some(Quadrant::BottomLeft),
        (_, true, true, _) => Some(Quadrant::TopRight),
        (_, true, _, true) => Some(Quadrant::BottomRight),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct Node {
    level: usize,
    bounds: Rectangle,
    objects: Vec<usize>,
    children: Option<[usize; 4]>,
}

impl Node {
    fn empty(level: usize, bounds: Rectangle) -> Self {
        Self {
            level,
            bounds,
            objects: Vec::new(),
            children: None,
        }
    }
}

/// Read-only view of one node, for debug overlays and tests
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub level: usize,
    pub bounds: Rectangle,
    pub handles: &'a [usize],
    pub is_split: bool,
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<Node>,
    params: QuadTreeParams,
}

impl QuadTree {
    pub fn new(bounds: Rectangle, params: QuadTreeParams) -> Self {
        Self {
            nodes: vec![Node::empty(0, bounds)],
            params,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        self.nodes[ROOT].bounds
    }

    pub fn params(&self) -> QuadTreeParams {
        self.params
    }

    /// Change the root region. Empties the tree.
    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.clear();
        self.nodes[ROOT].bounds = bounds;
    }

    /// Drop every handle and child node, leaving an empty root
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        let root = &mut self.nodes[ROOT];
        root.objects.clear();
        root.children = None;
    }

    /// Root quadrant `item` would be filed under, if any
    pub fn get_index<T: Bounded + ?Sized>(&self, item: &T) -> Option<Quadrant> {
        quadrant_of(&self.nodes[ROOT].bounds, &item.bounds())
    }

    /// Index `items[handle]`.
    ///
    /// `items` is the backing slice handles refer to; it is read again when a
    /// node splits and redistributes what it holds, so it must not change
    /// between inserts. Panics if `handle` is out of range for `items`.
    pub fn insert<T: Bounded>(&mut self, items: &[T], handle: usize) {
        self.insert_at(ROOT, items, handle);
    }

    fn insert_at<T: Bounded>(&mut self, node: usize, items: &[T], handle: usize) {
        let region = self.nodes[node].bounds;

        if let Some(children) = self.nodes[node].children {
            if let Some(quadrant) = quadrant_of(&region, &items[handle].bounds()) {
                self.insert_at(children[quadrant.index()], items, handle);
                return;
            }
        }

        self.nodes[node].objects.push(handle);

        let over_capacity = self.nodes[node].objects.len() > self.params.max_objects;
        if !over_capacity || self.nodes[node].level >= self.params.max_levels {
            return;
        }

        let children = self.split(node);
        let held = std::mem::take(&mut self.nodes[node].objects);
        let mut straddling = Vec::with_capacity(held.len());
        for h in held {
            match quadrant_of(&region, &items[h].bounds()) {
                Some(quadrant) => self.insert_at(children[quadrant.index()], items, h),
                None => straddling.push(h),
            }
        }
        self.nodes[node].objects = straddling;
    }

    /// Create the four children of `node` unless they already exist
    fn split(&mut self, node: usize) -> [usize; 4] {
        if let Some(children) = self.nodes[node].children {
            return children;
        }

        let level = self.nodes[node].level + 1;
        let region = self.nodes[node].bounds;
        let first = self.nodes.len();
        for quadrant in Quadrant::ALL {
            self.nodes.push(Node::empty(level, quadrant.of(&region)));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[node].children = Some(children);
        children
    }

    /// Candidate handles for `item`, in ascending handle order
    pub fn retrieve<T: Bounded + ?Sized>(&self, item: &T) -> BTreeSet<usize> {
        let mut found = BTreeSet::new();
        self.retrieve_into(item, &mut found);
        found
    }

    /// Like [`Self::retrieve`], adding to `found` so the set can be reused
    pub fn retrieve_into<T: Bounded + ?Sized>(&self, item: &T, found: &mut BTreeSet<usize>) {
        let bounds = item.bounds();
        let mut node = ROOT;
        loop {
            let current = &self.nodes[node];
            found.extend(current.objects.iter().copied());
            match (current.children, quadrant_of(&current.bounds, &bounds)) {
                (Some(children), Some(quadrant)) => node = children[quadrant.index()],
                _ => break,
            }
        }
    }

    /// Handles stored directly at the root
    pub fn root_handles(&self) -> &[usize] {
        &self.nodes[ROOT].objects
    }

    /// Total handles stored in the tree
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.objects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.objects.is_empty())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest level that has a node
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// Every node, parents before their children
    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        self.nodes.iter().map(|n| NodeView {
            level: n.level,
            bounds: n.bounds,
            handles: &n.objects,
            is_split: n.children.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_physics::Vector2D;

    fn params(max_objects: usize, max_levels: usize) -> QuadTreeParams {
        QuadTreeParams {
            max_objects,
            max_levels,
        }
    }

    fn tree(max_objects: usize, max_levels: usize) -> QuadTree {
        QuadTree::new(
            Rectangle::new(0.0, 0.0, 400.0, 400.0),
            params(max_objects, max_levels),
        )
    }

    fn particle(x: f64, y: f64) -> Particle {
        Particle::with_state(Vector2D::new(x, y), Vector2D::ZERO, 5.0, 1.0)
    }

    fn insert_all(tree: &mut QuadTree, items: &[Particle]) {
        for handle in 0..items.len() {
            tree.insert(items, handle);
        }
    }

    #[test]
    fn test_quadrant_of_uses_bounding_box() {
        let region = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let at = |x, y| particle(x, y).bounds();

        assert_eq!(quadrant_of(&region, &at(80.0, 20.0)), Some(Quadrant::TopRight));
        assert_eq!(quadrant_of(&region, &at(20.0, 20.0)), Some(Quadrant::TopLeft));
        assert_eq!(quadrant_of(&region, &at(20.0, 80.0)), Some(Quadrant::BottomLeft));
        assert_eq!(quadrant_of(&region, &at(80.0, 80.0)), Some(Quadrant::BottomRight));

        // Center inside a quadrant but the circle crosses a midline
        assert_eq!(quadrant_of(&region, &at(47.0, 20.0)), None);
        assert_eq!(quadrant_of(&region, &at(20.0, 53.0)), None);
        assert_eq!(quadrant_of(&region, &at(50.0, 50.0)), None);
    }

    #[test]
    fn test_quadrant_regions_tile_parent() {
        let region = Rectangle::new(10.0, 20.0, 200.0, 100.0);
        assert_eq!(Quadrant::TopRight.of(&region), Rectangle::new(110.0, 20.0, 100.0, 50.0));
        assert_eq!(Quadrant::TopLeft.of(&region), Rectangle::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(Quadrant::BottomLeft.of(&region), Rectangle::new(10.0, 70.0, 100.0, 50.0));
        assert_eq!(Quadrant::BottomRight.of(&region), Rectangle::new(110.0, 70.0, 100.0, 50.0));
    }

    #[test]
    fn test_no_split_at_capacity() {
        let mut t = tree(4, 5);
        let items: Vec<_> = (0..4).map(|i| particle(20.0 + 30.0 * i as f64, 20.0)).collect();
        insert_all(&mut t, &items);

        assert_eq!(t.node_count(), 1);
        assert_eq!(t.root_handles(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_split_past_capacity_keeps_only_straddlers_at_root() {
        let mut t = tree(4, 5);
        let items = vec![
            particle(300.0, 100.0), // top right
            particle(100.0, 100.0), // top left
            particle(100.0, 300.0), // bottom left
            particle(300.0, 300.0), // bottom right
            particle(200.0, 100.0), // on the vertical midline
            particle(50.0, 50.0),   // top left
        ];
        insert_all(&mut t, &items);

        assert_eq!(t.node_count(), 5);
        assert_eq!(t.root_handles(), &[4]);
        assert_eq!(t.len(), items.len());
        for view in t.nodes().skip(1) {
            assert_eq!(view.level, 1);
            for &h in view.handles {
                assert!(view.bounds.contains(&items[h].bounds()));
            }
        }
    }

    #[test]
    fn test_overflowing_split_node_keeps_its_children() {
        let mut t = tree(2, 5);
        let mut items = vec![
            particle(300.0, 100.0), // top right
            particle(100.0, 100.0), // top left
            particle(100.0, 300.0), // bottom left
        ];
        // All on the vertical midline, so they can never leave the root
        items.extend((0..6).map(|i| particle(200.0, 40.0 + 50.0 * i as f64)));
        insert_all(&mut t, &items);

        assert_eq!(t.node_count(), 5);
        assert_eq!(t.depth(), 1);
        assert_eq!(t.root_handles(), &[3, 4, 5, 6, 7, 8]);
        let children: Vec<_> = t.nodes().skip(1).map(|v| v.handles.to_vec()).collect();
        assert_eq!(children, vec![vec![0], vec![1], vec![2], vec![]]);
    }

    #[test]
    fn test_insert_after_split_descends() {
        let mut t = tree(1, 5);
        let items = vec![
            particle(100.0, 100.0),
            particle(300.0, 300.0),
            particle(300.0, 100.0),
        ];
        insert_all(&mut t, &items);

        assert!(t.root_handles().is_empty());
        let top_right = t
            .nodes()
            .find(|v| v.level == 1 && v.bounds == Rectangle::new(200.0, 0.0, 200.0, 200.0))
            .expect("top right child exists");
        assert_eq!(top_right.handles, &[2]);
    }

    #[test]
    fn test_depth_is_capped() {
        let mut t = tree(1, 2);
        // Crowd a corner so every level wants to split
        let items: Vec<_> = (0..10).map(|i| particle(8.0 + i as f64 * 0.1, 8.0)).collect();
        insert_all(&mut t, &items);

        assert_eq!(t.depth(), 2);
        assert_eq!(t.len(), items.len());
        let deepest: usize = t.nodes().filter(|v| v.level == 2).map(|v| v.handles.len()).sum();
        assert_eq!(deepest, items.len());
    }

    #[test]
    fn test_zero_levels_never_splits() {
        let mut t = tree(1, 0);
        let items: Vec<_> = (0..8).map(|i| particle(30.0 + 40.0 * i as f64, 30.0)).collect();
        insert_all(&mut t, &items);
        assert_eq!(t.node_count(), 1);
        assert_eq!(t.root_handles().len(), 8);
    }

    #[test]
    fn test_clear_resets_to_empty_root() {
        let mut t = tree(1, 5);
        let items = vec![particle(100.0, 100.0), particle(300.0, 300.0)];
        insert_all(&mut t, &items);
        assert!(t.node_count() > 1);

        t.clear();

        assert_eq!(t.node_count(), 1);
        assert!(t.is_empty());
        assert_eq!(t.depth(), 0);
        assert_eq!(t.bounds(), Rectangle::new(0.0, 0.0, 400.0, 400.0));
    }

    #[test]
    fn test_set_bounds_changes_root_region() {
        let mut t = tree(1, 5);
        let items = vec![particle(100.0, 100.0), particle(300.0, 300.0)];
        insert_all(&mut t, &items);

        t.set_bounds(Rectangle::new(0.0, 0.0, 800.0, 600.0));

        assert!(t.is_empty());
        assert_eq!(t.bounds(), Rectangle::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(t.get_index(&particle(100.0, 100.0)), Some(Quadrant::TopLeft));
        assert_eq!(t.get_index(&particle(500.0, 100.0)), Some(Quadrant::TopRight));
    }

    #[test]
    fn test_retrieve_excludes_sibling_quadrants() {
        let mut t = tree(2, 5);
        let items = vec![
            particle(50.0, 50.0),   // 0 top left
            particle(150.0, 50.0),  // 1 top left
            particle(300.0, 100.0), // 2 top right
            particle(100.0, 300.0), // 3 bottom left
            particle(200.0, 200.0), // 4 straddles the center
        ];
        insert_all(&mut t, &items);

        let found = t.retrieve(&items[0]);
        assert!(found.contains(&0));
        assert!(found.contains(&1));
        assert!(found.contains(&4), "root straddler is an ancestor");
        assert!(!found.contains(&2));
        assert!(!found.contains(&3));
    }

    #[test]
    fn test_straddler_is_found_from_the_deeper_side_only() {
        // Accepted approximation: a straddler's query stops at its own node,
        // so an overlapping neighbor filed deeper is only found when that
        // neighbor runs its own query.
        let mut t = tree(1, 5);
        let items = vec![particle(192.0, 100.0), particle(300.0, 300.0), particle(200.0, 100.0)];
        insert_all(&mut t, &items);
        assert!(items[0].test_collision(&items[2]));

        assert!(!t.retrieve(&items[2]).contains(&0));
        assert!(t.retrieve(&items[0]).contains(&2));
    }

    #[test]
    fn test_retrieve_straddler_only_sees_ancestors() {
        let mut t = tree(1, 5);
        let items = vec![particle(100.0, 100.0), particle(300.0, 300.0), particle(200.0, 200.0)];
        insert_all(&mut t, &items);

        let found = t.retrieve(&items[2]);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_retrieve_is_ordered_and_deduplicated() {
        let mut t = tree(10, 5);
        let items: Vec<_> = (0..6).rev().map(|i| particle(20.0 + 10.0 * i as f64, 20.0)).collect();
        insert_all(&mut t, &items);

        let mut found = t.retrieve(&items[3]);
        t.retrieve_into(&items[3], &mut found);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rectangles_can_be_indexed() {
        let mut t = tree(1, 3);
        let boxes = vec![
            Rectangle::new(10.0, 10.0, 5.0, 5.0),
            Rectangle::new(390.0, 390.0, 5.0, 5.0),
        ];
        insert_all_boxes(&mut t, &boxes);
        assert_eq!(t.retrieve(&boxes[1]).into_iter().collect::<Vec<_>>(), vec![1]);
    }

    fn insert_all_boxes(tree: &mut QuadTree, items: &[Rectangle]) {
        for handle in 0..items.len() {
            tree.insert(items, handle);
        }
    }
}
