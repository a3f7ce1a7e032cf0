//! Point tracking through structural mutation.
//!
//! Every mutation primitive on [`super::Document`] reports its change to the
//! tracker through [`PointTracker::shift`] or [`PointTracker::remap`], so a
//! point registered before a sequence of edits resolves to the exact
//! equivalent location afterwards.

use crate::position::Point;

use super::NodeId;

/// Handle to a point registered with the document's tracker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(usize);

#[derive(Debug, Clone, Default)]
pub(crate) struct PointTracker {
    slots: Vec<Option<Point>>,
}

impl PointTracker {
    pub(crate) fn track(&mut self, point: Point) -> TrackId {
        if let Some(free) = self.slots.iter().position(Option::is_none) {
            self.slots[free] = Some(point);
            TrackId(free)
        } else {
            self.slots.push(Some(point));
            TrackId(self.slots.len() - 1)
        }
    }

    pub(crate) fn get(&self, id: TrackId) -> Option<Point> {
        self.slots.get(id.0).copied().flatten()
    }

    pub(crate) fn set(&mut self, id: TrackId, point: Point) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = Some(point);
        }
    }

    pub(crate) fn release(&mut self, id: TrackId) -> Option<Point> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    pub(crate) fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Moves every point on `node` whose offset is strictly greater than
    /// `after` by `delta`.
    pub(crate) fn shift(&mut self, node: NodeId, after: usize, delta: isize) {
        self.remap(|point| {
            if point.node == node && point.offset > after {
                Point::new(node, point.offset.saturating_add_signed(delta))
            } else {
                point
            }
        });
    }

    pub(crate) fn remap(&mut self, mut f: impl FnMut(Point) -> Point) {
        for slot in self.slots.iter_mut().flatten() {
            *slot = f(*slot);
        }
    }
}

/// Anchor and focus registered for the duration of an edit.
///
/// Obtained from [`super::Document::preserve`] and turned back into a
/// selection with [`super::Document::restore`].
#[derive(Debug)]
#[must_use = "a preserved selection must be restored to release its tracking slots"]
pub struct PreservedSelection {
    pub(crate) anchor: TrackId,
    pub(crate) focus: TrackId,
}

impl PreservedSelection {
    pub(crate) fn new(anchor: TrackId, focus: TrackId) -> Self {
        Self { anchor, focus }
    }
}

impl From<PreservedSelection> for (TrackId, TrackId) {
    fn from(p: PreservedSelection) -> Self {
        (p.anchor, p.focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: usize) -> NodeId {
        NodeId(i)
    }

    #[test]
    fn test_released_slots_are_reused() {
        let mut tracker = PointTracker::default();
        let a = tracker.track(Point::new(node(1), 0));
        let b = tracker.track(Point::new(node(1), 1));
        assert_eq!(tracker.release(a), Some(Point::new(node(1), 0)));
        let c = tracker.track(Point::new(node(2), 2));
        assert_eq!(a, c);
        assert_eq!(tracker.get(b), Some(Point::new(node(1), 1)));
        assert_eq!(tracker.points().count(), 2);
    }

    #[test]
    fn test_shift_only_moves_points_past_the_offset() {
        let mut tracker = PointTracker::default();
        let before = tracker.track(Point::new(node(1), 2));
        let after = tracker.track(Point::new(node(1), 3));
        let other = tracker.track(Point::new(node(2), 5));

        tracker.shift(node(1), 2, 4);

        assert_eq!(tracker.get(before), Some(Point::new(node(1), 2)));
        assert_eq!(tracker.get(after), Some(Point::new(node(1), 7)));
        assert_eq!(tracker.get(other), Some(Point::new(node(2), 5)));

        tracker.shift(node(1), 0, -1);
        assert_eq!(tracker.get(before), Some(Point::new(node(1), 1)));
    }
}
