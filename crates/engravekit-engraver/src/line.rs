//! Sample point chains and their render caches.
//!
//! A [`Line`] owns two doubly-linked chains stored in index arenas:
//!
//! - the authoritative **sample chain** of [`LinePoint`]s produced by the
//!   generators and edited by brushes and tracing, and
//! - the denser **cache chain** of [`CacheNode`]s that the dash engine
//!   patches in place and the renderer walks.
//!
//! Every sample point owns exactly one cache node of kind
//! [`CacheKind::Original`] while the cache is current. That node refers back to
//! its sample by [`PointId`]; removing the sample clears the reference and
//! marks the cache stale, so the next cache operation rebaselines it.
//!
//! Freed cache slots go to the arena free list and are reused by the next
//! insertion, so repeated re-dashing does not grow the arena.

use engravekit_core::{lerp, Vec2, EPSILON};
use lyon::geom::CubicBezierSegment;
use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// Index of a sample point within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(usize);

/// Index of a cache node within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheId(usize);

/// On/off state of a sample point, and the post-dash visibility of a cache node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointState {
    #[default]
    On,
    Off,
    /// First point of a run that was split out of a longer line.
    Start,
    /// Last point of a run that was split out of a longer line.
    End,
}

impl PointState {
    pub fn is_on(self) -> bool {
        !matches!(self, PointState::Off)
    }
}

/// Which of `p` and `(s,t)` is out of date for a sample point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Synced,
    /// `(s,t)` is authoritative, recompute `p`.
    PointFromParam,
    /// `p` was edited, recompute `(s,t)`.
    ParamFromPoint,
}

/// One authoritative sample along a generated line.
#[derive(Debug, Clone)]
pub struct LinePoint {
    pub s: f64,
    pub t: f64,
    /// Object-space position resolved from `(s,t)`.
    pub p: Vec2,
    /// Current thickness in object-space units.
    pub weight: f64,
    /// Thickness before trace or profile modulation.
    pub weight_orig: f64,
    pub on: PointState,
    pub needtosync: SyncState,
    /// Set when a trace pass blanked this point, so a later trace can restore it.
    pub trace_off: bool,
    bez_before: Vec2,
    bez_after: Vec2,
    length: f64,
    cache: Option<CacheId>,
    prev: Option<PointId>,
    next: Option<PointId>,
}

impl LinePoint {
    /// A point whose object-space position still has to be resolved.
    pub fn new(s: f64, t: f64, weight: f64) -> Self {
        let weight = sanitize_weight(weight);
        Self {
            s,
            t,
            p: Vec2::new(s, t),
            weight,
            weight_orig: weight,
            on: PointState::On,
            needtosync: SyncState::PointFromParam,
            trace_off: false,
            bez_before: Vec2::new(s, t),
            bez_after: Vec2::new(s, t),
            length: 0.0,
            cache: None,
            prev: None,
            next: None,
        }
    }

    pub fn with_state(mut self, on: PointState) -> Self {
        self.on = on;
        self
    }

    /// Hidden by the author or by a trace pass.
    pub fn is_blocked(&self) -> bool {
        !self.on.is_on() || self.trace_off
    }

    pub fn st(&self) -> Vec2 {
        Vec2::new(self.s, self.t)
    }

    /// Cubic handle pointing back toward the previous sample.
    pub fn bez_before(&self) -> Vec2 {
        self.bez_before
    }

    /// Cubic handle pointing toward the next sample.
    pub fn bez_after(&self) -> Vec2 {
        self.bez_after
    }

    /// Object-space arc length of the segment starting at this point.
    pub fn segment_length(&self) -> f64 {
        self.length
    }

    pub fn prev(&self) -> Option<PointId> {
        self.prev
    }

    pub fn next(&self) -> Option<PointId> {
        self.next
    }

    /// The original cache node mirroring this point, if the cache is built.
    pub fn cache(&self) -> Option<CacheId> {
        self.cache
    }
}

/// What a cache node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// Mirrors a sample point.
    Original,
    /// Weight rose through the solid threshold.
    BlockStart,
    /// Weight fell through the blank threshold.
    BlockEnd,
    /// Extra sample for smoother rendering.
    Visual,
    /// A dash begins.
    DashStart,
    /// A dash ends.
    DashEnd,
}

/// One node of the render cache chain.
#[derive(Debug, Clone)]
pub struct CacheNode {
    pub kind: CacheKind,
    /// Back-reference to the mirrored sample; only set for `Original` nodes.
    pub original: Option<PointId>,
    /// Offset within the segment that starts at the previous original node.
    pub bt: f64,
    pub p: Vec2,
    pub weight: f64,
    /// Author intent: false inside a blockout.
    pub on: bool,
    /// Visibility of the span from this node to the next after dashing.
    pub dashon: PointState,
    prev: Option<CacheId>,
    next: Option<CacheId>,
}

impl CacheNode {
    pub fn prev(&self) -> Option<CacheId> {
        self.prev
    }

    pub fn next(&self) -> Option<CacheId> {
        self.next
    }

    pub fn is_original(&self) -> bool {
        self.kind == CacheKind::Original
    }

    /// Whether the span starting at this node is drawn.
    pub fn is_visible(&self) -> bool {
        self.on && self.dashon.is_on()
    }
}

#[derive(Debug, Clone)]
struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    fn insert(&mut self, value: T) -> usize {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(value);
            index
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        }
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take();
        if value.is_some() {
            self.free.push(index);
        }
        value
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free.push(index);
            }
        }
    }
}

/// One generated line: a sample chain plus its render cache.
#[derive(Debug, Clone, Default)]
pub struct Line {
    points: Arena<LinePoint>,
    head: Option<PointId>,
    tail: Option<PointId>,
    cache: Arena<CacheNode>,
    cache_head: Option<CacheId>,
    cache_tail: Option<CacheId>,
    cache_stale: bool,
    closed: bool,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a line from `(s, t, weight, state)` records in order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64, f64, PointState)>,
    {
        let mut line = Line::new();
        for (s, t, weight, on) in records {
            line.push_point(LinePoint::new(s, t, weight).with_state(on));
        }
        line
    }

    /// A closed line's last sample coincides with its first. Handles reach
    /// across that seam and the dash engine keeps its phase through it.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    // -------------------------------------------------------------------------
    // Sample chain
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.points.live()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<PointId> {
        self.head
    }

    pub fn tail(&self) -> Option<PointId> {
        self.tail
    }

    pub fn point(&self, id: PointId) -> Option<&LinePoint> {
        self.points.get(id.0)
    }

    /// Mutable access to a sample. Position edits should go through
    /// [`Line::move_point`] so the sync flag is kept honest.
    pub fn point_mut(&mut self, id: PointId) -> Option<&mut LinePoint> {
        self.points.get_mut(id.0)
    }

    /// Append a sample at the end of the chain.
    pub fn push_point(&mut self, mut point: LinePoint) -> PointId {
        point.prev = self.tail;
        point.next = None;
        point.cache = None;
        let id = PointId(self.points.insert(point));
        match self.tail {
            Some(tail) => {
                if let Some(t) = self.points.get_mut(tail.0) {
                    t.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.cache_stale = true;
        id
    }

    /// Splice a sample in after `after`.
    pub fn insert_point_after(&mut self, after: PointId, mut point: LinePoint) -> Option<PointId> {
        let next = self.points.get(after.0)?.next;
        point.prev = Some(after);
        point.next = next;
        point.cache = None;
        let id = PointId(self.points.insert(point));
        if let Some(a) = self.points.get_mut(after.0) {
            a.next = Some(id);
        }
        match next {
            Some(n) => {
                if let Some(np) = self.points.get_mut(n.0) {
                    np.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.cache_stale = true;
        Some(id)
    }

    /// Detach and drop one sample, clearing the cache node that mirrored it.
    pub fn remove_point(&mut self, id: PointId) -> Option<LinePoint> {
        let point = self.points.remove(id.0)?;
        match point.prev {
            Some(p) => {
                if let Some(pp) = self.points.get_mut(p.0) {
                    pp.next = point.next;
                }
            }
            None => self.head = point.next,
        }
        match point.next {
            Some(n) => {
                if let Some(np) = self.points.get_mut(n.0) {
                    np.prev = point.prev;
                }
            }
            None => self.tail = point.prev,
        }
        if let Some(c) = point.cache {
            if let Some(node) = self.cache.get_mut(c.0) {
                node.original = None;
            }
        }
        self.cache_stale = true;
        Some(point)
    }

    pub fn next_point(&self, id: PointId) -> Option<PointId> {
        self.point(id).and_then(|p| p.next)
    }

    pub fn prev_point(&self, id: PointId) -> Option<PointId> {
        self.point(id).and_then(|p| p.prev)
    }

    /// Sample ids from head to tail.
    pub fn point_ids(&self) -> PointIds<'_> {
        PointIds {
            line: self,
            cur: self.head,
        }
    }

    /// Samples from head to tail.
    pub fn points(&self) -> impl Iterator<Item = &LinePoint> + '_ {
        self.point_ids().filter_map(move |id| self.point(id))
    }

    /// `(s, t, weight, state)` records from head to tail.
    pub fn records(&self) -> Vec<(f64, f64, f64, PointState)> {
        self.points().map(|p| (p.s, p.t, p.weight, p.on)).collect()
    }

    /// Move a sample in object space; `(s,t)` follows on the next sync.
    pub fn move_point(&mut self, id: PointId, p: Vec2) -> bool {
        match self.points.get_mut(id.0) {
            Some(point) => {
                point.p = p;
                point.needtosync = SyncState::ParamFromPoint;
                self.cache_stale = true;
                true
            }
            None => false,
        }
    }

    /// Resolve every dirty sample against the surface and refresh handles
    /// and segment lengths.
    pub fn sync(&mut self, surface: &dyn Surface) {
        let ids: Vec<PointId> = self.point_ids().collect();
        let mut changed = false;
        for id in &ids {
            let Some(point) = self.points.get_mut(id.0) else {
                continue;
            };
            match point.needtosync {
                SyncState::Synced => {}
                SyncState::PointFromParam => {
                    point.p = surface.point(point.s, point.t);
                    changed = true;
                }
                SyncState::ParamFromPoint => {
                    match surface.inverse(point.p) {
                        Some(st) if st.is_finite() => {
                            point.s = st.x;
                            point.t = st.y;
                        }
                        _ => point.p = surface.point(point.s, point.t),
                    }
                    changed = true;
                }
            }
            point.needtosync = SyncState::Synced;
        }
        self.update_bez_handles();
        if changed {
            self.cache_stale = true;
        }
    }

    /// Recompute Catmull-Rom style handles and segment arc lengths.
    pub fn update_bez_handles(&mut self) {
        let ids: Vec<PointId> = self.point_ids().collect();
        let positions: Vec<Vec2> = ids
            .iter()
            .filter_map(|id| self.point(*id).map(|p| p.p))
            .collect();
        let n = positions.len();
        // A closed ring repeats its head at the tail; handles reach across.
        let wraps = self.closed && n > 2 && positions[0].distance(positions[n - 1]) <= EPSILON;
        for (i, id) in ids.iter().enumerate() {
            let here = positions[i];
            let before = match i {
                0 if wraps => positions[n - 2],
                0 => here,
                _ => positions[i - 1],
            };
            let after = match i {
                _ if i + 1 < n => positions[i + 1],
                _ if wraps => positions[1],
                _ => here,
            };
            let tangent = (after - before) / 6.0;
            if let Some(point) = self.points.get_mut(id.0) {
                point.bez_before = here - tangent;
                point.bez_after = here + tangent;
            }
        }
        for i in 0..n {
            let length = if i + 1 < n {
                let (a, b) = (ids[i], ids[i + 1]);
                match (self.point(a), self.point(b)) {
                    (Some(pa), Some(pb)) => {
                        segment_curve(pa, pb).approximate_length(LENGTH_TOLERANCE)
                    }
                    _ => 0.0,
                }
            } else {
                0.0
            };
            if let Some(point) = self.points.get_mut(ids[i].0) {
                point.length = length;
            }
        }
    }

    /// Position on the segment starting at `id`, at fraction `bt`.
    pub fn segment_point(&self, id: PointId, bt: f64) -> Option<Vec2> {
        let a = self.point(id)?;
        let Some(b) = a.next.and_then(|n| self.point(n)) else {
            return Some(a.p);
        };
        Some(segment_curve(a, b).sample(bt.clamp(0.0, 1.0)).into())
    }

    /// Weight on the segment starting at `id`, at fraction `bt`.
    pub fn segment_weight(&self, id: PointId, bt: f64) -> Option<f64> {
        let a = self.point(id)?;
        let wb = a
            .next
            .and_then(|n| self.point(n))
            .map_or(a.weight, |b| b.weight);
        Some(lerp(a.weight, wb, bt.clamp(0.0, 1.0)))
    }

    /// Total object-space arc length.
    pub fn length(&self) -> f64 {
        self.points().map(|p| p.length).sum()
    }

    // -------------------------------------------------------------------------
    // Cache chain
    // -------------------------------------------------------------------------

    pub fn cache_head(&self) -> Option<CacheId> {
        self.cache_head
    }

    pub fn cache_tail(&self) -> Option<CacheId> {
        self.cache_tail
    }

    pub fn cache_node(&self, id: CacheId) -> Option<&CacheNode> {
        self.cache.get(id.0)
    }

    pub fn cache_node_mut(&mut self, id: CacheId) -> Option<&mut CacheNode> {
        self.cache.get_mut(id.0)
    }

    /// Cache nodes from head to tail.
    pub fn cache_nodes(&self) -> CacheNodes<'_> {
        CacheNodes {
            line: self,
            cur: self.cache_head,
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.live()
    }

    /// Number of arena slots ever allocated for cache nodes.
    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Count of nodes that are not mirrors of sample points.
    pub fn inserted_node_count(&self) -> usize {
        self.cache_nodes().filter(|n| !n.is_original()).count()
    }

    /// Whether the cache must be rebuilt before use.
    pub fn needs_baseline(&self) -> bool {
        if self.cache_stale {
            return true;
        }
        if self.is_empty() {
            return self.cache_head.is_some();
        }
        self.points()
            .any(|p| match p.cache.and_then(|c| self.cache_node(c)) {
                Some(node) => node.original.is_none(),
                None => true,
            })
    }

    /// Rebuild the cache as a one-to-one mirror of the sample chain.
    pub fn baseline_cache(&mut self) {
        self.cache.clear();
        self.cache_head = None;
        self.cache_tail = None;

        let ids: Vec<PointId> = self.point_ids().collect();
        let mut prev: Option<CacheId> = None;
        for id in ids {
            let Some(point) = self.points.get(id.0) else {
                continue;
            };
            let node = CacheNode {
                kind: CacheKind::Original,
                original: Some(id),
                bt: 0.0,
                p: point.p,
                weight: point.weight,
                on: !point.is_blocked(),
                dashon: PointState::On,
                prev,
                next: None,
            };
            let cid = CacheId(self.cache.insert(node));
            if let Some(p) = prev {
                if let Some(pn) = self.cache.get_mut(p.0) {
                    pn.next = Some(cid);
                }
            } else {
                self.cache_head = Some(cid);
            }
            if let Some(point) = self.points.get_mut(id.0) {
                point.cache = Some(cid);
            }
            prev = Some(cid);
        }
        self.cache_tail = prev;
        self.cache_stale = false;
    }

    /// Rebaseline if the cache is missing or stale.
    pub fn ensure_cache(&mut self) {
        if self.needs_baseline() {
            self.baseline_cache();
        }
    }

    /// Remove every non-original node and reset originals to their samples.
    pub fn strip_dashes(&mut self) {
        if self.needs_baseline() {
            self.baseline_cache();
            return;
        }
        let mut cur = self.cache_head;
        while let Some(id) = cur {
            let next = self.cache_node(id).and_then(|n| n.next);
            let is_original = self.cache_node(id).is_some_and(CacheNode::is_original);
            if is_original {
                let sample = self
                    .cache_node(id)
                    .and_then(|n| n.original)
                    .and_then(|o| self.point(o))
                    .map(|p| (p.p, p.weight, !p.is_blocked()));
                if let (Some((p, weight, on)), Some(node)) = (sample, self.cache.get_mut(id.0)) {
                    node.p = p;
                    node.weight = weight;
                    node.on = on;
                    node.dashon = PointState::On;
                    node.bt = 0.0;
                }
            } else {
                self.detach(id);
            }
            cur = next;
        }
    }

    /// Walk backward from `from` (inclusive) to the nearest original node.
    pub fn prev_original(&self, from: CacheId) -> Option<CacheId> {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let node = self.cache_node(id)?;
            if node.is_original() {
                return Some(id);
            }
            cur = node.prev;
        }
        None
    }

    /// Walk forward from the node after `from` to the next original node.
    pub fn next_original(&self, from: CacheId) -> Option<CacheId> {
        let mut cur = self.cache_node(from)?.next;
        while let Some(id) = cur {
            let node = self.cache_node(id)?;
            if node.is_original() {
                return Some(id);
            }
            cur = node.next;
        }
        None
    }

    /// Insert a node at offset `bt` measured from the original node at or
    /// before `from`.
    ///
    /// Values of `bt >= 1` step over whole segments. The splice point is
    /// found by walking forward from `from` past nodes with a smaller offset.
    pub fn insert_after(&mut self, from: CacheId, bt: f64, kind: CacheKind) -> Option<CacheId> {
        let mut origin = self.prev_original(from)?;
        let mut bt = bt.max(0.0);
        let mut cursor = from;
        while bt >= 1.0 {
            match self.next_original(origin) {
                Some(next) => {
                    let has_following = self
                        .cache_node(next)
                        .and_then(|n| n.original)
                        .and_then(|o| self.point(o))
                        .is_some_and(|p| p.next.is_some());
                    if !has_following {
                        bt = 1.0;
                        break;
                    }
                    origin = next;
                    cursor = next;
                    bt -= 1.0;
                }
                None => {
                    bt = 1.0;
                    break;
                }
            }
        }
        if bt >= 1.0 {
            bt = 1.0 - EPSILON;
        }
        if self.prev_original(cursor) != Some(origin) {
            cursor = origin;
        }
        if cursor != origin && self.cache_node(cursor).is_some_and(|n| n.bt > bt) {
            cursor = origin;
        }

        loop {
            let Some(next) = self.cache_node(cursor).and_then(|n| n.next) else {
                break;
            };
            match self.cache_node(next) {
                Some(n) if !n.is_original() && n.bt <= bt => cursor = next,
                _ => break,
            }
        }

        let sample = self.cache_node(origin).and_then(|n| n.original)?;
        let p = self.segment_point(sample, bt)?;
        let weight = self.segment_weight(sample, bt)?;
        let (on, dashon) = self
            .cache_node(cursor)
            .map_or((true, PointState::On), |n| (n.on, n.dashon));
        let next = self.cache_node(cursor).and_then(|n| n.next);

        let node = CacheNode {
            kind,
            original: None,
            bt,
            p,
            weight,
            on,
            dashon,
            prev: Some(cursor),
            next,
        };
        let id = CacheId(self.cache.insert(node));
        if let Some(c) = self.cache.get_mut(cursor.0) {
            c.next = Some(id);
        }
        match next {
            Some(n) => {
                if let Some(nn) = self.cache.get_mut(n.0) {
                    nn.prev = Some(id);
                }
            }
            None => self.cache_tail = Some(id),
        }
        Some(id)
    }

    /// Unlink a non-original node and return its slot to the free list.
    pub fn detach(&mut self, id: CacheId) -> bool {
        if self.cache_node(id).is_none_or(CacheNode::is_original) {
            return false;
        }
        let Some(node) = self.cache.remove(id.0) else {
            return false;
        };
        match node.prev {
            Some(p) => {
                if let Some(pn) = self.cache.get_mut(p.0) {
                    pn.next = node.next;
                }
            }
            None => self.cache_head = node.next,
        }
        match node.next {
            Some(n) => {
                if let Some(nn) = self.cache.get_mut(n.0) {
                    nn.prev = node.prev;
                }
            }
            None => self.cache_tail = node.prev,
        }
        true
    }

    /// Insert visual sample nodes so no cache span is longer than `max_span`
    /// object units. Spans are bisected until they fit.
    pub fn refine_cache(&mut self, max_span: f64) -> usize {
        if max_span.is_nan() || max_span <= EPSILON {
            return 0;
        }
        self.ensure_cache();
        let mut inserted = 0;
        let mut cur = self.cache_head;
        while let Some(id) = cur {
            let Some(node) = self.cache_node(id) else {
                break;
            };
            let Some(next_id) = node.next else {
                break;
            };
            let Some(next) = self.cache_node(next_id) else {
                break;
            };
            let start_bt = node.bt;
            let end_bt = if next.is_original() { 1.0 } else { next.bt };
            let too_long = node.p.distance(next.p) > max_span;
            if too_long && end_bt - start_bt > 1e-6 {
                let weight = 0.5 * (node.weight + next.weight);
                let bt = 0.5 * (start_bt + end_bt);
                if let Some(v) = self.insert_after(id, bt, CacheKind::Visual) {
                    if let Some(vn) = self.cache_node_mut(v) {
                        vn.weight = weight;
                    }
                    inserted += 1;
                    continue;
                }
            }
            cur = Some(next_id);
        }
        inserted
    }
}

/// Iterator over sample ids in chain order.
pub struct PointIds<'a> {
    line: &'a Line,
    cur: Option<PointId>,
}

impl Iterator for PointIds<'_> {
    type Item = PointId;

    fn next(&mut self) -> Option<PointId> {
        let id = self.cur?;
        self.cur = self.line.point(id).and_then(|p| p.next);
        Some(id)
    }
}

/// Iterator over cache nodes in chain order.
pub struct CacheNodes<'a> {
    line: &'a Line,
    cur: Option<CacheId>,
}

impl<'a> Iterator for CacheNodes<'a> {
    type Item = &'a CacheNode;

    fn next(&mut self) -> Option<&'a CacheNode> {
        let node = self.line.cache_node(self.cur?)?;
        self.cur = node.next;
        Some(node)
    }
}

pub(crate) fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        0.0
    }
}

/// Arc length tolerance in object units.
const LENGTH_TOLERANCE: f64 = 1e-6;

fn segment_curve(a: &LinePoint, b: &LinePoint) -> CubicBezierSegment<f64> {
    CubicBezierSegment {
        from: a.p.to_point(),
        ctrl1: a.bez_after.to_point(),
        ctrl2: b.bez_before.to_point(),
        to: b.p.to_point(),
    }
}
