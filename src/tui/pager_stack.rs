//! # Pager Stack
//!
//! The base layer of the screen: a [`WidgetStack`] of pagers plus the
//! parent → child relations created by spawn chords.
//!
//! ```text
//!   root ──(enter)──▶ details ──(d)──▶ diff
//!    │                  ▲
//!    └── slot (root, "enter") remembers `details`
//! ```
//!
//! When a child is popped while its parent is still on the stack, the
//! [`SpawnPolicy`] decides whether it is parked in its slot (so pressing the
//! spawn chord again brings the same instance back) or destroyed.

use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::config::SpawnPolicy;
use crate::core::context::Context;
use crate::core::key::KeySequence;
use crate::core::keymap::KeyOutcome;
use crate::tui::component::{Pager, Widget};
use crate::tui::stack::WidgetStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PagerId(u64);

struct Entry {
    id: PagerId,
    pager: Box<dyn Pager>,
}

impl Widget for Entry {
    fn set_area(&mut self, area: Rect) {
        self.pager.set_area(area);
    }

    fn render(&mut self, frame: &mut Frame) {
        self.pager.render(frame);
    }

    fn handle_keys(&mut self, keys: &KeySequence) -> KeyOutcome {
        self.pager.handle_keys(keys)
    }

    fn destroy(&mut self) {
        self.pager.destroy();
    }
}

struct ChildSlot {
    parent: PagerId,
    keys: KeySequence,
    child: PagerId,
    parked: Option<Box<dyn Pager>>,
}

pub struct PagerStack {
    stack: WidgetStack<Entry>,
    children: Vec<ChildSlot>,
    policy: SpawnPolicy,
    next_id: u64,
}

impl Default for PagerStack {
    fn default() -> Self {
        Self::new(SpawnPolicy::default())
    }
}

impl PagerStack {
    pub fn new(policy: SpawnPolicy) -> Self {
        Self {
            stack: WidgetStack::new(),
            children: Vec::new(),
            policy,
            next_id: 0,
        }
    }

    pub fn push(&mut self, pager: Box<dyn Pager>) -> PagerId {
        let id = PagerId(self.next_id);
        self.next_id += 1;
        info!("Push pager `{}` ({id:?})", pager.title());
        self.stack.push(Box::new(Entry { id, pager }));
        id
    }

    /// Pops the active pager. No-op on an empty stack; the caller decides
    /// what emptiness means.
    pub fn pop(&mut self) -> Option<PagerId> {
        let entry = self.stack.pop()?;
        let id = entry.id;
        info!("Pop pager `{}` ({id:?})", entry.pager.title());
        self.retire(*entry);
        Some(id)
    }

    /// Records `child` as spawned from `parent` by `keys` and pushes it.
    pub fn add_child(&mut self, parent: PagerId, child: Box<dyn Pager>, keys: KeySequence) -> PagerId {
        if let Some(index) = self.slot_index(parent, &keys) {
            let old = self.children.remove(index);
            if let Some(parked) = old.parked {
                debug!("Replacing parked child {:?} of {parent:?} for `{keys}`", old.child);
                self.destroy_pager(old.child, parked);
            }
        }
        let id = self.push(child);
        self.children.push(ChildSlot {
            parent,
            keys,
            child: id,
            parked: None,
        });
        id
    }

    /// Spawns a child of the active pager for `keys`, following the spawn
    /// policy. `make` only runs when a new pager is needed.
    pub fn descend(&mut self, keys: KeySequence, make: impl FnOnce() -> Box<dyn Pager>) -> Option<PagerId> {
        let Some(parent) = self.active_id() else {
            warn!("Descend `{keys}` with no active pager");
            return None;
        };

        if self.policy == SpawnPolicy::Reuse
            && let Some(index) = self.slot_index(parent, &keys)
            && let Some(pager) = self.children[index].parked.take()
        {
            let id = self.children[index].child;
            debug!("Reusing parked child {id:?} of {parent:?} for `{keys}`");
            self.stack.push(Box::new(Entry { id, pager }));
            return Some(id);
        }

        Some(self.add_child(parent, make(), keys))
    }

    /// The pager spawned from `parent` by `keys`, if one is recorded.
    pub fn child_of(&self, parent: PagerId, keys: &KeySequence) -> Option<PagerId> {
        self.slot_index(parent, keys).map(|i| self.children[i].child)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn active_id(&self) -> Option<PagerId> {
        self.stack.active().map(|entry| entry.id)
    }

    pub fn active(&self) -> Option<&dyn Pager> {
        self.stack.active().map(|entry| &*entry.pager)
    }

    pub fn active_context(&self) -> Context {
        self.active().map(Pager::context).unwrap_or_default()
    }

    pub fn active_modes(&self) -> Vec<String> {
        self.active().map(|pager| pager.modes().to_vec()).unwrap_or_default()
    }

    /// Titles bottom to top.
    pub fn titles(&self) -> Vec<String> {
        self.stack.iter().map(|entry| entry.pager.title().to_string()).collect()
    }

    pub fn set_area(&mut self, area: Rect) {
        self.stack.set_area(area);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.stack.render(frame);
    }

    /// Only the active pager sees keys.
    pub fn handle_keys(&mut self, keys: &KeySequence) -> KeyOutcome {
        match self.stack.active_mut() {
            Some(entry) => entry.handle_keys(keys),
            None => KeyOutcome::Unmatched,
        }
    }

    /// Destroys every pager top to bottom; each pager's parked children are
    /// destroyed right after it.
    pub fn destroy_all(&mut self) {
        while let Some(entry) = self.stack.pop() {
            self.destroy_pager(entry.id, entry.pager);
        }
        for slot in std::mem::take(&mut self.children) {
            if let Some(parked) = slot.parked {
                self.destroy_pager(slot.child, parked);
            }
        }
    }

    fn retire(&mut self, entry: Entry) {
        let parent_alive = |stack: &WidgetStack<Entry>, parent: PagerId| stack.iter().any(|e| e.id == parent);

        if self.policy == SpawnPolicy::Reuse
            && let Some(slot) = self.children.iter_mut().find(|slot| slot.child == entry.id)
            && parent_alive(&self.stack, slot.parent)
        {
            debug!("Parking {:?} under {:?}", entry.id, slot.parent);
            slot.parked = Some(entry.pager);
            return;
        }

        self.destroy_pager(entry.id, entry.pager);
    }

    fn destroy_pager(&mut self, id: PagerId, mut pager: Box<dyn Pager>) {
        debug!("Destroy pager `{}` ({id:?})", pager.title());
        pager.destroy();

        self.children.retain(|slot| slot.child != id);
        while let Some(index) = self.children.iter().position(|slot| slot.parent == id) {
            let slot = self.children.remove(index);
            if let Some(parked) = slot.parked {
                self.destroy_pager(slot.child, parked);
            }
        }
    }

    fn slot_index(&self, parent: PagerId, keys: &KeySequence) -> Option<usize> {
        self.children
            .iter()
            .position(|slot| slot.parent == parent && &slot.keys == keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Probe, ProbeLog};

    fn keys(chord: &str) -> KeySequence {
        chord.parse().unwrap()
    }

    fn probe(name: &str, log: &ProbeLog) -> Box<dyn Pager> {
        Box::new(Probe::new(name, log))
    }

    #[test]
    fn test_push_pop_order() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::default();
        let a = pagers.push(probe("a", &log));
        let b = pagers.push(probe("b", &log));
        assert_ne!(a, b);
        assert_eq!(pagers.active_id(), Some(b));

        assert_eq!(pagers.pop(), Some(b));
        assert_eq!(pagers.active_id(), Some(a));
        assert_eq!(pagers.pop(), Some(a));
        assert_eq!(pagers.pop(), None);
        assert_eq!(log.entries(), vec!["destroy:b", "destroy:a"]);
    }

    #[test]
    fn test_only_active_pager_handles_keys() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::default();
        pagers.push(Box::new(Probe::new("root", &log).bind("x")));
        pagers.push(probe("child", &log));

        assert_eq!(pagers.handle_keys(&keys("x")), KeyOutcome::Unmatched);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_reuse_policy_parks_and_restores_child() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::new(SpawnPolicy::Reuse);
        let root = pagers.push(probe("root", &log));

        let mut built = 0;
        let first = pagers
            .descend(keys("enter"), || {
                built += 1;
                probe("details", &log)
            })
            .unwrap();
        assert_eq!(pagers.child_of(root, &keys("enter")), Some(first));

        pagers.pop();
        assert_eq!(pagers.active_id(), Some(root));
        assert!(log.entries().is_empty(), "parked child must not be destroyed");

        let second = pagers
            .descend(keys("enter"), || {
                built += 1;
                probe("details", &log)
            })
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(built, 1);
        assert_eq!(pagers.len(), 2);
    }

    #[test]
    fn test_duplicate_policy_builds_fresh_child() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::new(SpawnPolicy::Duplicate);
        pagers.push(probe("root", &log));

        let first = pagers.descend(keys("enter"), || probe("details-1", &log)).unwrap();
        pagers.pop();
        assert_eq!(log.entries(), vec!["destroy:details-1"]);

        let second = pagers.descend(keys("enter"), || probe("details-2", &log)).unwrap();
        assert_ne!(first, second);
        assert_eq!(pagers.titles(), vec!["root", "details-2"]);
    }

    #[test]
    fn test_add_child_replaces_parked_slot() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::new(SpawnPolicy::Reuse);
        let root = pagers.push(probe("root", &log));
        pagers.add_child(root, probe("old", &log), keys("o"));
        pagers.pop();
        assert!(log.entries().is_empty());

        let new = pagers.add_child(root, probe("new", &log), keys("o"));
        assert_eq!(log.entries(), vec!["destroy:old"]);
        assert_eq!(pagers.child_of(root, &keys("o")), Some(new));
    }

    #[test]
    fn test_destroy_all_includes_parked_children() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::new(SpawnPolicy::Reuse);
        pagers.push(probe("root", &log));
        pagers.descend(keys("a"), || probe("parked", &log));
        pagers.pop();
        pagers.descend(keys("b"), || probe("top", &log));

        pagers.destroy_all();
        assert!(pagers.is_empty());
        assert_eq!(log.entries(), vec!["destroy:top", "destroy:root", "destroy:parked"]);
    }

    #[test]
    fn test_descend_without_pager_is_none() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::default();
        assert!(pagers.descend(keys("a"), || probe("x", &log)).is_none());
        assert!(pagers.is_empty());
    }

    #[test]
    fn test_active_context_and_modes() {
        let log = ProbeLog::default();
        let mut pagers = PagerStack::default();
        assert!(pagers.active_context().is_empty());
        pagers.push(Box::new(Probe::new("files", &log).with_mode("git")));
        assert_eq!(pagers.active_context().get("title"), Some("files"));
        assert_eq!(pagers.active_modes(), vec!["git".to_string()]);
    }
}
