use core::mem;

use log::debug;

use crate::{error::Result, Links, NodeId, SENTINEL};

// Node storage for a single tree.
//
// Slot 0 always holds the sentinel. Every other slot is either occupied by a live node or vacant;
// vacant slots form a singly linked free list threaded through `Slot::Vacant`, terminated by
// `SENTINEL`. Links are indices into `nodes`, so restructuring the tree never moves a slot.
pub(crate) struct Arena<K> {
    nodes: Vec<Node<K>>,
    free: NodeId,
    len: usize,
}

struct Node<K> {
    links: Links,
    slot: Slot<K>,
}

enum Slot<K> {
    Sentinel,
    Occupied(K),
    Vacant { next_free: NodeId },
}

impl<K> Node<K> {
    fn sentinel() -> Node<K> {
        Node {
            links: Links::sentinel(),
            slot: Slot::Sentinel,
        }
    }
}

impl<K> Arena<K> {
    pub(crate) fn new() -> Arena<K> {
        Self::with_capacity(0)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Arena<K> {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node::sentinel());

        Arena {
            nodes,
            free: SENTINEL,
            len: 0,
        }
    }

    /// Number of live (non-sentinel) nodes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    // Released slots waiting on the free list.
    fn vacant(&self) -> usize {
        self.nodes.len() - 1 - self.len
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        if let Some(extra) = additional.checked_sub(self.vacant()) {
            self.nodes.reserve(extra);
        }
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<()> {
        if let Some(extra) = additional.checked_sub(self.vacant()) {
            if let Err(e) = self.nodes.try_reserve(extra) {
                debug!("failed to reserve {extra} node slots ({} live): {e}", self.len);
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Stores `key` in a fresh node: RED, with both children and the parent set to the sentinel.
    pub(crate) fn acquire(&mut self, key: K) -> NodeId {
        let node = Node {
            links: Links::new(),
            slot: Slot::Occupied(key),
        };

        self.len += 1;

        if self.free == SENTINEL {
            let id = NodeId(self.nodes.len());
            self.nodes.push(node);
            return id;
        }

        let id = self.free;
        let vacant = mem::replace(&mut self.nodes[id.0], node);
        match vacant.slot {
            Slot::Vacant { next_free } => self.free = next_free,
            _ => unreachable!("free list points at a non-vacant slot"),
        }

        id
    }

    /// Like [`acquire`](Self::acquire), but reports allocation failure instead of aborting.
    pub(crate) fn try_acquire(&mut self, key: K) -> Result<NodeId> {
        self.try_reserve(1)?;
        Ok(self.acquire(key))
    }

    /// Returns the slot of `id` to the free list and hands back its key.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live node.
    pub(crate) fn release(&mut self, id: NodeId) -> K {
        assert!(self.is_live(id), "{id:?} is not a live node");

        let vacant = Node {
            links: Links::sentinel(),
            slot: Slot::Vacant {
                next_free: self.free,
            },
        };

        let old = mem::replace(&mut self.nodes[id.0], vacant);
        self.free = id;
        self.len -= 1;

        match old.slot {
            Slot::Occupied(key) => key,
            _ => unreachable!(),
        }
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id.0),
            Some(Node {
                slot: Slot::Occupied(_),
                ..
            })
        )
    }

    #[inline]
    pub(crate) fn links(&self, id: NodeId) -> &Links {
        &self.nodes[id.0].links
    }

    #[inline]
    pub(crate) fn links_mut(&mut self, id: NodeId) -> &mut Links {
        &mut self.nodes[id.0].links
    }

    /// Returns the key stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the sentinel or a released slot.
    #[inline]
    pub(crate) fn key(&self, id: NodeId) -> &K {
        match &self.nodes[id.0].slot {
            Slot::Occupied(key) => key,
            Slot::Sentinel => panic!("the sentinel has no key"),
            Slot::Vacant { .. } => panic!("{id:?} is not a live node"),
        }
    }

    /// Releases every node, keeping only the sentinel.
    pub(crate) fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[SENTINEL.0].links = Links::sentinel();
        self.free = SENTINEL;
        self.len = 0;
    }
}
