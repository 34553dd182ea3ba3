//! Traversal of singly-linked lists living in target memory.

use tracing::{debug, warn};

use crate::memory::ReadMemory;
use crate::memory::layout;
use crate::schema::NodeLayout;

/// Iterator over the record addresses of a linked list in target memory.
///
/// The walk ends normally at a null `next` pointer. It also stops, with a
/// warning, when a `next` pointer cannot be read or after `max_steps` nodes,
/// so a corrupt or self-referential chain cannot hang the caller. An
/// unreadable `entry` pointer skips only that node.
pub struct ListWalker<'a, R: ReadMemory + ?Sized> {
    reader: &'a R,
    layout: NodeLayout,
    next: u64,
    steps: usize,
    max_steps: usize,
    exclude_tail: bool,
}

impl<'a, R: ReadMemory + ?Sized> ListWalker<'a, R> {
    /// Walk a list whose dummy head node is embedded at `head`.
    ///
    /// The head itself is never yielded; the first visited node is
    /// `head.next`.
    pub fn after_head(reader: &'a R, head: u64, layout: NodeLayout) -> Self {
        let next = match reader.read_ptr(head + layout.next) {
            Ok(next) => next,
            Err(e) => {
                warn!("List head at {:#x} unreadable: {}", head, e);
                0
            }
        };
        Self::starting_at(reader, next, layout)
    }

    /// Walk a list whose first node is pointed to by the value at `slot`.
    pub fn from_pointer(reader: &'a R, slot: u64, layout: NodeLayout) -> Self {
        let first = match reader.read_ptr(slot) {
            Ok(first) => first,
            Err(e) => {
                warn!("List pointer at {:#x} unreadable: {}", slot, e);
                0
            }
        };
        Self::starting_at(reader, first, layout)
    }

    /// Walk a list starting at the node at `first` (0 = empty list).
    pub fn starting_at(reader: &'a R, first: u64, layout: NodeLayout) -> Self {
        Self {
            reader,
            layout,
            next: first,
            steps: 0,
            max_steps: layout::list::DEFAULT_MAX_STEPS,
            exclude_tail: false,
        }
    }

    /// Treat the last node (whose `next` is null) as a sentinel and skip it.
    pub fn exclude_tail(mut self) -> Self {
        self.exclude_tail = true;
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl<R: ReadMemory + ?Sized> Iterator for ListWalker<'_, R> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            let node = self.next;
            if node == 0 {
                return None;
            }

            if self.steps >= self.max_steps {
                warn!(
                    "List walk stopped after {} nodes at {:#x} (corrupt or cyclic chain?)",
                    self.steps, node
                );
                self.next = 0;
                return None;
            }
            self.steps += 1;

            let following = match self.reader.read_ptr(node + self.layout.next) {
                Ok(following) => following,
                Err(e) => {
                    warn!("List node at {:#x} unreadable: {}", node, e);
                    self.next = 0;
                    return None;
                }
            };

            if self.exclude_tail && following == 0 {
                self.next = 0;
                return None;
            }
            self.next = following;

            match self.layout.entry {
                None => return Some(node),
                Some(offset) => match self.reader.read_ptr(node + offset) {
                    Ok(entry) => return Some(entry),
                    Err(e) => {
                        debug!("Skipping list node {:#x}: entry unreadable: {}", node, e);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MockMemoryBuilder, MockMemoryReader};

    /// Chain of zList nodes at 0x1000, 0x1100, ... with entries 0xA000 + i.
    fn chain_reader(count: u64) -> MockMemoryReader {
        let mut builder = MockMemoryBuilder::new();
        for i in 0..count {
            let node = 0x1000 + i * 0x100;
            let next = if i + 1 < count { node + 0x100 } else { 0 };
            builder = builder.write_ptr(node, 0xA000 + i).write_ptr(node + 4, next);
        }
        builder.build()
    }

    #[test]
    fn test_visits_each_node_once() {
        let reader = chain_reader(5);
        let entries: Vec<u64> =
            ListWalker::starting_at(&reader, 0x1000, NodeLayout::ZLIST).collect();
        assert_eq!(entries, vec![0xA000, 0xA001, 0xA002, 0xA003, 0xA004]);
    }

    #[test]
    fn test_after_head_skips_dummy_head() {
        // Dummy head at 0x1000 whose entry is garbage; real nodes follow.
        let reader = chain_reader(4);
        let entries: Vec<u64> =
            ListWalker::after_head(&reader, 0x1000, NodeLayout::ZLIST).collect();
        assert_eq!(entries, vec![0xA001, 0xA002, 0xA003]);
    }

    #[test]
    fn test_empty_lists() {
        let reader = MockMemoryBuilder::new()
            .write_ptr(0x1000, 0)
            .write_ptr(0x1004, 0)
            .write_ptr(0x2000, 0)
            .build();

        assert_eq!(
            ListWalker::after_head(&reader, 0x1000, NodeLayout::ZLIST).count(),
            0
        );
        assert_eq!(
            ListWalker::from_pointer(&reader, 0x2000, NodeLayout::ZLIST).count(),
            0
        );
    }

    #[test]
    fn test_from_pointer() {
        let reader = MockMemoryBuilder::new()
            .write_ptr(0x500, 0x1000)
            .write_ptr(0x1000, 0xA000)
            .write_ptr(0x1004, 0x1100)
            .write_ptr(0x1100, 0xA001)
            .write_ptr(0x1104, 0)
            .build();
        let entries: Vec<u64> =
            ListWalker::from_pointer(&reader, 0x500, NodeLayout::ZLIST).collect();
        assert_eq!(entries, vec![0xA000, 0xA001]);
    }

    #[test]
    fn test_intrusive_exclude_tail() {
        // Records link directly through +0x4; the last one is a sentinel.
        let reader = MockMemoryBuilder::new()
            .write_ptr(0x3004, 0x3100)
            .write_ptr(0x3104, 0x3200)
            .write_ptr(0x3204, 0)
            .build();
        let layout = NodeLayout::intrusive(0x4);

        let nodes: Vec<u64> = ListWalker::starting_at(&reader, 0x3000, layout)
            .exclude_tail()
            .collect();
        assert_eq!(nodes, vec![0x3000, 0x3100]);
    }

    #[test]
    fn test_cycle_stops_at_max_steps() {
        let reader = MockMemoryBuilder::new()
            .write_ptr(0x1000, 0xA000)
            .write_ptr(0x1004, 0x1100)
            .write_ptr(0x1100, 0xA001)
            .write_ptr(0x1104, 0x1000)
            .build();
        let walked = ListWalker::starting_at(&reader, 0x1000, NodeLayout::ZLIST)
            .max_steps(10)
            .count();
        assert_eq!(walked, 10);
    }

    #[test]
    fn test_unreadable_next_ends_walk() {
        let reader = MockMemoryBuilder::new()
            .write_ptr(0x1000, 0xA000)
            .write_ptr(0x1004, 0x9000)
            .build();
        let entries: Vec<u64> =
            ListWalker::starting_at(&reader, 0x1000, NodeLayout::ZLIST).collect();
        assert_eq!(entries, vec![0xA000]);
    }

    #[test]
    fn test_unreadable_entry_skips_node() {
        let reader = MockMemoryBuilder::new()
            .write_ptr(0x1004, 0x1100)
            .write_ptr(0x1100, 0xA001)
            .write_ptr(0x1104, 0)
            .build();
        let entries: Vec<u64> =
            ListWalker::starting_at(&reader, 0x1000, NodeLayout::ZLIST).collect();
        assert_eq!(entries, vec![0xA001]);
    }
}
