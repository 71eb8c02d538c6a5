//! Arena-backed part chain.
//!
//! Descriptors are stored in insertion order and linked by slot index. The
//! head is the part the player is currently consuming; `next` walks forward
//! through the parts still to play, `previous` points back at the part the
//! head was reached from.

use crate::descriptor::PlaybackDescriptor;

/// Ordered playback descriptors with an active head.
#[derive(Debug, Clone, Default)]
pub struct PartChain {
    descriptors: Vec<PlaybackDescriptor>,
    head: Option<usize>,
}

impl PartChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every descriptor and the head.
    pub fn clear(&mut self) {
        self.descriptors.clear();
        self.head = None;
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Store `descriptor` and return its slot.
    pub(crate) fn push(&mut self, descriptor: PlaybackDescriptor) -> usize {
        self.descriptors.push(descriptor);
        self.descriptors.len() - 1
    }

    pub(crate) fn set_head(&mut self, slot: usize) {
        self.head = Some(slot);
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut PlaybackDescriptor> {
        self.descriptors.get_mut(slot)
    }

    pub fn get(&self, slot: usize) -> Option<&PlaybackDescriptor> {
        self.descriptors.get(slot)
    }

    pub fn head_slot(&self) -> Option<usize> {
        self.head
    }

    /// The descriptor the player is consuming.
    pub fn head(&self) -> Option<&PlaybackDescriptor> {
        self.head.and_then(|slot| self.descriptors.get(slot))
    }

    pub(crate) fn head_mut(&mut self) -> Option<&mut PlaybackDescriptor> {
        self.head.and_then(|slot| self.descriptors.get_mut(slot))
    }

    /// Descriptor following the head, if linked.
    pub fn next(&self) -> Option<&PlaybackDescriptor> {
        self.head().and_then(|head| head.next).and_then(|slot| self.get(slot))
    }

    /// Walk forward from the head along `next` links.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            slot: self.head,
        }
    }

    /// Whether a part follows the head.
    pub fn has_more_parts(&self) -> bool {
        self.head().is_some_and(|head| head.next.is_some())
    }

    /// Move the head to the next part.
    ///
    /// The new head remembers the old one as `previous`, and the consumed
    /// descriptor's `next` link is cleared. Returns `false` when there is no
    /// next part.
    pub fn advance(&mut self) -> bool {
        let Some(current) = self.head else {
            return false;
        };
        let Some(next) = self.descriptors.get(current).and_then(|d| d.next) else {
            return false;
        };

        if let Some(upcoming) = self.descriptors.get_mut(next) {
            upcoming.previous = Some(current);
        }
        if let Some(consumed) = self.descriptors.get_mut(current) {
            consumed.next = None;
        }
        self.head = Some(next);
        true
    }
}

/// Forward iterator over a [`PartChain`], starting at the head.
pub struct ChainIter<'a> {
    chain: &'a PartChain,
    slot: Option<usize>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a PlaybackDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let descriptor = self.chain.get(self.slot?)?;
        self.slot = descriptor.next;
        Some(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DirectStream, PartInfo, PartStream};

    fn descriptor(part_index: usize) -> PlaybackDescriptor {
        PlaybackDescriptor::new(
            PartInfo {
                part_index,
                ..PartInfo::default()
            },
            PartStream::Direct(DirectStream {
                url: format!("http://pms.local/parts/{part_index}"),
                format: "mp4".into(),
                switching_strategy: None,
                bitrates: vec![0],
                is_request_to_server: true,
                token: None,
                audio_language: None,
            }),
        )
    }

    fn linked(parts: usize) -> PartChain {
        let mut chain = PartChain::new();
        let mut prev = None;
        for i in 0..parts {
            let slot = chain.push(descriptor(i));
            match prev {
                None => chain.set_head(slot),
                Some(p) => chain.get_mut(p).unwrap().next = Some(slot),
            }
            prev = Some(slot);
        }
        chain
    }

    #[test]
    fn empty_chain() {
        let mut chain = PartChain::new();
        assert!(chain.is_empty());
        assert!(chain.head().is_none());
        assert!(!chain.has_more_parts());
        assert!(!chain.advance());
        assert_eq!(chain.iter().count(), 0);
    }

    #[test]
    fn iterates_from_head() {
        let chain = linked(3);
        let indices: Vec<usize> = chain.iter().map(|d| d.part_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(chain.next().unwrap().part_index(), 1);
    }

    #[test]
    fn advance_walks_to_the_end() {
        let mut chain = linked(3);
        assert!(chain.has_more_parts());

        assert!(chain.advance());
        let head = chain.head().unwrap();
        assert_eq!(head.part_index(), 1);
        assert_eq!(head.previous_slot(), Some(0));
        assert_eq!(chain.get(0).unwrap().next_slot(), None);

        assert!(chain.advance());
        assert_eq!(chain.head().unwrap().part_index(), 2);
        assert!(!chain.has_more_parts());
        assert!(!chain.advance());
        assert_eq!(chain.head().unwrap().part_index(), 2);
    }

    #[test]
    fn clear_drops_head() {
        let mut chain = linked(2);
        chain.clear();
        assert!(chain.is_empty());
        assert!(chain.head_slot().is_none());
    }
}
