use crate::rig::NodeIndex;

/// Per-node inclusion mask for pose application.
///
/// One flag per rig node, indexed like the rig arena. Clip application
/// skips every node whose flag is `false`; the additive blend mode uses a
/// mask/inverse pair derived from a split node so two clips can drive
/// disjoint halves of the skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMask {
    bits: Vec<bool>,
}

impl NodeMask {
    /// Creates a mask including all `count` nodes.
    #[must_use]
    pub fn all(count: usize) -> Self {
        Self {
            bits: vec![true; count],
        }
    }

    /// Creates a mask excluding all `count` nodes.
    #[must_use]
    pub fn none(count: usize) -> Self {
        Self {
            bits: vec![false; count],
        }
    }

    /// Number of nodes the mask covers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether the node at `index` is included.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.bits[index]
    }

    /// Includes or excludes the node at `index`.
    #[inline]
    pub fn set(&mut self, index: NodeIndex, included: bool) {
        self.bits[index] = included;
    }

    /// Sets every flag to `included`.
    pub fn fill(&mut self, included: bool) {
        self.bits.fill(included);
    }

    /// Returns the complement mask.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            bits: self.bits.iter().map(|&b| !b).collect(),
        }
    }

    /// Number of included nodes.
    #[must_use]
    pub fn included_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_is_complement() {
        let mut mask = NodeMask::all(4);
        mask.set(2, false);
        let inv = mask.inverted();
        for i in 0..4 {
            assert_ne!(mask.contains(i), inv.contains(i));
        }
        assert_eq!(inv.included_count(), 1);
    }
}
