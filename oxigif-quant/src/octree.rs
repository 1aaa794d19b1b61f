//! Octree colour quantization.
//!
//! Every opaque pixel is inserted into an 8-ary tree. At level `l` the child
//! is chosen by bit `7 - l` of red, green and blue. Leaves sit at depth
//! `max_colour_bits` and accumulate colour sums and pixel counts. While there
//! are more leaves than wanted, the deepest reducible node is folded into a
//! single leaf. Each remaining leaf becomes one palette entry (the average of
//! its pixels), and fully transparent pixels map to a reserved slot after the
//! colours.

use crate::error::QuantError;
use crate::{ColourQuantizer, Quantized, Result, map_pixels};
use oxigif_core::{Colour, nearest_colour_index};

/// Deepest tree supported (one level per bit of a channel).
pub const MAX_DEPTH: u8 = 8;

#[derive(Debug, Clone, Default)]
struct Node {
    leaf: bool,
    pixel_count: u64,
    red: u64,
    green: u64,
    blue: u64,
    children: [Option<usize>; 8],
    palette_index: u8,
    next_reducible: Option<usize>,
}

/// The colour tree built from a set of pixels.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<Node>,
    /// Per-level singly linked lists of non-leaf nodes.
    reducible: [Option<usize>; MAX_DEPTH as usize],
    leaf_count: usize,
    max_colour_bits: u8,
}

#[inline]
fn child_index(colour: &Colour, level: u8) -> usize {
    let shift = 7 - level;
    ((((colour.r >> shift) & 1) << 2) | (((colour.g >> shift) & 1) << 1) | ((colour.b >> shift) & 1))
        as usize
}

impl Octree {
    /// An empty tree with leaves at depth `max_colour_bits` (1 to 8).
    pub fn new(max_colour_bits: u8) -> Result<Self> {
        if !(1..=MAX_DEPTH).contains(&max_colour_bits) {
            return Err(QuantError::InvalidColourBits(max_colour_bits));
        }
        let mut tree = Self {
            nodes: Vec::new(),
            reducible: [None; MAX_DEPTH as usize],
            leaf_count: 0,
            max_colour_bits,
        };
        tree.new_node(0);
        Ok(tree)
    }

    fn new_node(&mut self, level: u8) -> usize {
        let id = self.nodes.len();
        let leaf = level == self.max_colour_bits;
        let mut node = Node {
            leaf,
            ..Node::default()
        };
        if leaf {
            self.leaf_count += 1;
        } else {
            node.next_reducible = self.reducible[level as usize];
            self.reducible[level as usize] = Some(id);
        }
        self.nodes.push(node);
        id
    }

    /// Number of leaves (palette colours) currently in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Add one pixel's colour.
    pub fn add_colour(&mut self, colour: &Colour) {
        let mut id = 0;
        let mut level = 0u8;
        while !self.nodes[id].leaf {
            let slot = child_index(colour, level);
            id = match self.nodes[id].children[slot] {
                Some(child) => child,
                None => {
                    let child = self.new_node(level + 1);
                    self.nodes[id].children[slot] = Some(child);
                    child
                }
            };
            level += 1;
        }
        let node = &mut self.nodes[id];
        node.pixel_count += 1;
        node.red += colour.r as u64;
        node.green += colour.g as u64;
        node.blue += colour.b as u64;
    }

    /// Fold the deepest reducible node into a leaf. Returns `false` when
    /// nothing is left to reduce.
    fn reduce(&mut self) -> bool {
        let mut level = self.max_colour_bits as usize - 1;
        while level > 0 && self.reducible[level].is_none() {
            level -= 1;
        }
        let Some(id) = self.reducible[level] else {
            return false;
        };
        self.reducible[level] = self.nodes[id].next_reducible;

        let (mut red, mut green, mut blue, mut count, mut children) = (0, 0, 0, 0, 0);
        for child in self.nodes[id].children.iter().flatten() {
            let c = &self.nodes[*child];
            red += c.red;
            green += c.green;
            blue += c.blue;
            count += c.pixel_count;
            children += 1;
        }

        let node = &mut self.nodes[id];
        node.children = [None; 8];
        node.leaf = true;
        node.red += red;
        node.green += green;
        node.blue += blue;
        node.pixel_count += count;
        // The node itself becomes a leaf, replacing its children.
        self.leaf_count = self.leaf_count + 1 - children;
        true
    }

    /// Reduce to at most `max_colours` leaves and return their average
    /// colours. Leaf palette indices follow tree order.
    pub fn palette(&mut self, max_colours: usize) -> Vec<Colour> {
        while self.leaf_count > max_colours {
            if !self.reduce() {
                break;
            }
        }

        let mut palette = Vec::with_capacity(self.leaf_count);
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            if self.nodes[id].leaf {
                let node = &mut self.nodes[id];
                if node.pixel_count == 0 {
                    continue;
                }
                node.palette_index = palette.len() as u8;
                palette.push(Colour::rgb(
                    (node.red / node.pixel_count) as u8,
                    (node.green / node.pixel_count) as u8,
                    (node.blue / node.pixel_count) as u8,
                ));
            } else {
                stack.extend(self.nodes[id].children.iter().rev().flatten());
            }
        }
        palette
    }

    /// Palette index of the leaf `colour` falls into, if that path exists.
    pub fn leaf_index(&self, colour: &Colour) -> Option<u8> {
        let mut id = 0;
        let mut level = 0u8;
        while !self.nodes[id].leaf {
            id = self.nodes[id].children[child_index(colour, level)]?;
            level += 1;
        }
        Some(self.nodes[id].palette_index)
    }
}

/// [`ColourQuantizer`] backed by an [`Octree`].
#[derive(Debug, Clone, Copy)]
pub struct OctreeQuantizer {
    max_colours: usize,
    max_colour_bits: u8,
}

impl OctreeQuantizer {
    /// Create a quantizer producing at most `max_colours` (1 to 255)
    /// colours plus one transparent slot, with a tree `max_colour_bits`
    /// (1 to 8) deep.
    pub fn new(max_colours: usize, max_colour_bits: u8) -> Result<Self> {
        if !(1..=255).contains(&max_colours) {
            return Err(QuantError::InvalidMaxColours(max_colours));
        }
        if !(1..=MAX_DEPTH).contains(&max_colour_bits) {
            return Err(QuantError::InvalidColourBits(max_colour_bits));
        }
        Ok(Self {
            max_colours,
            max_colour_bits,
        })
    }

    /// Index reserved for fully transparent pixels.
    pub fn transparent_index(&self) -> u8 {
        self.max_colours as u8
    }
}

impl Default for OctreeQuantizer {
    fn default() -> Self {
        Self {
            max_colours: 255,
            max_colour_bits: MAX_DEPTH,
        }
    }
}

impl ColourQuantizer for OctreeQuantizer {
    fn quantize(&mut self, pixels: &[Colour]) -> Result<Quantized> {
        let mut tree = Octree::new(self.max_colour_bits)?;
        for pixel in pixels.iter().filter(|p| !p.is_transparent()) {
            tree.add_colour(pixel);
        }

        let colours = tree.palette(self.max_colours);
        tracing::debug!(
            pixels = pixels.len(),
            colours = colours.len(),
            "octree palette built"
        );

        let transparent = self.transparent_index();
        let indices = map_pixels(pixels, |p| {
            if p.is_transparent() {
                transparent
            } else {
                tree.leaf_index(p)
                    .or_else(|| nearest_colour_index(&colours, p).map(|i| i as u8))
                    .unwrap_or(0)
            }
        });

        let mut palette = colours;
        palette.resize(self.max_colours, Colour::BLACK);
        palette.push(Colour::TRANSPARENT);

        Ok(Quantized {
            palette,
            indices,
            transparent_index: Some(transparent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_limits() {
        assert!(OctreeQuantizer::new(0, 8).is_err());
        assert!(OctreeQuantizer::new(256, 8).is_err());
        assert!(OctreeQuantizer::new(255, 0).is_err());
        assert!(OctreeQuantizer::new(255, 9).is_err());
        assert!(OctreeQuantizer::new(1, 1).is_ok());
    }

    #[test]
    fn test_child_index() {
        let c = Colour::rgb(0x80, 0x00, 0x80);
        assert_eq!(child_index(&c, 0), 0b101);
        assert_eq!(child_index(&c, 1), 0);
        let c = Colour::rgb(0x01, 0x01, 0x00);
        assert_eq!(child_index(&c, 7), 0b110);
    }

    #[test]
    fn test_few_colours_exact() {
        let pixels = vec![
            Colour::rgb(255, 0, 0),
            Colour::rgb(0, 255, 0),
            Colour::rgb(0, 0, 255),
            Colour::rgb(255, 0, 0),
        ];
        let q = OctreeQuantizer::default().quantize(&pixels).unwrap();
        assert_eq!(q.palette.len(), 256);
        for (pixel, &index) in pixels.iter().zip(&q.indices) {
            assert_eq!(q.palette[index as usize], *pixel);
        }
        assert_eq!(q.indices[0], q.indices[3]);
    }

    #[test]
    fn test_reduces_to_target() {
        let pixels: Vec<Colour> = (0..4096u32)
            .map(|i| Colour::rgb((i & 0xF) as u8 * 16, ((i >> 4) & 0xF) as u8 * 16, (i >> 8) as u8 * 16))
            .collect();
        let mut tree = Octree::new(8).unwrap();
        for p in &pixels {
            tree.add_colour(p);
        }
        assert_eq!(tree.leaf_count(), 4096);
        let palette = tree.palette(64);
        assert!(palette.len() <= 64);
        assert!(!palette.is_empty());
        for p in &pixels {
            assert!((tree.leaf_index(p).unwrap() as usize) < palette.len());
        }
    }

    #[test]
    fn test_transparent_slot() {
        let pixels = vec![Colour::WHITE, Colour::TRANSPARENT, Colour::BLACK];
        let mut quantizer = OctreeQuantizer::new(15, 8).unwrap();
        let q = quantizer.quantize(&pixels).unwrap();
        assert_eq!(q.palette.len(), 16);
        assert_eq!(q.transparent_index, Some(15));
        assert_eq!(q.indices[1], 15);
        assert_eq!(q.palette[15], Colour::TRANSPARENT);
        assert_eq!(q.palette[q.indices[0] as usize], Colour::WHITE);
    }

    #[test]
    fn test_single_colour_target() {
        let pixels = vec![Colour::rgb(10, 20, 30), Colour::rgb(30, 40, 50)];
        let q = OctreeQuantizer::new(1, 8).unwrap().quantize(&pixels).unwrap();
        assert_eq!(q.palette.len(), 2);
        assert_eq!(q.indices, vec![0, 0]);
        assert_eq!(q.palette[0], Colour::rgb(20, 30, 40));
    }
}
