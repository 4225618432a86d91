//! Perceptual elimination quantizer.
//!
//! Texels are fed one at a time. Each is either folded into a perceptually
//! identical color already in the working set (bumping its usage count) or
//! appended. [`NativePalettizer::reduce`] then eliminates colors until the
//! working set fits the budget:
//!
//! - every color looks for its nearest remaining neighbour;
//! - very close pairs collapse into whichever member is used more;
//! - other pairs are replaced by their usage weighted HSV midpoint.
//!
//! The final palette keeps the working set order.

use crate::hsv::{Hsva, COLLAPSE, DEDUPLICATE};
use crate::palette::Palette;
use rwtex_common::color_8888::Color8888;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Entry {
    color: Color8888,
    hsv: Hsva,
    usage: u32,
}

impl Entry {
    fn new(color: Color8888, usage: u32) -> Self {
        Self {
            color,
            hsv: Hsva::from_color(color),
            usage,
        }
    }
}

/// Builds a palette by feeding texels and eliminating colors.
#[derive(Debug, Clone, Default)]
pub struct NativePalettizer {
    entries: Vec<Entry>,
    /// Exact color to working set slot, valid until the next reduction.
    exact: HashMap<Color8888, usize>,
}

impl NativePalettizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of colors in the working set.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds one texel to the working set and returns its slot.
    pub fn feed_color(&mut self, color: Color8888) -> usize {
        if let Some(&slot) = self.exact.get(&color) {
            self.entries[slot].usage += 1;
            return slot;
        }

        let hsv = Hsva::from_color(color);
        let slot = match self
            .entries
            .iter()
            .position(|entry| entry.hsv.matches(&hsv, DEDUPLICATE))
        {
            Some(slot) => {
                self.entries[slot].usage += 1;
                slot
            }
            None => {
                self.entries.push(Entry {
                    color,
                    hsv,
                    usage: 1,
                });
                self.entries.len() - 1
            }
        };
        self.exact.insert(color, slot);
        slot
    }

    /// Nearest other live entry to `index`.
    fn nearest_neighbour(&self, index: usize, alive: &[bool]) -> Option<(usize, f32)> {
        let origin = &self.entries[index].hsv;
        let mut best: Option<(usize, f32)> = None;
        for (other, entry) in self.entries.iter().enumerate() {
            if other == index || !alive[other] {
                continue;
            }
            let distance = origin.distance(&entry.hsv);
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((other, distance)),
            }
        }
        best
    }

    /// Eliminates colors until at most `max_colors` remain.
    pub fn reduce(&mut self, max_colors: usize) {
        let max_colors = max_colors.max(1);
        if self.entries.len() <= max_colors {
            return;
        }
        tracing::debug!(
            colors = self.entries.len(),
            max_colors,
            "reducing palette working set"
        );
        self.exact.clear();

        let mut remaining = self.entries.len();
        while remaining > max_colors {
            let mut alive = vec![true; self.entries.len()];
            for index in 0..self.entries.len() {
                if remaining <= max_colors {
                    break;
                }
                if !alive[index] {
                    continue;
                }
                let Some((other, _)) = self.nearest_neighbour(index, &alive) else {
                    break;
                };

                let a = self.entries[index];
                let b = self.entries[other];
                let merged = if a.hsv.matches(&b.hsv, COLLAPSE) {
                    let winner = if b.usage > a.usage { b } else { a };
                    Entry {
                        usage: a.usage + b.usage,
                        ..winner
                    }
                } else {
                    let hsv = a.hsv.weighted_midpoint(a.usage, &b.hsv, b.usage);
                    Entry {
                        color: hsv.to_color(),
                        hsv,
                        usage: a.usage + b.usage,
                    }
                };

                self.entries[index] = merged;
                alive[other] = false;
                remaining -= 1;
            }

            let mut slot = 0;
            self.entries.retain(|_| {
                let keep = alive[slot];
                slot += 1;
                keep
            });
        }

        tracing::debug!(colors = self.entries.len(), "palette reduced");
    }

    /// Index of the working set color nearest to `color`, by linear search.
    pub fn closest_link(&self, color: Color8888) -> usize {
        let target = Hsva::from_color(color);
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.color == color {
                return index;
            }
            let distance = entry.hsv.distance(&target);
            if distance < best_distance {
                best_distance = distance;
                best = index;
            }
        }
        best
    }

    /// Usage count of the color at `index`.
    pub fn usage(&self, index: usize) -> Option<u32> {
        self.entries.get(index).map(|entry| entry.usage)
    }

    /// The working set as a palette, in working set order.
    pub fn palette(&self) -> Palette {
        Palette::new(self.entries.iter().map(|entry| entry.color).collect())
    }

    /// Builds a palettizer from existing palette colors, each with a usage of one.
    pub fn from_palette(palette: &Palette) -> Self {
        let entries: Vec<Entry> = palette.colors.iter().map(|&c| Entry::new(c, 1)).collect();
        let exact = entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (entry.color, slot))
            .collect();
        Self { entries, exact }
    }
}
