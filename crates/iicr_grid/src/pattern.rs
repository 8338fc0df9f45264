use std::fmt;
use std::str::FromStr;
use log::debug;

use crate::GridError;
use crate::TimeGrid;

/// One run of merged intervals: `repeat` coarse intervals, each spanning
/// `size` fine intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub repeat: usize,
    pub size: usize,
}

/// A PSMC-style grouping pattern such as `"4+25*2+4+6"`.
///
/// Blocks are separated by `+`; a block is either `size` or
/// `repeat*size`, all positive integers. Applied to a [`TimeGrid`] the
/// pattern selects which fine boundaries survive as coarse boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingPattern(pub Vec<Block>);

impl GroupingPattern {
    /// Number of coarse intervals the pattern produces.
    pub fn number_of_blocks(&self) -> usize {
        self.0.iter().map(|b| b.repeat).sum()
    }

    /// Number of fine intervals consumed by the whole pattern.
    pub fn span(&self) -> usize {
        self.0.iter().map(|b| b.repeat * b.size).sum()
    }

    /// Cumulative grid offsets of all coarse boundaries (excluding 0).
    pub fn offsets(&self) -> Vec<usize> {
        let mut pos = 0;
        let mut offsets = Vec::with_capacity(self.number_of_blocks());
        for block in &self.0 {
            for _ in 0..block.repeat {
                pos += block.size;
                offsets.push(pos);
            }
        }
        offsets
    }
}

fn parse_count(token: &str, pattern: &str) -> Result<usize, GridError> {
    match token.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(GridError::InvalidPattern(format!(
            "'{}' is not a positive integer in '{}'", token.trim(), pattern))),
    }
}

impl FromStr for GroupingPattern {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(GridError::InvalidPattern("empty pattern".into()));
        }
        let mut blocks = Vec::new();
        for part in s.split('+') {
            let block = match part.split_once('*') {
                Some((repeat, size)) => Block {
                    repeat: parse_count(repeat, s)?,
                    size: parse_count(size, s)?,
                },
                None => Block {
                    repeat: 1,
                    size: parse_count(part, s)?,
                },
            };
            blocks.push(block);
        }
        Ok(GroupingPattern(blocks))
    }
}

impl fmt::Display for GroupingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|b| {
            if b.repeat == 1 {
                format!("{}", b.size)
            } else {
                format!("{}*{}", b.repeat, b.size)
            }
        }).collect();
        write!(f, "{}", parts.join("+"))
    }
}

impl TimeGrid {
    /// Merge adjacent intervals following `pattern`.
    ///
    /// The grid is extended by repeating its last point once, so a trailing
    /// block may end on the final boundary. The result starts with the first
    /// point and contains one boundary per block, i.e. it has
    /// `1 + pattern.number_of_blocks()` points. Explicit widths are not
    /// carried over.
    pub fn group(&self, pattern: &GroupingPattern) -> Result<TimeGrid, GridError> {
        let mut extended = self.times().to_vec();
        extended.push(self.last());

        let mut grouped = Vec::with_capacity(pattern.number_of_blocks() + 1);
        grouped.push(extended[0]);
        for offset in pattern.offsets() {
            let t = extended.get(offset).ok_or(GridError::PatternOverflow {
                offset,
                available: extended.len(),
            })?;
            grouped.push(*t);
        }
        debug!("Grouped {} points into {} with pattern {}", self.len(), grouped.len(), pattern);
        TimeGrid::try_from(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridKind;

    #[test]
    fn test_parse_pattern() {
        let p: GroupingPattern = "4+25*2+4+6".parse().unwrap();
        assert_eq!(p.0, vec![
            Block { repeat: 1, size: 4 },
            Block { repeat: 25, size: 2 },
            Block { repeat: 1, size: 4 },
            Block { repeat: 1, size: 6 },
        ]);
        assert_eq!(p.number_of_blocks(), 28);
        assert_eq!(p.span(), 64);
        assert_eq!(p.to_string(), "4+25*2+4+6");
    }

    #[test]
    fn test_parse_invalid_pattern() {
        assert!(matches!("".parse::<GroupingPattern>(), Err(GridError::InvalidPattern(_))));
        assert!(matches!("4+0".parse::<GroupingPattern>(), Err(GridError::InvalidPattern(_))));
        assert!(matches!("2*x".parse::<GroupingPattern>(), Err(GridError::InvalidPattern(_))));
        assert!(matches!("3++2".parse::<GroupingPattern>(), Err(GridError::InvalidPattern(_))));
    }

    #[test]
    fn test_offsets() {
        let p: GroupingPattern = "2*3+4".parse().unwrap();
        assert_eq!(p.offsets(), vec![3, 6, 10]);
    }

    #[test]
    fn test_group_grid() {
        let grid = TimeGrid::build(0.0, 10.0, 11, GridKind::Linear).unwrap();
        let p: GroupingPattern = "2*3+4".parse().unwrap();
        let grouped = grid.group(&p).unwrap();
        assert_eq!(grouped.len(), 1 + p.number_of_blocks());
        assert_eq!(grouped.times(), &[0.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn test_group_uses_extended_last_point() {
        let grid = TimeGrid::try_from(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let p: GroupingPattern = "4+1".parse().unwrap();
        let grouped = grid.group(&p).unwrap();
        assert_eq!(grouped.times(), &[0.0, 4.0, 4.0]);
        assert_eq!(grouped.widths()[2], 0.0);
    }

    #[test]
    fn test_group_output_is_subsequence() {
        let grid = TimeGrid::build(0.0, 5.0, 20, GridKind::Log).unwrap();
        let p: GroupingPattern = "2+3*3+1".parse().unwrap();
        let grouped = grid.group(&p).unwrap();
        assert_eq!(grouped.len(), 1 + p.number_of_blocks());
        let mut extended = grid.times().to_vec();
        extended.push(grid.last());
        let mut it = extended.iter();
        for t in grouped.iter() {
            assert!(it.any(|x| x == t), "{} is not in order in the extended grid", t);
        }
    }

    #[test]
    fn test_group_overflow() {
        let grid = TimeGrid::try_from(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let p: GroupingPattern = "4+2".parse().unwrap();
        assert_eq!(grid.group(&p), Err(GridError::PatternOverflow { offset: 6, available: 6 }));
    }
}
