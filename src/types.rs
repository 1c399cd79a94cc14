use std::fmt;

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Parse the GTF strand column (`+`, `-`, `.` or `?`).
    pub fn from_gtf(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => Some(Strand::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Unknown => ".",
        };
        write!(f, "{s}")
    }
}

/// Anything with a genomic extent.
///
/// Coordinates are 1-based and inclusive on both ends, exactly as they appear
/// in GTF columns 4/5 and in LeafCutter junction identifiers. Overlap and
/// distance only look at coordinates; chromosome and strand are the caller's
/// business.
pub trait Feature {
    fn start(&self) -> u32;
    fn stop(&self) -> u32;

    /// Two intervals overlap iff `start1 <= stop2 && start2 <= stop1`.
    #[inline]
    fn overlaps<F: Feature + ?Sized>(&self, other: &F) -> bool {
        self.start() <= other.stop() && other.start() <= self.stop()
    }

    /// Number of shared bases (0 when disjoint).
    #[inline]
    fn bp_overlap<F: Feature + ?Sized>(&self, other: &F) -> u32 {
        if !self.overlaps(other) {
            return 0;
        }
        self.stop().min(other.stop()) - self.start().max(other.start()) + 1
    }

    /// Smallest absolute difference between any boundary of `self` and any
    /// boundary of `other`.
    fn boundary_distance<F: Feature + ?Sized>(&self, other: &F) -> u32 {
        [
            self.start().abs_diff(other.start()),
            self.start().abs_diff(other.stop()),
            self.stop().abs_diff(other.start()),
            self.stop().abs_diff(other.stop()),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

/// A contiguous genomic interval (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub stop: u32,
}

impl Span {
    /// Create a new span. Panics if start > stop.
    pub fn new(start: u32, stop: u32) -> Self {
        assert!(start <= stop, "Span requires start <= stop");
        Self { start, stop }
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.stop - self.start + 1
    }

    /// Smallest span covering both.
    #[inline]
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        }
    }
}

impl Feature for Span {
    fn start(&self) -> u32 {
        self.start
    }

    fn stop(&self) -> u32 {
        self.stop
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_symmetric_and_inclusive() {
        let a = Span::new(100, 200);
        let b = Span::new(200, 300);
        let c = Span::new(201, 300);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn bp_overlap_counts_inclusive_bases() {
        let gene = Span::new(100, 200);
        assert_eq!(gene.bp_overlap(&Span::new(160, 170)), 11);
        assert_eq!(gene.bp_overlap(&Span::new(200, 250)), 1);
        assert_eq!(gene.bp_overlap(&Span::new(50, 400)), 101);
        assert_eq!(gene.bp_overlap(&Span::new(201, 250)), 0);
        assert_eq!(Span::new(160, 170).bp_overlap(&gene), 11);
    }

    #[test]
    fn boundary_distance_takes_minimum_of_four() {
        let junction = Span::new(160, 170);
        assert_eq!(Span::new(100, 200).boundary_distance(&junction), 30);
        assert_eq!(Span::new(150, 300).boundary_distance(&junction), 10);
        assert_eq!(junction.boundary_distance(&Span::new(150, 300)), 10);
        assert_eq!(junction.boundary_distance(&junction), 0);
    }

    #[test]
    fn union_and_len() {
        let u = Span::new(10, 20).union(Span::new(15, 40));
        assert_eq!(u, Span::new(10, 40));
        assert_eq!(u.len(), 31);
    }

    #[test]
    fn strand_roundtrips_gtf_symbols() {
        assert_eq!(Strand::from_gtf("+"), Some(Strand::Plus));
        assert_eq!(Strand::from_gtf("?"), Some(Strand::Unknown));
        assert_eq!(Strand::from_gtf("x"), None);
        assert_eq!(Strand::Minus.to_string(), "-");
    }
}
