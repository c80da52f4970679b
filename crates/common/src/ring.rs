//! Token-ring coordinates and interval math.
//!
//! A ring interval is half-open, `[start, end)` in ring order. An interval
//! whose end does not exceed its start wraps past the ring maximum back to
//! the minimum; `[t, t)` covers the whole ring. For the byte-ordered
//! partitioner the empty token is the ring minimum, and in an end position
//! it doubles as the exclusive top of the ring.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RingError};

/// Position on the token ring.
///
/// Tokens from different partitioners never meet inside one planning pass,
/// so the derived ordering is only ever applied within a single variant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Signed 64-bit token, decimal string form.
    Murmur(i64),
    /// Raw-byte token, hex string form.
    Ordered(Vec<u8>),
}

/// The ring's token-assignment scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partitioner {
    Murmur3,
    ByteOrdered,
}

impl Partitioner {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "murmur3" | "murmur3partitioner" => Ok(Partitioner::Murmur3),
            "byte_ordered" | "byteorderedpartitioner" => Ok(Partitioner::ByteOrdered),
            _ => Err(RingError::UnknownPartitioner(name.to_string())),
        }
    }

    /// Whether key order matches token order. Only then can a key
    /// restriction be translated into a token interval.
    pub fn preserves_order(&self) -> bool {
        matches!(self, Partitioner::ByteOrdered)
    }

    pub fn min_token(&self) -> Token {
        match self {
            Partitioner::Murmur3 => Token::Murmur(i64::MIN),
            Partitioner::ByteOrdered => Token::Ordered(Vec::new()),
        }
    }

    /// Exclusive top of the ring. For the byte-ordered partitioner the empty
    /// token serves as the top bound in an end position.
    pub fn max_token(&self) -> Token {
        match self {
            Partitioner::Murmur3 => Token::Murmur(i64::MAX),
            Partitioner::ByteOrdered => Token::Ordered(Vec::new()),
        }
    }

    pub fn parse_token(&self, s: &str) -> Result<Token> {
        match self {
            Partitioner::Murmur3 => s.parse::<i64>().map(Token::Murmur).map_err(|e| {
                RingError::MalformedToken { token: s.to_string(), detail: e.to_string() }
            }),
            Partitioner::ByteOrdered => hex::decode(s).map(Token::Ordered).map_err(|e| {
                RingError::MalformedToken { token: s.to_string(), detail: e.to_string() }
            }),
        }
    }

    pub fn token_to_string(&self, token: &Token) -> String {
        match token {
            Token::Murmur(v) => v.to_string(),
            Token::Ordered(bytes) => hex::encode(bytes),
        }
    }

    /// Map a partition key to its ring position. Only meaningful for
    /// order-preserving partitioners; callers check `preserves_order` first.
    pub fn token_for_key(&self, key: &[u8]) -> Result<Token> {
        match self {
            Partitioner::Murmur3 => Err(RingError::OrderNotPreserved),
            Partitioner::ByteOrdered => Ok(Token::Ordered(key.to_vec())),
        }
    }
}

/// Half-open ring interval `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: Token,
    pub end: Token,
}

/// Linear (non-wrapping) piece of the ring: `[0]` up to `[1]`, or up to the
/// top of the ring when `[1]` is `None`.
type Segment = (Token, Option<Token>);

impl Interval {
    pub fn new(start: Token, end: Token) -> Self {
        Interval { start, end }
    }

    /// An interval wraps when its end does not come after its start in ring
    /// order. `[t, t)` is the full ring.
    pub fn wraps(&self) -> bool {
        self.end <= self.start
    }

    /// Split a wrapping interval at the ring boundary into linear intervals.
    /// Non-wrapping intervals come back unchanged; an interval that already
    /// ends at the ring minimum only has an upper piece.
    pub fn unwrapped(self, partitioner: &Partitioner) -> Vec<Interval> {
        if !self.wraps() {
            return vec![self];
        }
        let upper = Interval::new(self.start, partitioner.max_token());
        if self.end == partitioner.min_token() {
            vec![upper]
        } else {
            vec![upper, Interval::new(partitioner.min_token(), self.end)]
        }
    }

    fn segments(&self, partitioner: &Partitioner) -> Vec<Segment> {
        if !self.wraps() {
            return vec![(self.start.clone(), Some(self.end.clone()))];
        }
        let min = partitioner.min_token();
        if self.end == min {
            vec![(self.start.clone(), None)]
        } else {
            vec![(self.start.clone(), None), (min, Some(self.end.clone()))]
        }
    }

    /// Ring-aware intersection. Both operands may wrap; each is decomposed
    /// into linear segments and the pairwise overlaps are mapped back into
    /// intervals. Yields zero, one, or more disjoint pieces.
    pub fn intersection(&self, other: &Interval, partitioner: &Partitioner) -> Vec<Interval> {
        let mut pieces = Vec::new();
        for (a_start, a_end) in self.segments(partitioner) {
            for (b_start, b_end) in other.segments(partitioner) {
                let start = a_start.clone().max(b_start.clone());
                let end = match (&a_end, &b_end) {
                    (Some(a), Some(b)) => Some(a.min(b).clone()),
                    (Some(a), None) => Some(a.clone()),
                    (None, Some(b)) => Some(b.clone()),
                    (None, None) => None,
                };
                match end {
                    Some(end) if start < end => pieces.push(Interval::new(start, end)),
                    Some(_) => {}
                    None => pieces.push(Interval::new(start, partitioner.max_token())),
                }
            }
        }
        pieces
    }
}
