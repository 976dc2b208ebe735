use std::{cmp::Ordering, iter::Peekable, str::Chars};

use unicode_normalization::UnicodeNormalization;

#[derive(Debug, PartialEq, Eq)]
enum Chunk {
    /// Run of ascii digits with leading zeros removed.
    Number(String),
    Char(char),
}

struct Chunks<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Chunks<'a> {
    fn new(value: &'a str) -> Self {
        Self {
            chars: value.chars().peekable(),
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.chars.next()?;
        if !first.is_ascii_digit() {
            return Some(Chunk::Char(first));
        }
        let mut digits = String::from(first);
        while let Some(next) = self.chars.next_if(|c| c.is_ascii_digit()) {
            digits.push(next);
        }
        let significant = digits.trim_start_matches('0');
        Some(Chunk::Number(if significant.is_empty() {
            "0".to_owned()
        } else {
            significant.to_owned()
        }))
    }
}

/// Lowercase base letter of `c`, without accents.
fn fold(c: char) -> char {
    let base = std::iter::once(c).nfd().next().unwrap_or(c);
    base.to_lowercase().next().unwrap_or(base)
}

/// Punctuation and whitespace sort first, then numbers, then letters.
fn rank(c: char) -> u8 {
    if c.is_alphanumeric() {
        2
    } else {
        0
    }
}

const NUMBER_RANK: u8 = 1;

fn compare_chunks(lhs: &Chunk, rhs: &Chunk) -> Ordering {
    match (lhs, rhs) {
        // numbers of equal significant length compare lexicographically
        (Chunk::Number(a), Chunk::Number(b)) => {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (Chunk::Char(a), Chunk::Char(b)) => {
            (rank(*a), fold(*a)).cmp(&(rank(*b), fold(*b)))
        }
        (Chunk::Number(_), Chunk::Char(c)) => NUMBER_RANK.cmp(&rank(*c)),
        (Chunk::Char(c), Chunk::Number(_)) => rank(*c).cmp(&NUMBER_RANK),
    }
}

/// Numeric-aware, case-insensitive string comparison.
///
/// Runs of digits compare by their numeric value (`"9" < "10"`,
/// `"007" == "7"`). Other characters compare by their lowercase base letter,
/// so `"abc"`, `"ABC"` and `"àbc"` are equal. Punctuation sorts before
/// numbers and numbers before letters.
pub fn natural_cmp(lhs: &str, rhs: &str) -> Ordering {
    let mut lhs = Chunks::new(lhs);
    let mut rhs = Chunks::new(rhs);
    loop {
        match (lhs.next(), rhs.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => match compare_chunks(&a, &b) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}
