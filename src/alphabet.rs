//! Character alphabet for the character-level input channel.

use std::io::{Read, Write};

use hashbrown::{HashMap, HashSet};

use crate::errors::Result;

/// Indexed set of the characters observed in a corpus.
///
/// The finalized alphabet is a space placeholder followed by every other
/// observed character in sorted order, so index 0 doubles as the padding
/// value. Characters outside the alphabet map to the sentinel index
/// [`len()`](CharAlphabet::len).
#[derive(Default)]
pub struct CharAlphabet {
    /// Accumulated characters.
    seen: HashSet<char>,

    /// Alphabet in index order.
    chars: Vec<char>,

    index: HashMap<char, usize>,
}

impl CharAlphabet {
    /// Creates an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every character of a string.
    pub fn add_chars(&mut self, text: &str) {
        self.seen.extend(text.chars());
    }

    /// Fixes the character indices.
    ///
    /// Recomputes the order from the accumulated characters, so calling
    /// it again without intervening additions is a no-op.
    pub fn finalize(&mut self) {
        let mut tail: Vec<char> = self.seen.iter().copied().filter(|&c| c != ' ').collect();
        tail.sort_unstable();
        self.chars = std::iter::once(' ').chain(tail).collect();
        self.index = self
            .chars
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
    }

    /// Returns the index of a character, or the sentinel
    /// [`len()`](Self::len) if the character is not in the alphabet.
    pub fn index(&self, c: char) -> usize {
        self.index.get(&c).copied().unwrap_or(self.chars.len())
    }

    /// Returns the number of characters, including the space
    /// placeholder.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Checks if no character has been recorded.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.seen.is_empty()
    }

    /// Writes the alphabet as a single line.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`](crate::errors::MorfemaError) is returned if
    /// writing fails.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let line: String = self.chars.iter().collect();
        wtr.write_all(line.as_bytes())?;
        wtr.write_all(b"\n")?;
        Ok(())
    }

    /// Loads an alphabet written by [`write()`](Self::write).
    ///
    /// Only the trailing newline is stripped; the leading space
    /// placeholder survives.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`](crate::errors::MorfemaError) is returned if
    /// reading fails.
    pub fn from_reader<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut line = String::new();
        rdr.read_to_string(&mut line)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        let chars: Vec<char> = line.chars().collect();
        let mut index = HashMap::with_capacity(chars.len());
        for (i, &c) in chars.iter().enumerate() {
            index.entry(c).or_insert(i);
        }
        let seen = chars.iter().copied().collect();
        Ok(Self { seen, chars, index })
    }
}
