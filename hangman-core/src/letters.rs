/// Presence set over the 26 letters `A`..=`Z`, one bit per letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LetterSet(u32);

impl LetterSet {
    pub fn new() -> Self {
        Self(0)
    }

    fn bit(letter: char) -> Option<u32> {
        if letter.is_ascii_alphabetic() {
            Some(1 << (letter.to_ascii_uppercase() as u8 - b'A'))
        } else {
            None
        }
    }

    /// Adds a letter, case-insensitively. Returns false if it was already
    /// present or is not an ASCII letter.
    pub fn insert(&mut self, letter: char) -> bool {
        match Self::bit(letter) {
            Some(bit) if self.0 & bit == 0 => {
                self.0 |= bit;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, letter: char) -> bool {
        Self::bit(letter).is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Guessed letters in alphabetical order.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        ('A'..='Z').filter(|c| self.contains(*c))
    }
}
