use crate::{ElementKind, ExecutionError, Kind, Value};

/// Smallest capacity (in words) an array ever works with.
pub const MIN_CAPACITY: usize = 4;
/// Characters packed into one storage word of a Char array.
pub const CHARS_PER_WORD: usize = 4;

/// A growable, homogeneously typed sequence of 32-bit words.
///
/// Lists store one payload per word. Strings are arrays of
/// [`Kind::Char`] and pack four characters per word, low byte first, so the
/// logical index `i` lives in word `i / 4` at byte `i % 4`.
///
/// Capacity is tracked explicitly: it doubles when an append finds the
/// array full and halves when a removal leaves fewer than a quarter of the
/// words in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicArray {
    kind: ElementKind,
    words: Vec<u32>,
    capacity: usize,
    // characters in use, Char arrays only
    chars: usize,
}

impl Default for DynamicArray {
    fn default() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }
}

impl DynamicArray {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            kind: ElementKind::Unassigned,
            words: Vec::with_capacity(capacity),
            capacity,
            chars: 0,
        }
    }

    pub fn with_kind(kind: Kind, capacity: usize) -> Self {
        let mut array = Self::with_capacity(capacity);
        array.kind = kind.into();
        array
    }

    /// Builds a Char array holding `text`'s bytes.
    pub fn from_text(text: &str) -> Self {
        let words = text.len().div_ceil(CHARS_PER_WORD);
        let mut array = Self::with_kind(Kind::Char, words);
        array.push_bytes(text.as_bytes());
        array
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    pub fn set_kind(&mut self, kind: ElementKind) {
        self.kind = kind;
    }

    #[inline]
    pub fn is_char(&self) -> bool {
        self.kind.is_char()
    }

    /// Commits an unassigned array to `kind` and returns the kind in effect.
    pub fn adopt(&mut self, kind: Kind) -> Kind {
        match self.kind {
            ElementKind::Assigned(current) => current,
            ElementKind::Unassigned => {
                self.kind = kind.into();
                kind
            }
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    #[inline]
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    /// Logical length: characters for Char arrays, words otherwise.
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_char() {
            self.chars
        } else {
            self.words.len()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── raw word storage ──────────────────────────────────────────

    /// Appends one raw word, doubling the capacity when full.
    pub fn push_word(&mut self, word: u32) {
        if self.words.len() == self.capacity {
            self.capacity *= 2;
            self.words.reserve_exact(self.capacity - self.words.len());
        }
        self.words.push(word);
    }

    fn shrink_check(&mut self) {
        let size = self.words.len();
        if size > 0 && size < self.capacity / 4 {
            self.capacity = (self.capacity / 2).max(MIN_CAPACITY);
            self.words.shrink_to(self.capacity);
        }
    }

    // ── packed characters ─────────────────────────────────────────

    /// Appends one character, filling the trailing word before starting a
    /// new one.
    pub fn push_char(&mut self, byte: u8) {
        let offset = self.chars % CHARS_PER_WORD;
        if offset == 0 {
            self.push_word(u32::from(byte));
        } else if let Some(last) = self.words.last_mut() {
            *last |= u32::from(byte) << (8 * offset);
        }
        self.chars += 1;
    }

    /// Appends the characters packed in `payload`, stopping at the first
    /// zero byte.
    pub fn push_packed(&mut self, payload: u32) {
        for byte in payload.to_le_bytes() {
            if byte == 0 {
                break;
            }
            self.push_char(byte);
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push_char(byte);
        }
    }

    #[inline]
    fn char_at(&self, index: usize) -> u8 {
        let word = self.words[index / CHARS_PER_WORD];
        (word >> (8 * (index % CHARS_PER_WORD))) as u8
    }

    /// Characters of a Char array in order.
    pub fn chars(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.chars).map(move |i| self.char_at(i))
    }

    /// Text of a Char array. Non UTF-8 bytes are replaced.
    pub fn text(&self) -> String {
        let bytes: Vec<u8> = self.chars().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn repack(&mut self, bytes: &[u8]) {
        self.words.clear();
        self.chars = 0;
        self.push_bytes(bytes);
    }

    // ── logical elements ──────────────────────────────────────────

    fn check_index(&self, index: i32) -> Result<usize, ExecutionError> {
        let len = self.len();
        match usize::try_from(index) {
            Ok(i) if i < len => Ok(i),
            _ => Err(ExecutionError::IndexOutOfBounds {
                index: index.into(),
                len,
            }),
        }
    }

    /// Payload at logical `index`. A character comes back in the low byte.
    pub fn element(&self, index: usize) -> Option<u32> {
        if index >= self.len() {
            return None;
        }
        if self.is_char() {
            Some(u32::from(self.char_at(index)))
        } else {
            Some(self.words[index])
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(move |i| self.element(i))
    }

    /// Element at `index` as a tagged value.
    pub fn get(&self, index: i32) -> Result<Value, ExecutionError> {
        let index = self.check_index(index)?;
        let kind = self.kind.kind().unwrap_or(Kind::Int);
        let payload = self.element(index).unwrap_or_default();
        Ok(Value::from_parts(kind, payload))
    }

    /// Overwrites the element at `index`, coercing `value` to the element
    /// kind.
    pub fn set(&mut self, index: i32, value: Value) -> Result<(), ExecutionError> {
        let index = self.check_index(index)?;
        let kind = self.adopt(value.kind());
        let payload = value.coerce_to(kind)?;
        if kind == Kind::Char {
            let word = &mut self.words[index / CHARS_PER_WORD];
            let shift = 8 * (index % CHARS_PER_WORD);
            *word = (*word & !(0xFF << shift)) | ((payload & 0xFF) << shift);
        } else {
            self.words[index] = payload;
        }
        Ok(())
    }

    /// Typed append.
    ///
    /// An unassigned array adopts the value's kind. Int and Float convert
    /// into each other, Char arrays only take Char values. A Char value is a
    /// packed literal and contributes its characters up to the first zero
    /// byte.
    pub fn append(&mut self, value: Value) -> Result<(), ExecutionError> {
        self.append_with(value, Self::push_packed)
    }

    /// Typed append of a single element taken out of an array. A Char value
    /// is exactly one character, zero included.
    pub fn append_element(&mut self, value: Value) -> Result<(), ExecutionError> {
        self.append_with(value, |array, payload| array.push_char(payload as u8))
    }

    fn append_with(
        &mut self,
        value: Value,
        push_char: impl FnOnce(&mut Self, u32),
    ) -> Result<(), ExecutionError> {
        let kind = self.adopt(value.kind());
        if kind == Kind::Char {
            let Value::Char(payload) = value else {
                return Err(ExecutionError::BadType {
                    expected: Kind::Char,
                    got: value.kind(),
                });
            };
            push_char(self, payload);
            return Ok(());
        }
        let payload = value.coerce_to(kind)?;
        self.push_word(payload);
        Ok(())
    }

    /// Appends every element of `other` in order.
    pub fn extend_from(&mut self, other: &Self) -> Result<(), ExecutionError> {
        let Some(kind) = other.kind.kind() else {
            return Ok(());
        };
        for payload in other.elements() {
            self.append_element(Value::from_parts(kind, payload))?;
        }
        Ok(())
    }

    /// Removes the element at `index`, shifting the tail left.
    pub fn remove_at(&mut self, index: i32) -> Result<(), ExecutionError> {
        let index = self.check_index(index)?;
        if self.is_char() {
            let mut bytes: Vec<u8> = self.chars().collect();
            bytes.remove(index);
            self.repack(&bytes);
        } else {
            self.words.remove(index);
        }
        self.shrink_check();
        Ok(())
    }

    /// Drops the last element. Does nothing on an empty array.
    pub fn remove_last(&mut self) {
        if self.is_empty() {
            return;
        }
        if self.is_char() {
            self.chars -= 1;
            let offset = self.chars % CHARS_PER_WORD;
            if offset == 0 {
                self.words.pop();
            } else if let Some(last) = self.words.last_mut() {
                *last &= !(0xFF << (8 * offset));
            }
        } else {
            self.words.pop();
        }
        self.shrink_check();
    }

    /// Copies the half-open logical range `from..to` into a new array of the
    /// same kind.
    pub fn slice(&self, from: i32, to: i32) -> Result<Self, ExecutionError> {
        let len = self.len();
        let bound = |index: i32| match usize::try_from(index) {
            Ok(i) if i <= len => Ok(i),
            _ => Err(ExecutionError::IndexOutOfBounds {
                index: index.into(),
                len,
            }),
        };
        let (from, to) = (bound(from)?, bound(to)?);

        let mut sliced = Self::with_capacity(MIN_CAPACITY);
        sliced.kind = self.kind;
        if self.is_char() {
            for i in from..to {
                sliced.push_char(self.char_at(i));
            }
        } else {
            for i in from..to {
                sliced.push_word(self.words[i]);
            }
        }
        Ok(sliced)
    }

    /// New Char array with `f` applied to every byte of every packed word.
    pub fn map_chars(&self, f: impl Fn(u8) -> u8) -> Self {
        let mut mapped = Self::with_kind(Kind::Char, MIN_CAPACITY);
        for &word in &self.words {
            let bytes = word.to_le_bytes().map(&f);
            mapped.push_word(u32::from_le_bytes(bytes));
        }
        mapped.chars = self.chars;
        mapped
    }
}
