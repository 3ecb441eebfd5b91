//! String interner backing [`Name`] identifiers.
//!
//! The archiver interns generated instance names, property names, and
//! type names - a small population compared to a source-language compiler,
//! so a single `RwLock`ed table is sufficient. Interned strings are leaked
//! to obtain `'static` lifetimes; the interner is expected to live for the
//! whole process.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// The table exceeded `u32` capacity.
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => {
                write!(f, "interner exceeded capacity: {count} strings")
            }
        }
    }
}

impl std::error::Error for InternError {}

struct Table {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Interner mapping strings to compact [`Name`] identifiers.
///
/// # Thread Safety
/// Uses an `RwLock` so a frozen strategy registry (read-mostly after
/// configuration) can be shared together with its interner.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        StringInterner {
            table: RwLock::new(Table {
                map: FxHashMap::default(),
                strings: Vec::with_capacity(64),
            }),
        }
    }

    /// Try to intern a string, returning its [`Name`] or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: already interned.
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s) {
                return Ok(Name::from_raw(idx));
            }
        }

        let mut guard = self.table.write();
        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s) {
            return Ok(Name::from_raw(idx));
        }

        // Leak the string to get a 'static lifetime.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Ok(Name::from_raw(idx))
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics if the interner exceeds `u32` capacity. Use [`Self::try_intern`]
    /// for fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Look up the string for a [`Name`].
    ///
    /// Returns a `'static` reference; interned strings are never freed.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table.read().strings[name.index()]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Whether no strings have been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a [`StringInterner`].
///
/// The registry and its interner outlive any single generation session and
/// may be held from several places at once; this wrapper makes the shared
/// ownership explicit.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
