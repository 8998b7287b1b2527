use std::collections::HashMap;
use std::hash::Hash;

/// Map from a key (state, or state-action pair) to an estimate. Keys that were
/// never written read as `0.0`.
#[derive(Debug, Clone)]
pub struct ValueTable<K> {
    values: HashMap<K, f64>,
}

impl<K: Eq + Hash> ValueTable<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, key: K, value: f64) {
        self.values.insert(key, value);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.values.iter().map(|(key, &value)| (key, value))
    }

    /// Largest change between two tables over the keys of both.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.values
            .keys()
            .chain(other.values.keys())
            .map(|key| (self.get(key) - other.get(key)).abs())
            .fold(0.0, f64::max)
    }
}

impl<K: Eq + Hash> Default for ValueTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> PartialEq for ValueTable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<K: Eq + Hash> FromIterator<(K, f64)> for ValueTable<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Greedy actions derived from some value table, computed on first request
/// and kept until the table behind them changes.
#[derive(Debug, Clone)]
pub struct PolicyStore<S, A> {
    actions: HashMap<S, Option<A>>,
    hits: u64,
}

impl<S: Clone + Eq + Hash, A: Copy> PolicyStore<S, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            hits: 0,
        }
    }

    /// Cached action for `state`, or the result of `compute` which is then
    /// cached. Errors are passed through and not cached.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        state: &S,
        compute: impl FnOnce() -> Result<Option<A>, E>,
    ) -> Result<Option<A>, E> {
        if let Some(&action) = self.actions.get(state) {
            self.hits += 1;
            return Ok(action);
        }
        let action = compute()?;
        self.actions.insert(state.clone(), action);
        Ok(action)
    }

    /// Forget every cached action. Call whenever the values are replaced.
    pub fn invalidate(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub const fn hits(&self) -> u64 {
        self.hits
    }
}

impl<S: Clone + Eq + Hash, A: Copy> Default for PolicyStore<S, A> {
    fn default() -> Self {
        Self::new()
    }
}
