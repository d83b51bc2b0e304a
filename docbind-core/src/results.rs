//! List-like helpers over materialized query results.
//!
//! Query operations return a [`ResultList`]: a finite, ordered sequence
//! materialized at query time (no live cursor is retained). Derived operations
//! (`filter`, `map`) return new independent lists; `sort_by_key` mutates in
//! place. The list dereferences to a slice, so the whole standard slice API is
//! available on top of the helpers here.

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use crate::error::{DocBindError, DocBindResult};

/// A materialized, operable sequence of query results.
///
/// # Example
///
/// ```ignore
/// use docbind::results::ResultList;
///
/// let list: ResultList<i64> = vec![3, 1, 2].into();
/// let doubled = list.map(|n| n * 2);
/// assert_eq!(doubled.first_or_none(), Some(&6));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResultList<T>(Vec<T>);

impl<T> Default for ResultList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> ResultList<T> {
    /// Creates an empty result list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the first element, or `None` if the list is empty.
    pub fn first_or_none(&self) -> Option<&T> {
        self.0.first()
    }

    /// Returns the last element, or `None` if the list is empty.
    pub fn last_or_none(&self) -> Option<&T> {
        self.0.last()
    }

    /// Returns a new list containing only the elements matching `predicate`.
    pub fn filter(&self, predicate: impl FnMut(&&T) -> bool) -> Self
    where
        T: Clone,
    {
        Self(self.0.iter().filter(predicate).cloned().collect())
    }

    /// Applies `mapper` to every element and returns the results as a new list.
    pub fn map<U>(&self, mapper: impl FnMut(&T) -> U) -> ResultList<U> {
        ResultList(self.0.iter().map(mapper).collect())
    }

    /// Reduces the list to a single value using `reducer`.
    ///
    /// # Errors
    ///
    /// Returns [`DocBindError::EmptyResult`] when the list is empty; use
    /// [`fold`](Self::fold) to supply an initial value instead.
    pub fn reduce(&self, reducer: impl FnMut(T, &T) -> T) -> DocBindResult<T>
    where
        T: Clone,
    {
        let mut iter = self.0.iter();
        let first = iter.next().ok_or(DocBindError::EmptyResult("reduce"))?;
        Ok(iter.fold(first.clone(), reducer))
    }

    /// Reduces the list to a single value starting from `initial`.
    ///
    /// On an empty list this returns `initial` unchanged.
    pub fn fold<A>(&self, initial: A, reducer: impl FnMut(A, &T) -> A) -> A {
        self.0.iter().fold(initial, reducer)
    }

    /// Sorts the list in place by a derived key. The sort is stable.
    pub fn sort_by_key<K: Ord>(&mut self, mut key: impl FnMut(&T) -> K, descending: bool) {
        if descending {
            self.0.sort_by(|a, b| key(b).cmp(&key(a)));
        } else {
            self.0.sort_by(|a, b| key(a).cmp(&key(b)));
        }
    }

    /// Groups elements by a derived key.
    ///
    /// Returns a mapping from key to the group members in list order; keys
    /// appear in first-seen order and every element lands in exactly one group.
    pub fn group_by<K>(&self, mut key: impl FnMut(&T) -> K) -> IndexMap<K, ResultList<T>>
    where
        K: Eq + Hash,
        T: Clone,
    {
        let mut groups: IndexMap<K, ResultList<T>> = IndexMap::new();
        for element in &self.0 {
            groups
                .entry(key(element))
                .or_default()
                .0
                .push(element.clone());
        }
        groups
    }

    /// Returns a uniformly random element.
    ///
    /// # Errors
    ///
    /// Returns [`DocBindError::EmptyResult`] when the list is empty.
    pub fn random(&self) -> DocBindResult<&T> {
        self.0
            .choose(&mut rand::thread_rng())
            .ok_or(DocBindError::EmptyResult("pick a random element from"))
    }

    /// Consumes the list and returns the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for ResultList<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ResultList<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for ResultList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for ResultList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for ResultList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
