//! Lock-partitioned map used to merge contributions from parallel workers.
//!
//! Keys are spread over `N` buckets by Euclidean `key mod N`; each bucket is
//! an ordinary `BTreeMap` behind its own mutex. An access only ever holds the lock of the
//! bucket owning its key, so workers touching different buckets never contend.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Integer keys that can be assigned to a bucket.
pub trait ShardKey: Ord + Copy + Send {
    fn shard(&self, buckets: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(impl ShardKey for $t {
            #[inline]
            fn shard(&self, buckets: usize) -> usize {
                (*self as i128).rem_euclid(buckets as i128) as usize
            }
        })*
    };
}

impl_shard_key!(i32, i64, u32, u64, usize);

/// A keyed mapping that parallel workers can write through.
///
/// Ranking only talks to this trait, so [`ConcurrentMap`] can be swapped for
/// another concurrent structure without touching the ranking code.
pub trait KeyedAccumulator<K, V>: Sync {
    /// Read-or-insert the value for `key` and mutate it in place.
    fn update<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> R;
    fn remove(&self, key: &K) -> Option<V>;
    fn drain(self) -> BTreeMap<K, V>
    where
        Self: Sized;
}

pub struct ConcurrentMap<K, V> {
    buckets: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V: Default> ConcurrentMap<K, V> {
    pub fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { buckets }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket(&self, key: &K) -> &Mutex<BTreeMap<K, V>> {
        &self.buckets[key.shard(self.buckets.len())]
    }

    /// Lock the owning bucket and return a guard to the value for `key`,
    /// inserting `V::default()` first if needed. The lock is released when
    /// the guard is dropped.
    pub fn access(&self, key: K) -> MappedMutexGuard<'_, V> {
        let guard = self.bucket(&key).lock();
        MutexGuard::map(guard, |map| map.entry(key).or_default())
    }

    pub fn erase(&self, key: &K) -> Option<V> {
        self.bucket(key).lock().remove(key)
    }

    /// Merge every bucket into one ordered map, locking one bucket at a time.
    /// Not a point-in-time snapshot if other threads are still writing.
    pub fn build_ordinary_map(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut out = BTreeMap::new();
        for bucket in &self.buckets {
            let guard = bucket.lock();
            out.extend(guard.iter().map(|(k, v)| (*k, v.clone())));
        }
        out
    }

    pub fn into_ordinary_map(self) -> BTreeMap<K, V> {
        let mut out = BTreeMap::new();
        for bucket in self.buckets {
            out.append(&mut bucket.into_inner());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> KeyedAccumulator<K, V> for ConcurrentMap<K, V>
where
    K: ShardKey,
    V: Default + Send,
{
    fn update<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> R {
        let mut value = self.access(key);
        f(&mut *value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.erase(key)
    }

    fn drain(self) -> BTreeMap<K, V> {
        self.into_ordinary_map()
    }
}
