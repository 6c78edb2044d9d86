//! Length-partitioned, chunked-integer property-name dispatcher.
//!
//! A hash would mean either scanning the whole name to hash it or paying
//! for a table with its own cache misses. Instead: partition members by
//! name length (trivial, from the already-known length), then within a
//! length class compare successive word-aligned chunks (8/4/2/1 bytes) of
//! the incoming name against precomputed constants, short-circuiting on
//! the first mismatch. Classes of three members or fewer skip the chunk
//! plan and just `memcmp` -- not worth the indirection.

use fxhash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkSpec {
    offset: usize,
    size: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkValue {
    Eight(u64),
    Four(u32),
    Two(u16),
    One(u8),
}

fn chunk_plan(len: usize) -> Vec<ChunkSpec> {
    let mut plan = Vec::new();
    let mut offset = 0;
    let mut remaining = len;
    while remaining > 0 {
        let size = if remaining >= 8 {
            8
        } else if remaining >= 4 {
            4
        } else if remaining >= 2 {
            2
        } else {
            1
        };
        plan.push(ChunkSpec { offset, size });
        offset += size;
        remaining -= size;
    }
    plan
}

fn read_chunk(bytes: &[u8], spec: &ChunkSpec) -> ChunkValue {
    let slice = &bytes[spec.offset..spec.offset + spec.size as usize];
    match spec.size {
        8 => ChunkValue::Eight(u64::from_ne_bytes(slice.try_into().unwrap())),
        4 => ChunkValue::Four(u32::from_ne_bytes(slice.try_into().unwrap())),
        2 => ChunkValue::Two(u16::from_ne_bytes(slice.try_into().unwrap())),
        _ => ChunkValue::One(slice[0]),
    }
}

enum Bucket {
    Linear(Vec<(Vec<u8>, usize)>),
    Chunked {
        plan: Vec<ChunkSpec>,
        members: Vec<(Vec<ChunkValue>, usize)>,
    },
}

/// Routes an incoming property name to a member index in O(name length),
/// with no hashing. Built once per type description.
pub struct PropertyDispatch {
    buckets: FxHashMap<usize, Bucket>,
}

const LINEAR_THRESHOLD: usize = 3;

impl PropertyDispatch {
    /// `names` is the type's members' escaped-JSON-name bytes, in
    /// declaration order; the returned index refers back into that slice.
    pub fn build(names: &[Vec<u8>]) -> PropertyDispatch {
        let mut by_len: FxHashMap<usize, Vec<(Vec<u8>, usize)>> = FxHashMap::default();
        for (i, name) in names.iter().enumerate() {
            by_len.entry(name.len()).or_default().push((name.clone(), i));
        }

        let mut buckets = FxHashMap::default();
        for (len, members) in by_len {
            if members.len() <= LINEAR_THRESHOLD {
                buckets.insert(len, Bucket::Linear(members));
            } else {
                let plan = chunk_plan(len);
                let chunked = members
                    .into_iter()
                    .map(|(name, i)| {
                        let vals = plan.iter().map(|s| read_chunk(&name, s)).collect();
                        (vals, i)
                    })
                    .collect();
                buckets.insert(len, Bucket::Chunked { plan, members: chunked });
            }
        }
        PropertyDispatch { buckets }
    }

    /// Finds the member index matching `name`, if any. A miss means the
    /// caller should fall through to extension-data capture or skip-value.
    pub fn dispatch(&self, name: &[u8]) -> Option<usize> {
        let bucket = self.buckets.get(&name.len())?;
        match bucket {
            Bucket::Linear(members) => members.iter().find(|(n, _)| n.as_slice() == name).map(|(_, i)| *i),
            Bucket::Chunked { plan, members } => {
                let input: Vec<ChunkValue> = plan.iter().map(|s| read_chunk(name, s)).collect();
                members.iter().find(|(vals, _)| *vals == input).map(|(_, i)| *i)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_small_member_set_via_linear_scan() {
        let names = vec![b"id".to_vec(), b"ok".to_vec()];
        let d = PropertyDispatch::build(&names);
        assert_eq!(d.dispatch(b"id"), Some(0));
        assert_eq!(d.dispatch(b"ok"), Some(1));
        assert_eq!(d.dispatch(b"no"), None);
    }

    #[test]
    fn dispatches_large_member_set_via_chunked_compare() {
        let names: Vec<Vec<u8>> = (0..10).map(|i| format!("member{:02}", i).into_bytes()).collect();
        let d = PropertyDispatch::build(&names);
        for (i, n) in names.iter().enumerate() {
            assert_eq!(d.dispatch(n), Some(i));
        }
        assert_eq!(d.dispatch(b"nonexistent"), None);
    }

    #[test]
    fn distinguishes_names_of_equal_length() {
        let names = vec![
            b"aaaaaaaaaa".to_vec(),
            b"aaaaaaaaab".to_vec(),
            b"baaaaaaaaa".to_vec(),
            b"aaaaaaabaa".to_vec(),
        ];
        let d = PropertyDispatch::build(&names);
        for (i, n) in names.iter().enumerate() {
            assert_eq!(d.dispatch(n), Some(i));
        }
    }

    #[test]
    fn rejects_wrong_length_names_without_bucket() {
        let names = vec![b"abc".to_vec()];
        let d = PropertyDispatch::build(&names);
        assert_eq!(d.dispatch(b"abcd"), None);
    }
}
