use crate::{
    error::DirectoryError,
    models::Mapping,
    store::{LinkStore, MemoryStore},
};
use rand::{rngs::OsRng, RngCore};
use tokio::sync::RwLock;

/// Number of random bytes behind every key; rendered as twice as many hex
/// characters.
pub const KEY_BYTES: usize = 4;

/// Length of a generated key in characters.
pub const KEY_LEN: usize = KEY_BYTES * 2;

/// How many times `store` redraws a key that is already taken.
const MAX_KEY_ATTEMPTS: usize = 10;

const SCHEMES: [&str; 2] = ["http://", "https://"];

// ── Key generation ─────────────────────────────────────────────────────────

/// Source of the random bytes a key is rendered from.
pub trait KeyGenerator: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), rand::Error>;
}

/// Draws key bytes from the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsKeyGenerator;

impl KeyGenerator for OsKeyGenerator {
    fn fill(&self, buf: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(buf)
    }
}

// ── Directory ──────────────────────────────────────────────────────────────

/// The short-link directory: generates keys for submitted URLs and resolves
/// keys back to their targets.
///
/// A single reader/writer lock guards the underlying store. `store` holds
/// it exclusively across key generation and insertion, `resolve` holds it
/// shared for the lookup only.
pub struct Directory {
    links: RwLock<Box<dyn LinkStore>>,
    keys: Box<dyn KeyGenerator>,
}

impl Directory {
    /// In-memory directory backed by the OS random source.
    pub fn new() -> Self {
        Self::with_parts(MemoryStore::new(), OsKeyGenerator)
    }

    pub fn with_parts(store: impl LinkStore + 'static, keys: impl KeyGenerator + 'static) -> Self {
        Self {
            links: RwLock::new(Box::new(store)),
            keys: Box::new(keys),
        }
    }

    /// Store `target` under a fresh key and return the key.
    ///
    /// Targets without an `http://` or `https://` prefix get `http://`
    /// prepended. A key that is already taken is redrawn, so an existing
    /// mapping is never overwritten.
    pub async fn store(&self, target: &str) -> Result<String, DirectoryError> {
        let target = normalize_target(target)?;

        let mut links = self.links.write().await;
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = self.next_key()?;
            if links.contains(&key) {
                tracing::warn!("Generated key '{}' is already taken, redrawing", key);
                continue;
            }

            links.insert(Mapping::new(key.clone(), target));
            tracing::debug!("Stored key '{}' ({} mapping(s) total)", key, links.len());
            return Ok(key);
        }

        Err(DirectoryError::KeyCollision(MAX_KEY_ATTEMPTS))
    }

    /// Look up the target stored under `key`.
    pub async fn resolve(&self, key: &str) -> Result<String, DirectoryError> {
        if key.is_empty() {
            return Err(DirectoryError::EmptyInput);
        }

        self.links
            .read()
            .await
            .get(key)
            .ok_or(DirectoryError::NotFound)
    }

    /// Number of mappings currently held.
    pub async fn len(&self) -> usize {
        self.links.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.links.read().await.is_empty()
    }

    fn next_key(&self) -> Result<String, DirectoryError> {
        let mut bytes = [0u8; KEY_BYTES];
        self.keys.fill(&mut bytes)?;
        Ok(hex::encode(bytes))
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// Return `true` if `url` starts with `http://` or `https://`, ignoring
/// ASCII case.
pub fn has_scheme(url: &str) -> bool {
    SCHEMES.iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Prepend `http://` to `target` unless it already carries a scheme.
/// Anything else, whitespace included, is kept as submitted.
pub fn normalize_target(target: &str) -> Result<String, DirectoryError> {
    if target.is_empty() {
        return Err(DirectoryError::EmptyInput);
    }

    if has_scheme(target) {
        Ok(target.to_owned())
    } else {
        Ok(format!("http://{target}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::VecDeque, sync::Arc, sync::Mutex};

    /// Hands out pre-arranged byte patterns, one per `fill`.
    struct ScriptedKeys(Mutex<VecDeque<[u8; KEY_BYTES]>>);

    impl ScriptedKeys {
        fn new(script: &[[u8; KEY_BYTES]]) -> Self {
            Self(Mutex::new(script.iter().copied().collect()))
        }
    }

    impl KeyGenerator for ScriptedKeys {
        fn fill(&self, buf: &mut [u8]) -> Result<(), rand::Error> {
            let next = self.0.lock().unwrap().pop_front().expect("script exhausted");
            buf.copy_from_slice(&next);
            Ok(())
        }
    }

    struct BrokenKeys;

    impl KeyGenerator for BrokenKeys {
        fn fill(&self, _buf: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no entropy",
            )))
        }
    }

    fn is_key(key: &str) -> bool {
        key.len() == KEY_LEN && key.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[tokio::test]
    async fn store_adds_missing_scheme() {
        let dir = Directory::new();
        let key = dir.store("example.com").await.unwrap();
        assert_eq!(dir.resolve(&key).await.unwrap(), "http://example.com");
    }

    #[tokio::test]
    async fn store_keeps_existing_scheme() {
        let dir = Directory::new();
        let key = dir.store("https://example.com").await.unwrap();
        assert_eq!(dir.resolve(&key).await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn keys_are_fixed_width_lowercase_hex() {
        let dir = Directory::new();
        for i in 0..200 {
            let key = dir.store(&format!("example.com/{i}")).await.unwrap();
            assert!(is_key(&key), "bad key {key:?}");
        }
    }

    #[tokio::test]
    async fn hex_rendering_of_scripted_bytes() {
        let dir = Directory::with_parts(
            MemoryStore::new(),
            ScriptedKeys::new(&[[0xde, 0xad, 0x0b, 0x0e]]),
        );
        assert_eq!(dir.store("example.com").await.unwrap(), "dead0b0e");
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let dir = Directory::new();
        assert!(matches!(
            dir.resolve("doesnotexist").await,
            Err(DirectoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let dir = Directory::new();
        assert!(matches!(dir.store("").await, Err(DirectoryError::EmptyInput)));
        assert!(matches!(dir.resolve("").await, Err(DirectoryError::EmptyInput)));
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn whitespace_is_stored_verbatim() {
        let dir = Directory::new();

        let key = dir.store(" ").await.unwrap();
        assert_eq!(dir.resolve(&key).await.unwrap(), "http:// ");

        let key = dir.store(" example.com").await.unwrap();
        assert_eq!(dir.resolve(&key).await.unwrap(), "http:// example.com");
    }

    #[tokio::test]
    async fn same_target_gets_distinct_keys() {
        let dir = Directory::new();
        let a = dir.store("example.com").await.unwrap();
        let b = dir.store("example.com").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(dir.len().await, 2);
    }

    #[tokio::test]
    async fn randomness_failure_leaves_store_untouched() {
        let dir = Directory::with_parts(MemoryStore::new(), BrokenKeys);
        assert!(matches!(
            dir.store("example.com").await,
            Err(DirectoryError::RandomnessFailure(_))
        ));
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn taken_key_is_redrawn() {
        let first = [0x00, 0x00, 0x00, 0x01];
        let second = [0x00, 0x00, 0x00, 0x02];
        let dir = Directory::with_parts(
            MemoryStore::new(),
            ScriptedKeys::new(&[first, first, second]),
        );

        let a = dir.store("one.example").await.unwrap();
        let b = dir.store("two.example").await.unwrap();

        assert_eq!(a, "00000001");
        assert_eq!(b, "00000002");
        assert_eq!(dir.resolve(&a).await.unwrap(), "http://one.example");
        assert_eq!(dir.resolve(&b).await.unwrap(), "http://two.example");
    }

    #[tokio::test]
    async fn collision_gives_up_after_max_attempts() {
        let key = [0xab, 0xcd, 0xef, 0x01];
        let dir = Directory::with_parts(
            MemoryStore::new(),
            ScriptedKeys::new(&[key; MAX_KEY_ATTEMPTS + 1]),
        );

        dir.store("first.example").await.unwrap();
        assert!(matches!(
            dir.store("second.example").await,
            Err(DirectoryError::KeyCollision(MAX_KEY_ATTEMPTS))
        ));
        assert_eq!(dir.resolve("abcdef01").await.unwrap(), "http://first.example");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_stores_are_not_lost() {
        let dir = Arc::new(Directory::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let dir = dir.clone();
                tokio::spawn(async move {
                    let target = format!("https://example.com/{i}");
                    let key = dir.store(&target).await.unwrap();
                    (key, target)
                })
            })
            .collect();

        for handle in handles {
            let (key, target) = handle.await.unwrap();
            assert_eq!(dir.resolve(&key).await.unwrap(), target);
        }
        assert_eq!(dir.len().await, 64);
    }

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("http://a"));
        assert!(has_scheme("HTTPS://a"));
        assert!(!has_scheme("ftp://a"));
        assert!(!has_scheme("http:/a"));
        assert!(!has_scheme("ht"));
    }

    #[test]
    fn normalize_only_prefixes() {
        assert_eq!(normalize_target("example.com").unwrap(), "http://example.com");
        assert_eq!(normalize_target(" example.com\n").unwrap(), "http:// example.com\n");
        assert_eq!(normalize_target("Http://x.io").unwrap(), "Http://x.io");
    }
}
