use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_embed::Embed;
use tracing::{debug, info};

use crate::generator::{CorpusError, Difficulty, ParagraphSource};

#[derive(Embed)]
#[folder = "assets/passages/"]
struct PassageAssets;

/// Difficulty-keyed paragraph pools. Each draw picks uniformly at random.
pub struct PassageCorpus<R: Rng = SmallRng> {
    pools: HashMap<Difficulty, Vec<String>>,
    rng: R,
}

impl PassageCorpus<SmallRng> {
    /// Bundled pools, with any per-difficulty files in the user passages
    /// directory taking their place.
    pub fn load() -> Result<Self, CorpusError> {
        Self::with_overrides(SmallRng::from_entropy(), user_passage_dir().as_deref())
    }
}

impl<R: Rng> PassageCorpus<R> {
    pub fn bundled(rng: R) -> Result<Self, CorpusError> {
        Self::with_overrides(rng, None)
    }

    pub fn with_overrides(rng: R, override_dir: Option<&Path>) -> Result<Self, CorpusError> {
        let mut pools = HashMap::new();
        for difficulty in Difficulty::ALL {
            let filename = format!("{difficulty}.txt");

            let user_pool = override_dir
                .and_then(|dir| fs::read_to_string(dir.join(&filename)).ok())
                .map(|content| split_paragraphs(&content))
                .filter(|pool| !pool.is_empty());

            let pool = match user_pool {
                Some(pool) => {
                    info!(%difficulty, paragraphs = pool.len(), "using user passage pool");
                    pool
                }
                None => {
                    let file = PassageAssets::get(&filename)
                        .ok_or_else(|| CorpusError::MissingAsset(filename.clone()))?;
                    split_paragraphs(&String::from_utf8_lossy(file.data.as_ref()))
                }
            };
            pools.insert(difficulty, pool);
        }
        Self::from_pools(pools, rng)
    }

    pub fn from_pools(
        pools: HashMap<Difficulty, Vec<String>>,
        rng: R,
    ) -> Result<Self, CorpusError> {
        for difficulty in Difficulty::ALL {
            if pools.get(&difficulty).is_none_or(|p| p.is_empty()) {
                return Err(CorpusError::EmptyPool(difficulty));
            }
        }
        Ok(Self { pools, rng })
    }

    pub fn pool(&self, difficulty: Difficulty) -> &[String] {
        self.pools
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl<R: Rng> ParagraphSource for PassageCorpus<R> {
    fn paragraph(&mut self, difficulty: Difficulty) -> String {
        // from_pools guarantees every pool is non-empty
        let len = self.pool(difficulty).len();
        let idx = self.rng.gen_range(0..len);
        debug!(%difficulty, idx, "drew paragraph");
        self.pools[&difficulty][idx].clone()
    }
}

pub fn user_passage_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("typedash").join("passages"))
}

/// Split blank-line separated text into single-line paragraphs.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_split_paragraphs_joins_wrapped_lines() {
        let text = "first line\ncontinues here\n\n\nsecond paragraph\r\n\r\nthird\n";
        let paragraphs = split_paragraphs(text);
        assert_eq!(
            paragraphs,
            vec!["first line continues here", "second paragraph", "third"]
        );
    }

    #[test]
    fn test_split_paragraphs_empty_input() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n\n  \n").is_empty());
    }

    #[test]
    fn test_bundled_pools_are_populated() {
        let corpus = PassageCorpus::bundled(seeded()).unwrap();
        for difficulty in Difficulty::ALL {
            assert!(
                corpus.pool(difficulty).len() >= 3,
                "{difficulty} pool too small"
            );
        }
    }

    #[test]
    fn test_draw_comes_from_requested_pool() {
        let mut corpus = PassageCorpus::bundled(seeded()).unwrap();
        for difficulty in Difficulty::ALL {
            for _ in 0..10 {
                let paragraph = corpus.paragraph(difficulty);
                assert!(corpus.pool(difficulty).contains(&paragraph));
            }
        }
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let mut a = PassageCorpus::bundled(seeded()).unwrap();
        let mut b = PassageCorpus::bundled(seeded()).unwrap();
        for _ in 0..5 {
            assert_eq!(a.paragraph(Difficulty::Hard), b.paragraph(Difficulty::Hard));
        }
    }

    #[test]
    fn test_draws_cover_the_pool() {
        let mut corpus = PassageCorpus::bundled(seeded()).unwrap();
        let pool_len = corpus.pool(Difficulty::Easy).len();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(corpus.paragraph(Difficulty::Easy));
        }
        assert_eq!(seen.len(), pool_len);
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut pools = HashMap::new();
        pools.insert(Difficulty::Easy, vec!["a".to_string()]);
        pools.insert(Difficulty::Medium, Vec::new());
        pools.insert(Difficulty::Hard, vec!["c".to_string()]);
        let err = PassageCorpus::from_pools(pools, seeded()).err().unwrap();
        assert!(matches!(err, CorpusError::EmptyPool(Difficulty::Medium)));
    }

    #[test]
    fn test_user_file_replaces_bundled_pool() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hard.txt"),
            "custom hard one\n\ncustom hard two\n",
        )
        .unwrap();
        // Blank user files fall back to the bundled pool.
        fs::write(dir.path().join("easy.txt"), "\n\n").unwrap();

        let corpus = PassageCorpus::with_overrides(seeded(), Some(dir.path())).unwrap();
        assert_eq!(
            corpus.pool(Difficulty::Hard),
            ["custom hard one".to_string(), "custom hard two".to_string()]
        );
        let bundled = PassageCorpus::bundled(seeded()).unwrap();
        assert_eq!(corpus.pool(Difficulty::Easy), bundled.pool(Difficulty::Easy));
    }
}
