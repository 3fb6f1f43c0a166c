// ============================================================
// Layer 4 — Parallel Corpus Loader
// ============================================================
// Reads the small_parallel_enja layout:
//
//   data/small_parallel_enja/
//     train.en   train.ja     ← 50,000 aligned lines
//     dev.en     dev.ja
//     test.en    test.ja
//
// Line N of `<split>.en` is the translation of line N of
// `<split>.ja`. Every line is already lower-cased and split
// into tokens by single spaces.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (Reading a File)

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::data::preprocessor::Preprocessor;
use crate::domain::sentence_pair::SentencePair;
use crate::domain::traits::CorpusSource;

/// Which language is the source side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    EnToJa,
    JaToEn,
}

/// Loads one split (`train`, `dev`, `test`) of a parallel corpus.
pub struct ParallelCorpusLoader {
    dir:       PathBuf,
    split:     String,
    direction: Direction,
}

impl ParallelCorpusLoader {
    pub fn new(dir: impl Into<PathBuf>, split: impl Into<String>, direction: Direction) -> Self {
        Self {
            dir:   dir.into(),
            split: split.into(),
            direction,
        }
    }

    fn read_lines(&self, lang: &str) -> Result<Vec<String>> {
        let path = self.dir.join(format!("{}.{}", self.split, lang));
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read corpus file '{}'", path.display()))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

impl CorpusSource for ParallelCorpusLoader {
    fn load_pairs(&self) -> Result<Vec<SentencePair>> {
        if !Path::new(&self.dir).is_dir() {
            bail!("Corpus directory '{}' does not exist", self.dir.display());
        }

        let en = self.read_lines("en")?;
        let ja = self.read_lines("ja")?;
        if en.len() != ja.len() {
            bail!(
                "Split '{}' is misaligned: {} English lines vs {} Japanese lines",
                self.split, en.len(), ja.len()
            );
        }

        let prep = Preprocessor::new();
        let mut pairs   = Vec::with_capacity(en.len());
        let mut skipped = 0usize;

        for (line_no, (e, j)) in en.iter().zip(ja.iter()).enumerate() {
            let (e, j) = (prep.clean(e), prep.clean(j));
            if e.is_empty() || j.is_empty() {
                tracing::warn!("{}: skipping empty pair at line {}", self.split, line_no + 1);
                skipped += 1;
                continue;
            }
            let pair = SentencePair::new(e, j);
            pairs.push(match self.direction {
                Direction::EnToJa => pair,
                Direction::JaToEn => pair.reversed(),
            });
        }

        tracing::info!(
            "Loaded {} pairs from split '{}' ({} skipped)",
            pairs.len(), self.split, skipped
        );
        Ok(pairs)
    }
}
