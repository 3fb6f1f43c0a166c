// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Builds, saves, and loads the two word-level vocabularies
// (one per language) as HuggingFace tokenizer JSON files:
//
//   checkpoints/
//     tokenizer_src.json   ← source language
//     tokenizer_tgt.json   ← target language
//
// The corpus is pre-segmented, so each vocabulary is a plain
// WordLevel model behind a WhitespaceSplit pre-tokenizer.
// Ids 0..4 are the reserved tokens from domain::special_tokens;
// words follow in order of descending frequency.
//
// The JSON is written directly instead of going through the
// tokenizers trainer API, which in 0.15 requires the trainer
// model type to be ModelWrapper.

use anyhow::{Context, Result};
use std::{collections::HashMap, path::PathBuf, str::FromStr};
use tokenizers::Tokenizer;

use crate::data::vocab::Vocabulary;
use crate::domain::special_tokens::{SPECIAL_TOKENS, NUM_SPECIAL, UNK_TOKEN};

/// Which side of the corpus a vocabulary covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    fn file_name(self) -> &'static str {
        match self {
            Side::Source => "tokenizer_src.json",
            Side::Target => "tokenizer_tgt.json",
        }
    }
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load an existing vocabulary or build a new one from `sentences`
    pub fn load_or_build<'a, I>(
        &self,
        side:       Side,
        sentences:  I,
        vocab_size: usize,
    ) -> Result<Vocabulary>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let path = self.dir.join(side.file_name());
        if path.exists() {
            tracing::info!("Loading existing {:?} vocabulary from '{}'", side, path.display());
            self.load(side)
        } else {
            tracing::info!("Building new {:?} vocabulary (vocab_size={})", side, vocab_size);
            self.build_and_save(side, sentences, vocab_size)
        }
    }

    /// Delete both saved vocabularies so the next `load_or_build` rebuilds them
    pub fn clear(&self) -> Result<()> {
        for side in [Side::Source, Side::Target] {
            let path = self.dir.join(side.file_name());
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Cannot remove '{}'", path.display()))?;
            }
        }
        Ok(())
    }

    /// Load a previously saved vocabulary
    pub fn load(&self, side: Side) -> Result<Vocabulary> {
        let path = self.dir.join(side.file_name());
        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))?;
        Ok(Vocabulary::new(tokenizer))
    }

    fn build_and_save<'a, I>(&self, side: Side, sentences: I, vocab_size: usize) -> Result<Vocabulary>
    where
        I: IntoIterator<Item = &'a str>,
    {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let json = word_level_json(sentences, vocab_size);
        let path = self.dir.join(side.file_name());
        std::fs::write(&path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("Cannot write tokenizer JSON to '{}'", path.display()))?;

        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))?;
        tracing::info!(
            "{:?} vocabulary built with {} entries, saved to '{}'",
            side,
            tokenizer.get_vocab_size(false),
            path.display()
        );
        Ok(Vocabulary::new(tokenizer))
    }
}

/// Build a vocabulary directly in memory, without touching disk.
pub fn build_vocabulary<'a, I>(sentences: I, vocab_size: usize) -> Result<Vocabulary>
where
    I: IntoIterator<Item = &'a str>,
{
    let json = word_level_json(sentences, vocab_size).to_string();
    let tokenizer = Tokenizer::from_str(&json)
        .map_err(|e| anyhow::anyhow!("Cannot build tokenizer: {e}"))?;
    Ok(Vocabulary::new(tokenizer))
}

/// Count words and emit the tokenizer JSON. `vocab_size` includes
/// the reserved tokens; ties in frequency are broken alphabetically
/// so the same corpus always yields the same ids.
fn word_level_json<'a, I>(sentences: I, vocab_size: usize) -> serde_json::Value
where
    I: IntoIterator<Item = &'a str>,
{
    let mut freq: HashMap<&'a str, usize> = HashMap::new();
    for sentence in sentences {
        for word in sentence.split_whitespace() {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    let mut words: Vec<(&str, usize)> = freq
        .into_iter()
        .filter(|(w, _)| !SPECIAL_TOKENS.iter().any(|(tok, _)| tok == w))
        .collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    words.truncate(vocab_size.saturating_sub(NUM_SPECIAL));

    let mut vocab = serde_json::Map::new();
    for (tok, id) in SPECIAL_TOKENS {
        vocab.insert(tok.to_string(), serde_json::json!(id));
    }
    for (i, (word, _)) in words.iter().enumerate() {
        vocab.insert(word.to_string(), serde_json::json!(NUM_SPECIAL + i));
    }

    let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .map(|(tok, id)| serde_json::json!({
            "id": id, "content": tok, "single_word": false, "lstrip": false,
            "rstrip": false, "normalized": false, "special": true
        }))
        .collect();

    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": null,
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN
        }
    })
}
