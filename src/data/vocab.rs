// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Thin wrapper around a word-level `tokenizers::Tokenizer`
// that speaks in the crate's reserved ids:
//
//   encode("i am here .")          → [17, 52, 230, 4]
//   encode_target("私 は ここ 。") → [<s>, 9, 5, 301, 4, </s>]
//   decode([9, 5, 301, 4, </s>, <pad>]) → "私 は ここ 。"
//
// Words outside the vocabulary become <unk> (id 3).

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::domain::special_tokens::{BOS_ID, EOS_ID, PAD_ID, UNK_TOKEN};

#[derive(Clone)]
pub struct Vocabulary {
    tokenizer: Tokenizer,
}

impl Vocabulary {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Number of ids, reserved tokens included (they live in the
    /// WordLevel vocab itself, not only in the added-token table)
    pub fn size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    /// Token ids of a space-separated sentence, no markers added
    pub fn encode(&self, sentence: &str) -> Result<Vec<u32>> {
        if sentence.trim().is_empty() {
            return Ok(Vec::new());
        }
        let enc = self.tokenizer
            .encode(sentence, false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(enc.get_ids().to_vec())
    }

    /// Decoder-side ids: `<s> w1 .. wn </s>`
    pub fn encode_target(&self, sentence: &str) -> Result<Vec<u32>> {
        let mut ids = vec![BOS_ID];
        ids.extend(self.encode(sentence)?);
        ids.push(EOS_ID);
        Ok(ids)
    }

    /// Turn model output back into words. Stops at the first
    /// </s>; <pad> and <s> are dropped, <unk> is kept visible.
    pub fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .take_while(|&&id| id != EOS_ID)
            .filter(|&&id| id != PAD_ID && id != BOS_ID)
            .map(|&id| {
                self.tokenizer
                    .id_to_token(id)
                    .unwrap_or_else(|| UNK_TOKEN.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::special_tokens::{BOS_ID, EOS_ID, PAD_ID, UNK_ID};
    use crate::infra::tokenizer_store::build_vocabulary;

    #[test]
    fn test_decode_stops_at_eos_and_drops_markers() {
        let vocab = build_vocabulary(["猫 が い る 。"], 50).unwrap();
        let mut ids = vocab.encode_target("猫 が い る 。").unwrap();
        ids.push(PAD_ID);
        ids.push(vocab.encode("猫").unwrap()[0]); // after </s>, ignored
        assert_eq!(vocab.decode(&ids), "猫 が い る 。");
    }

    #[test]
    fn test_unknown_words_stay_visible() {
        let vocab = build_vocabulary(["a b"], 50).unwrap();
        let ids = vocab.encode("a zebra").unwrap();
        assert_eq!(ids[1], UNK_ID);
        assert_eq!(vocab.decode(&ids), "a <unk>");
    }

    #[test]
    fn test_empty_sentence() {
        let vocab = build_vocabulary(["a b"], 50).unwrap();
        assert!(vocab.encode("").unwrap().is_empty());
        assert_eq!(vocab.encode_target("").unwrap(), vec![BOS_ID, EOS_ID]);
    }
}
