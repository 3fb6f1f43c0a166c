// ============================================================
// Layer 3 — Special Tokens
// ============================================================
// Both vocabularies (source and target) reserve the same four
// ids. Every other layer refers to these constants instead of
// magic numbers.
//
//   id 0  <pad>  — post-padding inside a batch, masked everywhere
//   id 1  <s>    — first decoder input (beginning of sentence)
//   id 2  </s>   — end of sentence, decoding stops here
//   id 3  <unk>  — any word outside the vocabulary

pub const PAD_ID: u32 = 0;
pub const BOS_ID: u32 = 1;
pub const EOS_ID: u32 = 2;
pub const UNK_ID: u32 = 3;

pub const PAD_TOKEN: &str = "<pad>";
pub const BOS_TOKEN: &str = "<s>";
pub const EOS_TOKEN: &str = "</s>";
pub const UNK_TOKEN: &str = "<unk>";

/// All reserved tokens in id order
pub const SPECIAL_TOKENS: [(&str, u32); 4] = [
    (PAD_TOKEN, PAD_ID),
    (BOS_TOKEN, BOS_ID),
    (EOS_TOKEN, EOS_ID),
    (UNK_TOKEN, UNK_ID),
];

/// Number of ids taken by the reserved tokens
pub const NUM_SPECIAL: usize = SPECIAL_TOKENS.len();
