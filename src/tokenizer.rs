use serde::Deserialize;
use std::fs::File;
use std::path::Path;

use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{
    AddedToken, PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams,
};

use crate::error::{LoadError, LoadResult};

const PAD_TOKEN: &str = "[PAD]";
const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const UNK_TOKEN: &str = "[UNK]";
const MASK_TOKEN: &str = "[MASK]";

/// Normalization switches from `tokenizer_config.json`, as written by
/// `BertTokenizer.save_pretrained`. Missing keys take the `BertTokenizer`
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    pub do_lower_case: bool,
    pub strip_accents: Option<bool>,
    pub tokenize_chinese_chars: bool,
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            do_lower_case: true,
            strip_accents: None,
            tokenize_chinese_chars: true,
        }
    }
}

impl VocabConfig {
    fn from_dir(dir: &Path) -> LoadResult<Self> {
        let path = dir.join("tokenizer_config.json");
        if !path.is_file() {
            return Ok(Self::default());
        }
        let reader = File::open(&path).map_err(|source| LoadError::ConfigIo {
            path: path.clone(),
            source,
        })?;
        serde_json::from_reader(reader).map_err(|source| LoadError::ConfigParse { path, source })
    }
}

/// Loads the tokenizer stored next to the model and pins every encoding to
/// exactly `max_length` tokens (pad right, truncate from the end).
///
/// `tokenizer.json` is used when present. Checkpoints saved with the slow
/// `BertTokenizer` only ship `vocab.txt` and `tokenizer_config.json`; a
/// WordPiece pipeline honouring the casing switches is assembled from them.
pub fn load(dir: &Path, max_length: usize) -> LoadResult<Tokenizer> {
    let json = dir.join("tokenizer.json");
    let vocab = dir.join("vocab.txt");
    let mut tokenizer = if json.is_file() {
        Tokenizer::from_file(&json).map_err(|source| LoadError::Tokenizer {
            path: json.clone(),
            source,
        })?
    } else if vocab.is_file() {
        let config = VocabConfig::from_dir(dir)?;
        from_vocab(&vocab, &config).map_err(|source| LoadError::Tokenizer {
            path: vocab.clone(),
            source,
        })?
    } else {
        return Err(LoadError::MissingTokenizer(dir.to_path_buf()));
    };

    fix_length(&mut tokenizer, max_length).map_err(|source| LoadError::Tokenizer {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(tokenizer)
}

fn from_vocab(vocab: &Path, config: &VocabConfig) -> tokenizers::Result<Tokenizer> {
    let vocab = vocab
        .to_str()
        .ok_or_else(|| format!("non utf-8 vocab path: {}", vocab.display()))?;
    let wordpiece = WordPiece::from_file(vocab)
        .unk_token(UNK_TOKEN.to_string())
        .build()?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    let cls_id = special_token_id(&tokenizer, CLS_TOKEN)?;
    let sep_id = special_token_id(&tokenizer, SEP_TOKEN)?;
    tokenizer
        .with_normalizer(Some(BertNormalizer::new(
            true,
            config.tokenize_chinese_chars,
            config.strip_accents,
            config.do_lower_case,
        )))
        .with_pre_tokenizer(Some(BertPreTokenizer))
        .with_post_processor(Some(BertProcessing::new(
            (SEP_TOKEN.to_string(), sep_id),
            (CLS_TOKEN.to_string(), cls_id),
        )));

    // Only tokens the vocabulary knows; anything else would get an id past
    // the embedding table.
    let specials: Vec<AddedToken> = [PAD_TOKEN, UNK_TOKEN, CLS_TOKEN, SEP_TOKEN, MASK_TOKEN]
        .into_iter()
        .filter(|token| tokenizer.token_to_id(token).is_some())
        .map(|token| AddedToken::from(token, true))
        .collect();
    tokenizer.add_special_tokens(&specials);
    Ok(tokenizer)
}

fn special_token_id(tokenizer: &Tokenizer, token: &str) -> tokenizers::Result<u32> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| format!("vocabulary has no {token} token").into())
}

fn fix_length(tokenizer: &mut Tokenizer, max_length: usize) -> tokenizers::Result<()> {
    let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);
    tokenizer
        .with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_length),
            direction: PaddingDirection::Right,
            pad_id,
            pad_token: PAD_TOKEN.to_string(),
            ..Default::default()
        }))
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))?;
    Ok(())
}
