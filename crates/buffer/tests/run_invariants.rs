// Chunk: docs/chunks/style_buffer - Character style runs over a run boundary table

//! Randomized editing against a naive model.
//!
//! A `Vec<(char, AttributeMap)>` is edited alongside a `StyledText`; after
//! every step the runs must describe exactly the model's styles, be maximal
//! (no two neighbours equal) and cover the whole text.

use pretty_assertions::assert_eq;
use styled_text_buffer::{
    AttributeKey, AttributeMap, AttributeSet, StorageConfig, StyleModifier, StyledText,
};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            0
        } else {
            (self.next_u64() % n as u64) as usize
        }
    }

    /// A range `[start, limit)` within `0..=len`.
    fn range(&mut self, len: usize) -> (usize, usize) {
        let a = self.below(len + 1);
        let b = self.below(len + 1);
        (a.min(b), a.max(b))
    }
}

fn palette() -> Vec<AttributeMap> {
    vec![
        AttributeMap::empty(),
        AttributeMap::new(AttributeKey::Family, "Serif"),
        AttributeMap::new(AttributeKey::Weight, 700i64),
        AttributeMap::new(AttributeKey::Family, "Serif").add_attribute(AttributeKey::Weight, 700i64),
        AttributeMap::new(AttributeKey::Underline, true),
    ]
}

type Model = Vec<(char, AttributeMap)>;

fn check(text: &StyledText, model: &Model) {
    let expected: String = model.iter().map(|(ch, _)| *ch).collect();
    assert_eq!(text.content(), expected);
    assert_eq!(text.len(), model.len());
    assert_eq!(text.style_buffer().len(), model.len());

    let runs: Vec<_> = text.runs(0, text.len()).unwrap().collect();
    let mut covered = 0;
    for (i, run) in runs.iter().enumerate() {
        assert_eq!(run.start, covered, "runs must be contiguous");
        assert!(run.limit > run.start, "runs must be non-empty");
        if i > 0 {
            assert_ne!(runs[i - 1].style, run.style, "adjacent runs must differ");
        }
        for (pos, (_, style)) in model.iter().enumerate().take(run.limit).skip(run.start) {
            assert_eq!(&run.style, style, "style mismatch at {}", pos);
        }
        covered = run.limit;
    }
    assert_eq!(covered, model.len());

    for pos in 0..model.len() {
        let start = text.character_style_start(pos).unwrap();
        let limit = text.character_style_limit(pos).unwrap();
        assert!(start <= pos && pos < limit);
        assert_eq!(text.character_style_at(pos).unwrap(), model[pos].1);
    }
    assert_eq!(text.style_buffer().check_consistency(), Ok(()));
}

fn run_session(seed: u64, steps: usize, config: StorageConfig) {
    let mut rng = Lcg(seed);
    let styles = palette();
    let mut text = StyledText::with_config(config);
    let mut model: Model = Vec::new();

    for _ in 0..steps {
        match rng.below(6) {
            0 | 1 => {
                // type a few characters
                let pos = rng.below(model.len() + 1);
                let style = styles[rng.below(styles.len())].clone();
                let count = 1 + rng.below(4);
                let word: String = (0..count)
                    .map(|i| char::from(b'a' + ((pos + i) % 26) as u8))
                    .collect();
                text.replace_str(pos, pos, &word, style.clone()).unwrap();
                for (i, ch) in word.chars().enumerate() {
                    model.insert(pos + i, (ch, style.clone()));
                }
            }
            2 => {
                let (start, limit) = rng.range(model.len());
                text.remove(start, limit).unwrap();
                model.drain(start..limit);
            }
            3 => {
                let (start, limit) = rng.range(model.len());
                let style = styles[rng.below(styles.len())].clone();
                text.modify_character_styles(start, limit, &StyleModifier::replace(style.clone()))
                    .unwrap();
                for entry in &mut model[start..limit] {
                    entry.1 = style.clone();
                }
            }
            4 => {
                let (start, limit) = rng.range(model.len());
                let keys = AttributeSet::single(AttributeKey::Weight);
                text.modify_character_styles(start, limit, &StyleModifier::remove(keys.clone()))
                    .unwrap();
                for entry in &mut model[start..limit] {
                    entry.1 = entry.1.remove_attributes(&keys);
                }
            }
            _ => {
                // copy a piece and paste it somewhere, overwriting a range
                let (src_start, src_limit) = rng.range(model.len());
                let clip = text.extract(src_start, src_limit).unwrap();
                let piece: Model = model[src_start..src_limit].to_vec();
                let (start, limit) = rng.range(model.len());
                text.replace(start, limit, &clip, 0, clip.len()).unwrap();
                model.splice(start..limit, piece);
            }
        }
        check(&text, &model);
    }
}

#[test]
fn random_edits_default_config() {
    for seed in 1..=8 {
        run_session(seed, 300, StorageConfig::default());
    }
}

#[test]
fn random_edits_tiny_capacities() {
    // forces frequent growth of both the char array and the run table
    let config = StorageConfig::new(2, 1).unwrap();
    for seed in 100..=104 {
        run_session(seed, 300, config);
    }
}

#[test]
fn random_edits_with_compress() {
    let mut rng = Lcg(42);
    let mut text = StyledText::from_str("0123456789", AttributeMap::empty());
    let mut model: Model = "0123456789"
        .chars()
        .map(|ch| (ch, AttributeMap::empty()))
        .collect();
    let styles = palette();

    for step in 0..200 {
        let (start, limit) = rng.range(model.len());
        let style = styles[rng.below(styles.len())].clone();
        text.replace_str(start, limit, "xy", style.clone()).unwrap();
        model.splice(start..limit, vec![('x', style.clone()), ('y', style)]);
        if step % 10 == 0 {
            text.compress();
        }
        check(&text, &model);
    }
}

#[test]
fn extract_and_reinsert_reproduces_text() {
    let mut text = StyledText::from_str("abcdefghijklmnop", AttributeMap::empty());
    let styles = palette();
    for (i, style) in styles.iter().enumerate() {
        text.modify_character_styles(i * 3, i * 3 + 2, &StyleModifier::replace(style.clone()))
            .unwrap();
    }

    for (a, b) in [(0, 16), (1, 15), (4, 9), (7, 7)] {
        let piece = text.extract(a, b).unwrap();
        let mut rebuilt = StyledText::new();
        rebuilt.insert(0, &piece).unwrap();
        assert_eq!(rebuilt, piece);
        assert_eq!(rebuilt.content(), text.slice(a, b).unwrap());
        let original: Vec<_> = text
            .runs(a, b)
            .unwrap()
            .map(|run| (run.start - a, run.limit - a, run.style))
            .collect();
        let copied: Vec<_> = rebuilt
            .runs(0, rebuilt.len())
            .unwrap()
            .map(|run| (run.start, run.limit, run.style))
            .collect();
        assert_eq!(copied, original);
    }
}

#[test]
fn deleting_run_between_equal_neighbours_merges() {
    let a = AttributeMap::new(AttributeKey::Family, "A");
    let b = AttributeMap::new(AttributeKey::Family, "B");
    let mut text = StyledText::from_str("aaabbbaaa", a.clone());
    text.modify_character_styles(3, 6, &StyleModifier::replace(b))
        .unwrap();
    assert_eq!(text.style_buffer().run_count(), 3);

    text.remove(3, 6).unwrap();
    assert_eq!(text.style_buffer().run_count(), 1);
    assert_eq!(text.character_style_limit(0), Ok(6));
    assert_eq!(text.character_style_at(5), Ok(a));
}
