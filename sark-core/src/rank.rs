use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedWord {
    pub word: String,
    pub count: usize,
}

/// Count case-folded words of at least `min_length` characters and rank
/// them by frequency, descending. Ties keep first-seen order (the sort is
/// stable), so identical input order always yields identical output.
/// A `min_length` of 0 keeps everything.
pub fn rank_words(words: Vec<String>, min_length: usize) -> Vec<RankedWord> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for word in words {
        let word = word.to_lowercase();
        if word.chars().count() < min_length {
            continue;
        }
        match counts.get_mut(&word) {
            Some(count) => *count += 1,
            None => {
                counts.insert(word.clone(), 1);
                first_seen.push(word);
            }
        }
    }

    let mut ranked: Vec<RankedWord> = first_seen
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            RankedWord { word, count }
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    ranked
}
