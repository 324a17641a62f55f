use std::collections::HashSet;

// Suffix tables for the mutation rules. Fixed on purpose: the same word
// must always expand to the same set.
const YEARS: [u32; 3] = [2023, 2024, 2025];
const NUMBER_SUFFIXES: [&str; 4] = ["123", "01", "1", "12"];
const SYMBOL_SUFFIXES: [&str; 4] = ["!", "@", "#", "$"];

/// Expand one word into its mutation set: the three case forms, plus
/// year, number and symbol suffix variants of the lowercase and
/// capitalized bases. Duplicates across bases collapse via set
/// semantics; callers wanting stable presentation sort the result.
pub fn mutate(word: &str) -> HashSet<String> {
    let lower = word.to_lowercase();
    let upper = word.to_uppercase();
    let capitalized = capitalize(word);

    let mut mutations = HashSet::new();
    mutations.insert(lower.clone());
    mutations.insert(upper);
    mutations.insert(capitalized.clone());

    for base in [&lower, &capitalized] {
        for year in YEARS {
            mutations.insert(format!("{base}{year}"));
            mutations.insert(format!("{base}{year}!"));
        }
        for number in NUMBER_SUFFIXES {
            mutations.insert(format!("{base}{number}"));
        }
        for symbol in SYMBOL_SUFFIXES {
            mutations.insert(format!("{base}{symbol}"));
            mutations.insert(format!("{base}{symbol}{symbol}"));
        }
    }

    mutations
}

/// First character uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_uppercases_only_the_first_char() {
        assert_eq!(capitalize("wIDGET"), "Widget");
        assert_eq!(capitalize("a"), "A");
        assert_eq!(capitalize(""), "");
    }
}
