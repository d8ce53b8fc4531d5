

// One-shot converter from a newline-delimited word list to a javascript
// source file the game front end can load directly via a script tag,
// avoiding CORS restrictions on plain text fetches.

use crate::config::files_handling;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead};

pub const MIN_WORD_LEN: usize = 3;

/// Reads the word list: lines are trimmed and lowercased, lines shorter
/// than [`MIN_WORD_LEN`] are dropped. Order is preserved, duplicates kept.
pub fn read_words(file_path: &str) -> Result<Vec<String>, Box<dyn Error>> {

    let f = File::open(file_path)?;
    let lines = io::BufReader::new(f).lines();

    let mut words: Vec<String> = Vec::new();
    for line in lines {
        let word = line?.trim().to_lowercase();
        if word.chars().count() >= MIN_WORD_LEN {
            words.push(word);
        }
    }

    Ok(words)

}

/// Renders the array literal with export guards for both loading
/// conventions (browser global and CommonJS module).
pub fn render_js(words: &[String], source_name: &str) -> String {

    let mut out = String::new();
    out.push_str("// Dictionary Word List\n");
    out.push_str("// This file contains the dictionary words as a JavaScript array\n");
    out.push_str(&format!("// Generated automatically from {}\n\n", source_name));
    out.push_str("const DICTIONARY_WORDS = [\n");

    for (i, word) in words.iter().enumerate() {
        if i == words.len() - 1 {
            out.push_str(&format!("  \"{}\"\n", word));
        } else {
            out.push_str(&format!("  \"{}\",\n", word));
        }
    }

    out.push_str("];\n\n");
    out.push_str("// Export for use\n");
    out.push_str("if (typeof window !== \"undefined\") {\n");
    out.push_str("  window.DICTIONARY_WORDS = DICTIONARY_WORDS;\n");
    out.push_str("}\n");
    out.push_str("if (typeof module !== \"undefined\" && module.exports) {\n");
    out.push_str("  module.exports = DICTIONARY_WORDS;\n");
    out.push_str("}\n");

    out

}

/// Converts `input_path` into `<output_dir>/dictionary.js`, overwriting any
/// previous output. Returns the number of emitted words. A missing or
/// unreadable input is fatal to the caller; nothing partial is written.
pub fn convert(input_path: &str, output_dir: &str) -> Result<usize, Box<dyn Error>> {

    let words = read_words(input_path)?;
    let js = render_js(&words, input_path);
    files_handling::save_output::<String>(output_dir, "dictionary", js)?;
    Ok(words.len())

}


#[cfg(test)]
mod tests {

    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir().join(name).display().to_string()
    }

    #[test]
    fn filters_short_words_keeps_order() {
        let path = temp_path("dictionary_filter_test.txt");
        fs::write(&path, "ab\ncat\ndog\nthe\n").unwrap();

        let words = read_words(&path).unwrap();
        assert_eq!(words, vec!["cat", "dog", "the"]);
    }

    #[test]
    fn lowercases_and_trims() {
        let path = temp_path("dictionary_case_test.txt");
        fs::write(&path, "  CAT \nDoG\nx\n\nhello\n").unwrap();

        let words = read_words(&path).unwrap();
        assert_eq!(words, vec!["cat", "dog", "hello"]);
        for word in &words {
            assert!(word.chars().count() >= MIN_WORD_LEN);
            assert_eq!(word, &word.to_lowercase());
        }
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(read_words("no_such_word_list.txt").is_err());
    }

    #[test]
    fn rendered_source_is_a_valid_array_literal() {
        let words = vec!["cat".to_string(), "dog".to_string(), "the".to_string()];
        let js = render_js(&words, "word_list.txt");

        // the literal between the brackets must parse as a json array
        let start = js.find('[').unwrap();
        let end = js.find(']').unwrap();
        let literal = &js[start..=end];
        let parsed: Vec<String> = serde_json::from_str(literal).unwrap();
        assert_eq!(parsed, words);

        // both export guards are present
        assert!(js.contains("window.DICTIONARY_WORDS = DICTIONARY_WORDS;"));
        assert!(js.contains("module.exports = DICTIONARY_WORDS;"));
    }

    #[test]
    fn convert_writes_one_entry_per_qualifying_line() {
        let input = temp_path("dictionary_convert_test.txt");
        fs::write(&input, "ab\ncat\ndog\nthe\n").unwrap();
        let out_dir = temp_path("dictionary_convert_out");

        let count = convert(&input, &out_dir).unwrap();
        assert_eq!(count, 3);

        let js = fs::read_to_string(format!("{}/dictionary.js", out_dir)).unwrap();
        let start = js.find('[').unwrap();
        let end = js.find(']').unwrap();
        let parsed: Vec<String> = serde_json::from_str(&js[start..=end]).unwrap();
        assert_eq!(parsed, vec!["cat", "dog", "the"]);
    }

}
