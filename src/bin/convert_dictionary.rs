
use core::panic;
use std::env;
extern crate model_exporter;
use model_exporter::dictionary;


// converts the word-guessing game's word list into a javascript source file
// holding the playable dictionary as an array literal.
// treated as binary executable so it can be ran independantly from main

const WORD_LIST_PATH: &str = "data/word_list.txt";
const OUTPUT_DIR: &str = ".";

fn main() {

    // arguments to this executable are both optional:
    // path to the word list, one word per line
    // directory for the generated dictionary.js
    // example: ... data/word_list.txt games
    let args: Vec<String> = env::args().collect();
    if args.len() > 3 { panic!("input arguments should be a word list path and an output directory only"); }
    let input_path = args.get(1).map_or(WORD_LIST_PATH, |s| s.as_str());
    let output_dir = args.get(2).map_or(OUTPUT_DIR, |s| s.as_str());

    match dictionary::convert(input_path, output_dir) {
        Ok(n) => println!("wrote {}/dictionary.js with {} words", output_dir, n),
        Err(e) => panic!("{}", e)
    }

}
