// Compiled-once regular expressions, shared by the tokenizer, the type
// description grammar, and the front end segmenter.

mod cache;
