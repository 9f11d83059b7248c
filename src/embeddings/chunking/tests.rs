use super::*;

fn numbered_words(count: usize) -> String {
    (0..count)
        .map(|i| format!("w{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn default_config() {
    let config = ChunkingConfig::default();
    assert_eq!(config.chunk_size, 1000);
    assert_eq!(config.overlap, 200);
    assert_eq!(config.step(), Ok(800));
}

#[test]
fn first_chunk_is_leading_window() {
    let text = numbered_words(25);
    let config = ChunkingConfig::new(10, 3).expect("config should be valid");

    let chunks = chunk_text(&text, &config).expect("chunking should succeed");

    assert!(!chunks.is_empty());
    assert_eq!(chunks[0], numbered_words(10));
}

#[test]
fn adjacent_chunks_share_overlap_words() {
    let text = numbered_words(47);
    let config = ChunkingConfig::new(10, 4).expect("config should be valid");

    let chunks = chunk_text(&text, &config).expect("chunking should succeed");

    for pair in chunks.windows(2) {
        let previous: Vec<&str> = pair[0].split(' ').collect();
        let next: Vec<&str> = pair[1].split(' ').collect();
        if previous.len() < config.chunk_size {
            continue;
        }
        let shared = config.overlap.min(next.len());
        assert_eq!(
            previous[previous.len() - config.overlap..][..shared],
            next[..shared],
            "chunks {:?} and {:?} should overlap",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn windows_continue_until_start_passes_end() {
    let config = ChunkingConfig::new(3, 1).expect("config should be valid");

    let chunks = chunk_text("The quick brown fox jumps over the lazy dog", &config)
        .expect("chunking should succeed");

    assert_eq!(
        chunks,
        vec![
            "The quick brown",
            "brown fox jumps",
            "jumps over the",
            "the lazy dog",
            "dog",
        ]
    );
}

#[test]
fn short_text_is_single_chunk() {
    let config = ChunkingConfig::default();
    let text = "Just a handful of words here.";

    let chunks = chunk_text(text, &config).expect("chunking should succeed");

    assert_eq!(chunks, vec![text.to_string()]);
}

#[test]
fn whitespace_is_normalized_to_single_spaces() {
    let config = ChunkingConfig::new(4, 1).expect("config should be valid");

    let chunks = chunk_text("alpha\n\nbeta\t gamma   delta", &config).expect("chunking should succeed");

    assert_eq!(chunks[0], "alpha beta gamma delta");
}

#[test]
fn empty_text_yields_itself() {
    let config = ChunkingConfig::default();

    assert_eq!(
        chunk_text("", &config).expect("chunking should succeed"),
        vec![String::new()]
    );
    assert_eq!(
        chunk_text("   \n ", &config).expect("chunking should succeed"),
        vec!["   \n ".to_string()]
    );
}

#[test]
fn overlap_equal_to_size_is_rejected() {
    let config = ChunkingConfig {
        chunk_size: 5,
        overlap: 5,
    };

    assert_eq!(
        chunk_text("one two three", &config),
        Err(ChunkingError::OverlapTooLarge {
            overlap: 5,
            chunk_size: 5,
        })
    );
}

#[test]
fn overlap_larger_than_size_is_rejected() {
    assert!(ChunkingConfig::new(3, 10).is_err());
    assert!(matches!(
        ChunkingConfig::new(0, 0),
        Err(ChunkingError::ZeroChunkSize)
    ));
}

#[test]
fn zero_overlap_produces_disjoint_chunks() {
    let config = ChunkingConfig::new(2, 0).expect("config should be valid");

    let chunks = chunk_text("a b c d e", &config).expect("chunking should succeed");

    assert_eq!(chunks, vec!["a b", "c d", "e"]);
}

#[test]
fn counts_words() {
    assert_eq!(word_count("hello world"), 2);
    assert_eq!(word_count("  spaced\tout\nwords "), 3);
    assert_eq!(word_count(""), 0);
}
