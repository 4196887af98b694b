use simtext::{IndexConfig, SimilarityIndex};

fn main() {
    let comments = vec![
        ("c1", "Welcome to Jimbocho, the town of books and curry!"),
        ("c2", "Check out my channel for free giveaways every day"),
        ("c3", "Has anyone tried the curry place near the station?"),
    ];

    // Creates an index of 13-character k-mers.
    let index = SimilarityIndex::new(IndexConfig::new(13).unwrap()).unwrap();
    index.add_batch_in_parallel(comments).unwrap();

    // A reworded resubmission is caught.
    let found = index
        .lookup_similar("check out MY channel for free giveaways!!!")
        .unwrap();
    assert_eq!(found.id, "c2");
    assert!(found.similarity >= 60);

    // Unrelated text does not match.
    assert!(index.lookup_similar("Lorem ipsum dolor sit amet").is_none());
}
